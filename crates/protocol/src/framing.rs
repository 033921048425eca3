//! Splits a decrypted, decompressed bundle body into individual packet
//! records.
//!
//! Normally a body is a sequence of newline-terminated records, each
//! starting with a single `code + 32` byte. Some inbound codes (raw file
//! uploads, NPC script bodies) announce that the *next* record is a fixed
//! number of raw bytes that must be taken verbatim, including any embedded
//! newlines. The dispatcher calls [`Framer::announce_raw`] right after
//! decoding such a record's size field; the next call to
//! [`Framer::split`] honors it before falling back to newline scanning.

/// One decoded record: either a newline-delimited packet or a raw blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// `None` for raw frames, which carry no leading code byte of their own.
    pub code: Option<u8>,
    pub body: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct Framer {
    pending_raw: Option<usize>,
}

impl Framer {
    pub fn new() -> Self {
        Self { pending_raw: None }
    }

    /// Arrange for the next `split` call to consume `len` bytes verbatim as
    /// a single raw frame, regardless of embedded newlines.
    pub fn announce_raw(&mut self, len: usize) {
        self.pending_raw = Some(len);
    }

    /// Split a full bundle body into frames.
    ///
    /// If a raw announcement is outstanding when `plaintext` runs out before
    /// satisfying it, the remainder (however much is available) is emitted
    /// as a single short raw frame and the deficit is cleared; callers that
    /// split raw payloads across bundles are expected to avoid this by
    /// keeping one file transfer's chunks inside one bundle.
    pub fn split(&mut self, plaintext: &[u8]) -> Vec<Frame> {
        let mut out = Vec::new();
        let mut pos = 0;

        while pos < plaintext.len() {
            if let Some(len) = self.pending_raw.take() {
                let end = (pos + len).min(plaintext.len());
                out.push(Frame {
                    code: None,
                    body: plaintext[pos..end].to_vec(),
                });
                pos = end;
                continue;
            }

            match plaintext[pos..].iter().position(|&b| b == b'\n') {
                Some(offset) => {
                    let end = pos + offset;
                    out.push(Self::record(plaintext, pos, end));
                    pos = end + 1;
                }
                None => {
                    // Trailing partial record with no terminator: the
                    // caller guarantees bundles are newline-complete, so
                    // this only happens for an empty tail and is dropped.
                    if pos < plaintext.len() {
                        out.push(Self::record(plaintext, pos, plaintext.len()));
                    }
                    break;
                }
            }
        }

        out
    }

    fn record(plaintext: &[u8], start: usize, end: usize) -> Frame {
        if start >= end {
            return Frame {
                code: Some(0),
                body: Vec::new(),
            };
        }
        let code = plaintext[start].wrapping_sub(32);
        Frame {
            code: Some(code),
            body: plaintext[start + 1..end].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_newline_terminated_records() {
        let mut framer = Framer::new();
        let mut body = Vec::new();
        body.push(32u8 + 6); // code 6
        body.extend_from_slice(b"hello");
        body.push(b'\n');
        body.push(32u8 + 9); // code 9
        body.extend_from_slice(b"world");
        body.push(b'\n');

        let frames = framer.split(&body);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].code, Some(6));
        assert_eq!(frames[0].body, b"hello");
        assert_eq!(frames[1].code, Some(9));
        assert_eq!(frames[1].body, b"world");
    }

    #[test]
    fn raw_announcement_suppresses_newline_scanning() {
        let mut framer = Framer::new();
        framer.announce_raw(5);

        let raw_payload = b"a\nb\nc".to_vec();
        let frames = framer.split(&raw_payload);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].code, None);
        assert_eq!(frames[0].body, raw_payload);
    }

    #[test]
    fn raw_frame_then_resumes_newline_scanning() {
        let mut framer = Framer::new();
        framer.announce_raw(3);

        let mut body = b"xyz".to_vec();
        body.push(32u8 + 1);
        body.extend_from_slice(b"tail");
        body.push(b'\n');

        let frames = framer.split(&body);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].code, None);
        assert_eq!(frames[0].body, b"xyz");
        assert_eq!(frames[1].code, Some(1));
        assert_eq!(frames[1].body, b"tail");
    }
}
