//! Wires [`Cipher`], [`CompressionType`] and [`Framer`] together behind
//! `tokio_util`'s [`Decoder`]/[`Encoder`] traits, so a connection is simply
//! `Framed::new(socket, PacketCodec::new(..))`.
//!
//! The workspace already declares `tokio-util`'s `codec` feature; this is
//! the first thing in the crate that actually uses it, in place of the
//! hand-rolled read loop a length-prefixed protocol like this usually grows.

use bytes::{Buf, BufMut, BytesMut};
use gserver_core::{GServerError, Result};
use tokio_util::codec::{Decoder, Encoder};

use crate::cipher::{Cipher, CipherGeneration};
use crate::compression::{compress, decompress, CompressionType};
use crate::framing::{Frame, Framer};

/// Outbound payloads larger than this are zlib-compressed before framing,
/// matching the size threshold the original applies per generation.
pub const DEFAULT_COMPRESS_THRESHOLD: usize = 55;

pub struct PacketCodec {
    cipher: Cipher,
    framer: Framer,
    compression: CompressionType,
    compress_threshold: usize,
}

impl PacketCodec {
    pub fn new(generation: CipherGeneration, key: u8, compression: CompressionType) -> Self {
        Self {
            cipher: Cipher::new(generation, key),
            framer: Framer::new(),
            compression,
            compress_threshold: DEFAULT_COMPRESS_THRESHOLD,
        }
    }

    /// Unencrypted, uncompressed codec used only for the very first login
    /// bundle, before a cipher generation has been negotiated.
    pub fn plaintext() -> Self {
        Self::new(CipherGeneration::None, 0, CompressionType::None)
    }

    pub fn reset_cipher(&mut self, generation: CipherGeneration, key: u8) {
        self.cipher.reset(generation, key);
    }

    pub fn set_compression(&mut self, compression: CompressionType) {
        self.compression = compression;
    }

    /// Tell the framer that the next record is `len` raw bytes, skipping
    /// newline scanning for it. Call this immediately after decoding a
    /// raw-follows announcement's size field.
    pub fn announce_raw(&mut self, len: usize) {
        self.framer.announce_raw(len);
    }
}

impl Decoder for PacketCodec {
    type Item = Vec<Frame>;
    type Error = GServerError;

    fn decode(&mut self, src: &mut BytesMut) -> std::result::Result<Option<Self::Item>, Self::Error> {
        if src.len() < 2 {
            return Ok(None);
        }

        let len = u16::from_be_bytes([src[0], src[1]]) as usize;

        if src.len() < 2 + len {
            src.reserve(2 + len - src.len());
            return Ok(None);
        }

        src.advance(2);
        let mut body = src.split_to(len);
        self.cipher.decrypt_in(&mut body);
        let plaintext = decompress(&body, self.compression)?;
        Ok(Some(self.framer.split(&plaintext)))
    }
}

/// A single packet to send: `code` is the logical outbound code (not yet
/// `+32`-shifted), `body` is everything after the code byte, and
/// `append_newline` mirrors `sendPacket(bytes, appendNewline)` from the
/// original — some packets (raw file data) must not get a trailing `\n`.
pub struct Outbound {
    pub code: u8,
    pub body: Vec<u8>,
    pub append_newline: bool,
}

impl Encoder<Outbound> for PacketCodec {
    type Error = GServerError;

    fn encode(&mut self, item: Outbound, dst: &mut BytesMut) -> std::result::Result<(), Self::Error> {
        let mut plaintext = Vec::with_capacity(item.body.len() + 2);
        plaintext.push(item.code.wrapping_add(32));
        plaintext.extend_from_slice(&item.body);
        if item.append_newline {
            plaintext.push(b'\n');
        }

        let payload = if plaintext.len() > self.compress_threshold {
            compress(&plaintext, self.compression)?
        } else {
            plaintext
        };

        let mut body = payload;
        self.cipher.encrypt_out(&mut body);

        if body.len() > u16::MAX as usize {
            return Err(GServerError::Protocol(format!(
                "outbound packet {} bytes exceeds u16 length prefix",
                body.len()
            )));
        }

        dst.reserve(2 + body.len());
        dst.put_u16(body.len() as u16);
        dst.extend_from_slice(&body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_single_unencrypted_bundle() {
        let mut codec = PacketCodec::plaintext();
        let mut buf = BytesMut::new();

        let mut plaintext = Vec::new();
        plaintext.push(32u8 + 6);
        plaintext.extend_from_slice(b"hi");
        plaintext.push(b'\n');

        buf.put_u16(plaintext.len() as u16);
        buf.extend_from_slice(&plaintext);

        let frames = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].code, Some(6));
        assert_eq!(frames[0].body, b"hi");
        assert!(buf.is_empty());
    }

    #[test]
    fn waits_for_a_complete_bundle() {
        let mut codec = PacketCodec::plaintext();
        let mut buf = BytesMut::new();
        buf.put_u16(10);
        buf.extend_from_slice(b"short");

        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn encode_then_decode_round_trips_through_a_keyed_cipher() {
        let mut encoder = PacketCodec::new(CipherGeneration::XorRotate, 9, CompressionType::None);
        let mut decoder = PacketCodec::new(CipherGeneration::XorRotate, 9, CompressionType::None);

        let mut buf = BytesMut::new();
        encoder
            .encode(
                Outbound {
                    code: 6,
                    body: b"onlinestartlocal.nw".to_vec(),
                    append_newline: true,
                },
                &mut buf,
            )
            .unwrap();

        let frames = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].code, Some(6));
        assert_eq!(frames[0].body, b"onlinestartlocal.nw");
    }

    #[test]
    fn rejects_an_outbound_packet_that_would_overflow_the_u16_length_prefix() {
        let mut codec = PacketCodec::plaintext();
        let mut buf = BytesMut::new();
        let oversized_body = vec![0u8; u16::MAX as usize + 1];

        let result = codec.encode(
            Outbound {
                code: 100,
                body: oversized_body,
                append_newline: false,
            },
            &mut buf,
        );
        assert!(result.is_err());
    }
}
