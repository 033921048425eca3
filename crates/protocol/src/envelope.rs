//! The two packet envelopes the rest of the workspace passes around:
//! [`PacketIn`] wraps a dispatched inbound frame's code and body, and
//! [`PacketOut`] wraps one already-framed outbound record (code byte plus
//! payload plus whatever trailing newline the code needs) ahead of
//! `connection`'s batching layer, which accumulates several records into one
//! bundle before compression/encryption (see
//! `gserver_network::connection::send_batch`).
//!
//! Framing a record's *body* (the code byte, the newline, raw-vs-scanned
//! payload) is `packet_builder`'s job — every `build_*` function there
//! writes a complete record. `PacketOut` only carries that record alongside
//! its logical type, for logging and stats at the send site.

use bytes::BytesMut;

use crate::packets::{PacketTypeIn, PacketTypeOut};

/// One inbound packet as handed to a dispatcher handler: the logical code
/// plus everything after it, up to (not including) the record's newline.
#[derive(Debug, Clone)]
pub struct PacketIn {
    pub packet_type: PacketTypeIn,
    pub packet_data: Vec<u8>,
}

impl PacketIn {
    pub fn new(packet_type: PacketTypeIn, packet_data: Vec<u8>) -> Self {
        Self { packet_type, packet_data }
    }
}

/// One outbound packet: `record` is the complete plaintext record (as
/// produced by a `packet_builder::build_*` function), ready to be appended
/// to a batch as-is.
#[derive(Debug, Clone)]
pub struct PacketOut {
    pub packet_type: PacketTypeOut,
    pub record: Vec<u8>,
}

impl PacketOut {
    pub fn new(packet_type: PacketTypeOut, record: Vec<u8>) -> Self {
        Self { packet_type, record }
    }

    /// Appends this packet's already-framed record onto `buf`.
    pub fn serialize(&self, buf: &mut BytesMut) {
        buf.extend_from_slice(&self.record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet_builder::build_server_text;

    #[test]
    fn serializes_the_prebuilt_record_verbatim() {
        let mut record = BytesMut::new();
        build_server_text(&mut record, "hello");
        let packet = PacketOut::new(PacketTypeOut::ServerText, record.to_vec());

        let mut buf = BytesMut::new();
        packet.serialize(&mut buf);
        assert_eq!(buf[0], PacketTypeOut::ServerText.as_u8().wrapping_add(32));
        assert_eq!(*buf.last().unwrap(), b'\n');
    }
}
