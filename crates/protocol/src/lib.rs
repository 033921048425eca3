//! # GServer Protocol Library
//!
//! Implements the Graal Online binary wire protocol: variable-length
//! integer encoders, the packet code tables, a rotating-XOR stream cipher,
//! and the framing that turns a raw byte stream into individual packets.
//!
//! ## Layers
//!
//! - [`codecs`]: GCHAR/GSHORT/GINT/GINT4/GUINT5/GSTRING encode/decode.
//! - [`packets`]: the `PacketTypeIn`/`PacketTypeOut` code tables.
//! - [`cipher`]: the per-session rotating-XOR stream cipher generations.
//! - [`compression`]: zlib/bzip2 payload compression.
//! - [`framing`]: splits a decrypted bundle into newline/raw records.
//! - [`codec`]: wires cipher + compression + framing into a
//!   `tokio_util::codec::Decoder`/`Encoder` pair.
//! - [`packet_builder`]: constructors for the outbound packets this crate
//!   sends.

pub mod cipher;
pub mod codec;
pub mod codecs;
pub mod compression;
pub mod envelope;
pub mod framing;
pub mod packet_builder;
pub mod packets;

pub use cipher::*;
pub use codec::*;
pub use codecs::*;
pub use compression::*;
pub use envelope::*;
pub use framing::*;
pub use packet_builder::*;
pub use packets::*;
