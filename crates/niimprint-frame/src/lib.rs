//! Packet framing for the NIIMBOT label printer protocol.
//!
//! Every packet on the wire is framed as:
//! - the start marker `0x55 0x55`
//! - a 1-byte type code and a 1-byte data length
//! - up to 255 data bytes
//! - an XOR checksum over type, length and data
//! - the end marker `0xAA 0xAA`
//!
//! [`FrameReassembler`] turns an arbitrarily chunked byte stream back into
//! packets; [`PacketStream`] pairs it with a blocking `Read + Write` link.

pub mod codec;
pub mod codes;
pub mod error;
pub mod reassembler;
pub mod stream;

#[cfg(feature = "async")]
pub mod async_codec;

pub use codec::{
    checksum, decode_packet, encode, encode_packet, frame_len, Packet, END_MARKER,
    FRAME_OVERHEAD, HEADER_SIZE, MAX_DATA_LEN, START_MARKER,
};
pub use error::{FrameError, Result};
pub use reassembler::{FrameReassembler, ResyncPolicy};
pub use stream::{PacketStream, DEFAULT_READ_CHUNK_SIZE};

#[cfg(feature = "async")]
pub use async_codec::PacketCodec;
