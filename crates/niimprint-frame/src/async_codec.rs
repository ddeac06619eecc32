use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::codec::{decode_packet, encode_packet, frame_len, Packet, HEADER_SIZE};
use crate::error::FrameError;

/// `tokio_util` codec over the packet wire format.
///
/// Decoding follows the drop-frame resync rule: a frame that fails to decode
/// is consumed, logged and counted, and decoding resumes after it.
#[derive(Debug, Default)]
pub struct PacketCodec {
    dropped_frames: u64,
}

impl PacketCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames discarded because they failed to decode.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, FrameError> {
        loop {
            if src.len() <= HEADER_SIZE {
                return Ok(None);
            }
            let Some(len) = frame_len(src) else {
                return Ok(None);
            };
            if src.len() < len {
                src.reserve(len - src.len());
                return Ok(None);
            }

            let frame = src.split_to(len);
            match decode_packet(&frame) {
                Ok(packet) => return Ok(Some(packet)),
                Err(err) => {
                    self.dropped_frames += 1;
                    warn!(error = %err, "dropping undecodable frame");
                }
            }
        }
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = FrameError;

    fn encode(&mut self, packet: Packet, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_packet(packet.packet_type(), packet.data(), dst)
    }
}

impl Encoder<(u8, &[u8])> for PacketCodec {
    type Error = FrameError;

    fn encode(&mut self, item: (u8, &[u8]), dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_packet(item.0, item.1, dst)
    }
}
