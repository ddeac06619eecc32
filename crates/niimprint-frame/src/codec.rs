use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Start marker: 0x55 0x55.
pub const START_MARKER: [u8; 2] = [0x55, 0x55];

/// End marker: 0xAA 0xAA.
pub const END_MARKER: [u8; 2] = [0xAA, 0xAA];

/// Frame header: start marker (2) + type (1) + length (1) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Header + checksum (1) + end marker (2).
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + 3;

/// The length field is a single byte.
pub const MAX_DATA_LEN: usize = u8::MAX as usize;

/// A decoded `(type, data)` pair.
///
/// The wire representation is always derived from these two fields, so a
/// `Packet` can never carry a stale length or checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    packet_type: u8,
    data: Bytes,
}

impl Packet {
    /// Create a packet, rejecting data that does not fit the length byte.
    pub fn new(packet_type: u8, data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        if data.len() > MAX_DATA_LEN {
            return Err(FrameError::PayloadTooLarge {
                size: data.len(),
                max: MAX_DATA_LEN,
            });
        }
        Ok(Self { packet_type, data })
    }

    /// The packet type code.
    pub fn packet_type(&self) -> u8 {
        self.packet_type
    }

    /// The packet data.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Consume the packet and return its data.
    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// The total wire size of this packet.
    pub fn wire_size(&self) -> usize {
        FRAME_OVERHEAD + self.data.len()
    }

    /// Encode this packet into a fresh frame.
    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        put_frame(self.packet_type, &self.data, &mut dst);
        dst.freeze()
    }
}

/// XOR of the type, the length byte and every data byte.
pub fn checksum(packet_type: u8, data: &[u8]) -> u8 {
    data.iter()
        .fold(packet_type ^ data.len() as u8, |acc, byte| acc ^ byte)
}

/// Encode a packet into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────┬──────┬─────┬──────────────┬──────────┬────────────┐
/// │ Start (2B) │ Type │ Len │ Data         │ Checksum │ End (2B)   │
/// │ 0x55 0x55  │ (1B) │(1B) │ (Len bytes)  │ (1B)     │ 0xAA 0xAA  │
/// └────────────┴──────┴─────┴──────────────┴──────────┴────────────┘
/// ```
pub fn encode_packet(packet_type: u8, data: &[u8], dst: &mut BytesMut) -> Result<()> {
    if data.len() > MAX_DATA_LEN {
        return Err(FrameError::PayloadTooLarge {
            size: data.len(),
            max: MAX_DATA_LEN,
        });
    }
    put_frame(packet_type, data, dst);
    Ok(())
}

/// Encode a packet into a standalone frame.
pub fn encode(packet_type: u8, data: &[u8]) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(FRAME_OVERHEAD + data.len());
    encode_packet(packet_type, data, &mut dst)?;
    Ok(dst.freeze())
}

fn put_frame(packet_type: u8, data: &[u8], dst: &mut BytesMut) {
    dst.reserve(FRAME_OVERHEAD + data.len());
    dst.put_slice(&START_MARKER);
    dst.put_u8(packet_type);
    dst.put_u8(data.len() as u8);
    dst.put_slice(data);
    dst.put_u8(checksum(packet_type, data));
    dst.put_slice(&END_MARKER);
}

/// Size of the frame whose header starts `buf`, if the length byte is present.
pub fn frame_len(buf: &[u8]) -> Option<usize> {
    buf.get(3).map(|len| *len as usize + FRAME_OVERHEAD)
}

/// Decode exactly one frame.
///
/// The slice must hold the whole frame and nothing else; locating frame
/// boundaries in a stream is the reassembler's job.
pub fn decode_packet(frame: &[u8]) -> Result<Packet> {
    let len = frame.len();
    if len < FRAME_OVERHEAD {
        return Err(FrameError::Truncated {
            len,
            min: FRAME_OVERHEAD,
        });
    }

    if frame[0..2] != START_MARKER {
        return Err(FrameError::InvalidStartMarker(frame[0], frame[1]));
    }
    if frame[len - 2..] != END_MARKER {
        return Err(FrameError::InvalidEndMarker(frame[len - 2], frame[len - 1]));
    }

    let packet_type = frame[2];
    let data_len = frame[3] as usize;
    if data_len + FRAME_OVERHEAD != len {
        return Err(FrameError::LengthMismatch {
            declared: data_len,
            actual: len,
        });
    }

    let data = &frame[HEADER_SIZE..HEADER_SIZE + data_len];
    let expected = checksum(packet_type, data);
    let found = frame[HEADER_SIZE + data_len];
    if expected != found {
        return Err(FrameError::Checksum { expected, found });
    }

    Ok(Packet {
        packet_type,
        data: Bytes::copy_from_slice(data),
    })
}
