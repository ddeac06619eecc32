use bytes::{Buf, BytesMut};
use tracing::{debug, warn};

use crate::codec::{decode_packet, frame_len, Packet, HEADER_SIZE, START_MARKER};
use crate::error::Result;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// What the reassembler does with the bytes of a frame that fails to decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResyncPolicy {
    /// Consume the whole frame as sized by its length byte and carry on.
    /// Assumes in-order, lossless delivery, which holds for a local serial link.
    #[default]
    DropFrame,
    /// Discard bytes up to the next `0x55 0x55` start marker before each frame,
    /// and after a failed decode resume the scan one byte later.
    ScanForMarker,
}

/// Turns an arbitrarily chunked byte stream into complete packets.
///
/// Bytes that do not yet form a whole frame are carried across calls, so
/// callers can feed whatever the transport returned without caring where
/// frame boundaries fall.
#[derive(Debug)]
pub struct FrameReassembler {
    buf: BytesMut,
    policy: ResyncPolicy,
    dropped_frames: u64,
    skipped_bytes: u64,
}

impl Default for FrameReassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReassembler {
    /// Create a reassembler with the default resync policy.
    pub fn new() -> Self {
        Self::with_policy(ResyncPolicy::default())
    }

    /// Create a reassembler with an explicit resync policy.
    pub fn with_policy(policy: ResyncPolicy) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            policy,
            dropped_frames: 0,
            skipped_bytes: 0,
        }
    }

    /// Append newly received bytes and return every packet they complete, in order.
    ///
    /// Frames that fail to decode are dropped and counted; they never abort the pass.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Packet> {
        self.push(bytes);

        let mut packets = Vec::new();
        while let Some(result) = self.next_packet() {
            match result {
                Ok(packet) => {
                    debug!(
                        packet_type = packet.packet_type(),
                        len = packet.data().len(),
                        "received packet"
                    );
                    packets.push(packet);
                }
                Err(err) => {
                    self.dropped_frames += 1;
                    warn!(error = %err, "dropping undecodable frame");
                }
            }
        }
        packets
    }

    /// Append bytes without decoding anything.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Decode the next buffered frame.
    ///
    /// Returns `None` when the buffer holds no complete frame. A frame that
    /// fails to decode is consumed and returned as an error.
    pub fn next_packet(&mut self) -> Option<Result<Packet>> {
        if self.policy == ResyncPolicy::ScanForMarker {
            self.skip_to_marker();
        }

        if self.buf.len() <= HEADER_SIZE {
            return None;
        }
        let len = frame_len(&self.buf)?;
        if self.buf.len() < len {
            return None;
        }

        match self.policy {
            ResyncPolicy::DropFrame => {
                let frame = self.buf.split_to(len);
                Some(decode_packet(&frame))
            }
            ResyncPolicy::ScanForMarker => match decode_packet(&self.buf[..len]) {
                Ok(packet) => {
                    self.buf.advance(len);
                    Some(Ok(packet))
                }
                Err(err) => {
                    // Neither the length byte nor the marker can be trusted; rescan from the next byte.
                    self.buf.advance(1);
                    Some(Err(err))
                }
            },
        }
    }

    fn skip_to_marker(&mut self) {
        if self.buf.starts_with(&START_MARKER) {
            return;
        }

        let skip = match self.buf.windows(2).position(|w| w == START_MARKER) {
            Some(pos) => pos,
            None if self.buf.last() == Some(&START_MARKER[0]) => self.buf.len() - 1,
            None => self.buf.len(),
        };

        if skip > 0 {
            warn!(skipped = skip, "discarding bytes before frame start marker");
            self.buf.advance(skip);
            self.skipped_bytes += skip as u64;
        }
    }

    /// Bytes received but not yet resolved into a frame.
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    /// Number of frames dropped by [`feed`](Self::feed) because they failed to decode.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Number of bytes discarded while scanning for a start marker.
    pub fn skipped_bytes(&self) -> u64 {
        self.skipped_bytes
    }

    /// Active resync policy.
    pub fn policy(&self) -> ResyncPolicy {
        self.policy
    }

    /// Discard any buffered partial frame.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::codec::{encode, encode_packet};

    fn wire(packets: &[(u8, &[u8])]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for (packet_type, data) in packets {
            encode_packet(*packet_type, data, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    fn summary(packets: &[Packet]) -> Vec<(u8, Vec<u8>)> {
        packets
            .iter()
            .map(|p| (p.packet_type(), p.data().to_vec()))
            .collect()
    }

    #[test]
    fn feed_single_frame() {
        let mut reassembler = FrameReassembler::new();
        let packets = reassembler.feed(&encode(2, &[1]).unwrap());

        assert_eq!(summary(&packets), vec![(2, vec![1])]);
        assert!(reassembler.buffered().is_empty());
    }

    #[test]
    fn feed_multiple_frames_in_one_call() {
        let stream = wire(&[(2, &[1]), (49, &[1]), (179, &[0, 1, 100, 100])]);
        let mut reassembler = FrameReassembler::new();
        let packets = reassembler.feed(&stream);

        assert_eq!(
            summary(&packets),
            vec![(2, vec![1]), (49, vec![1]), (179, vec![0, 1, 100, 100])]
        );
    }

    #[test]
    fn partial_frame_carried_across_calls() {
        let frame = encode(20, &[0x00, 0x10, 0x00, 0x20]).unwrap();
        let mut reassembler = FrameReassembler::new();

        assert!(reassembler.feed(&frame[..3]).is_empty());
        assert_eq!(reassembler.buffered(), &frame[..3]);
        assert!(reassembler.feed(&frame[3..9]).is_empty());
        assert_eq!(reassembler.buffered().len(), 9);

        let packets = reassembler.feed(&frame[9..]);
        assert_eq!(summary(&packets), vec![(20, vec![0x00, 0x10, 0x00, 0x20])]);
        assert!(reassembler.buffered().is_empty());
    }

    #[test]
    fn fragmentation_yields_same_sequence() {
        let stream = wire(&[
            (2, &[1]),
            (65, &[0x01, 0x02]),
            (179, &[0, 1, 100, 100]),
            (27, &[]),
            (133, &[0, 1, 2, 3, 0, 1, 0xFF, 0x80]),
        ]);

        let mut whole = FrameReassembler::new();
        let expected = summary(&whole.feed(&stream));
        assert_eq!(expected.len(), 5);

        for chunk_size in [1usize, 2, 3, 5, 7, 11, 64] {
            let mut reassembler = FrameReassembler::new();
            let mut packets = Vec::new();
            for chunk in stream.chunks(chunk_size) {
                packets.extend(reassembler.feed(chunk));
                // Never left holding a complete frame between passes.
                let buffered = reassembler.buffered();
                if buffered.len() > HEADER_SIZE {
                    assert!(buffered.len() < frame_len(buffered).unwrap());
                }
            }
            assert_eq!(summary(&packets), expected, "chunk size {chunk_size}");
            assert!(reassembler.buffered().is_empty());
        }
    }

    #[test]
    fn corrupt_frame_is_dropped_and_stream_continues() {
        let mut stream = wire(&[(2, &[1])]);
        let mut bad = encode(4, &[1]).unwrap().to_vec();
        bad[4] ^= 0x80;
        stream.extend_from_slice(&bad);
        stream.extend_from_slice(&encode(228, &[1]).unwrap());

        let mut reassembler = FrameReassembler::new();
        let packets = reassembler.feed(&stream);

        assert_eq!(summary(&packets), vec![(2, vec![1]), (228, vec![1])]);
        assert_eq!(reassembler.dropped_frames(), 1);
    }

    #[test]
    fn next_packet_surfaces_decode_error() {
        let mut bad = encode(4, &[1]).unwrap().to_vec();
        bad[0] = 0x00;

        let mut reassembler = FrameReassembler::new();
        reassembler.push(&bad);
        let err = reassembler.next_packet().unwrap().unwrap_err();
        assert!(err.is_framing());
        assert!(reassembler.next_packet().is_none());
        assert!(reassembler.buffered().is_empty());
    }

    #[test]
    fn scan_policy_skips_leading_garbage() {
        let mut stream = vec![0x00, 0x13, 0xAA, 0x10];
        stream.extend_from_slice(&wire(&[(2, &[1]), (4, &[1])]));

        let mut reassembler = FrameReassembler::with_policy(ResyncPolicy::ScanForMarker);
        let packets = reassembler.feed(&stream);

        assert_eq!(summary(&packets), vec![(2, vec![1]), (4, vec![1])]);
        assert_eq!(reassembler.skipped_bytes(), 4);
        assert_eq!(reassembler.dropped_frames(), 0);
    }

    #[test]
    fn scan_policy_handles_marker_byte_in_garbage() {
        let mut stream = vec![0x13, 0x55];
        stream.extend_from_slice(&wire(&[(2, &[1])]));

        let mut reassembler = FrameReassembler::with_policy(ResyncPolicy::ScanForMarker);
        let packets = reassembler.feed(&stream);

        assert_eq!(summary(&packets), vec![(2, vec![1])]);
        assert!(reassembler.buffered().is_empty());
    }

    #[test]
    fn scan_policy_recovers_from_corrupt_length() {
        let mut bad = encode(4, &[1, 2, 3]).unwrap().to_vec();
        bad[3] = 1; // declared length now points into the middle of the frame
        let mut stream = bad;
        stream.extend_from_slice(&wire(&[(2, &[1])]));

        let mut reassembler = FrameReassembler::with_policy(ResyncPolicy::ScanForMarker);
        let packets = reassembler.feed(&stream);

        assert_eq!(summary(&packets), vec![(2, vec![1])]);
        assert!(reassembler.dropped_frames() >= 1);
        assert!(reassembler.buffered().is_empty());
    }

    #[test]
    fn short_buffer_waits_for_header() {
        let mut reassembler = FrameReassembler::new();
        assert!(reassembler.feed(&[0x55, 0x55, 0x02, 0x01]).is_empty());
        assert_eq!(reassembler.buffered().len(), 4);

        reassembler.clear();
        assert!(reassembler.buffered().is_empty());
    }
}
