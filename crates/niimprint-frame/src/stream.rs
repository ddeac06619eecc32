use std::io::{ErrorKind, Read, Write};

use bytes::BytesMut;
use tracing::debug;

use crate::codec::{encode_packet, Packet, FRAME_OVERHEAD, MAX_DATA_LEN};
use crate::error::{FrameError, Result};
use crate::reassembler::{FrameReassembler, ResyncPolicy};

/// Default number of bytes requested from the transport per poll.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// Writes packets to, and reassembles packets from, one byte stream.
///
/// Writes are complete and flushed before returning. Reads are polls: each
/// call takes whatever the transport has available right now.
pub struct PacketStream<T> {
    inner: T,
    reassembler: FrameReassembler,
    write_buf: BytesMut,
    read_chunk_size: usize,
}

impl<T: Read + Write> PacketStream<T> {
    /// Wrap a stream with the default resync policy.
    pub fn new(inner: T) -> Self {
        Self::with_policy(inner, ResyncPolicy::default())
    }

    /// Wrap a stream with an explicit resync policy.
    pub fn with_policy(inner: T, policy: ResyncPolicy) -> Self {
        Self {
            inner,
            reassembler: FrameReassembler::with_policy(policy),
            write_buf: BytesMut::with_capacity(FRAME_OVERHEAD + MAX_DATA_LEN),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }

    /// Encode and send one packet, then flush (blocking).
    pub fn write_packet(&mut self, packet_type: u8, data: &[u8]) -> Result<()> {
        self.write_buf.clear();
        encode_packet(packet_type, data, &mut self.write_buf)?;
        debug!(packet_type, len = data.len(), "writing packet");

        let mut offset = 0usize;
        while offset < self.write_buf.len() {
            match self.inner.write(&self.write_buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Send an already constructed packet.
    pub fn send(&mut self, packet: &Packet) -> Result<()> {
        self.write_packet(packet.packet_type(), packet.data())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Read whatever bytes are available and return the packets they complete.
    ///
    /// A read that would block, times out, or returns nothing yields an empty
    /// batch; only genuine I/O failures are errors.
    pub fn poll(&mut self) -> Result<Vec<Packet>> {
        let mut chunk = vec![0u8; self.read_chunk_size];
        let read = loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => break n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    break 0
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        };

        if read == 0 {
            return Ok(Vec::new());
        }

        debug!(len = read, "received bytes");
        Ok(self.reassembler.feed(&chunk[..read]))
    }

    /// Update the number of bytes requested per poll.
    pub fn set_read_chunk_size(&mut self, read_chunk_size: usize) {
        self.read_chunk_size = read_chunk_size.max(1);
    }

    /// The reassembler holding any partial frame.
    pub fn reassembler(&self) -> &FrameReassembler {
        &self.reassembler
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the wrapper and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> std::fmt::Debug for PacketStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketStream")
            .field("buffered", &self.reassembler.buffered().len())
            .field("read_chunk_size", &self.read_chunk_size)
            .finish()
    }
}
