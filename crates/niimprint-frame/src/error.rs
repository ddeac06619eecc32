/// Errors that can occur during packet encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame does not start with the `0x55 0x55` marker.
    #[error("invalid frame start marker (expected 0x55 0x55, got {0:#04x} {1:#04x})")]
    InvalidStartMarker(u8, u8),

    /// The frame does not end with the `0xAA 0xAA` marker.
    #[error("invalid frame end marker (expected 0xaa 0xaa, got {0:#04x} {1:#04x})")]
    InvalidEndMarker(u8, u8),

    /// The declared data length disagrees with the size of the frame slice.
    #[error("frame length mismatch (header declares {declared} data bytes, frame holds {actual} bytes)")]
    LengthMismatch { declared: usize, actual: usize },

    /// The slice is shorter than the smallest possible frame.
    #[error("frame truncated ({len} bytes, min {min})")]
    Truncated { len: usize, min: usize },

    /// The embedded checksum does not match the recomputed one.
    #[error("checksum mismatch (computed {expected:#04x}, frame carries {found:#04x})")]
    Checksum { expected: u8, found: u8 },

    /// The payload does not fit the one-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing packets.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream reported end-of-file or refused further writes.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// True for errors caused by bad markers or lengths rather than corrupt payload bytes.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            FrameError::InvalidStartMarker(..)
                | FrameError::InvalidEndMarker(..)
                | FrameError::LengthMismatch { .. }
                | FrameError::Truncated { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
