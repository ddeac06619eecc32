use crate::print::PrintStep;

/// Errors that can occur while talking to a printer.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Frame-level error while writing or reading packets.
    #[error("frame error: {0}")]
    Frame(#[from] niimprint_frame::FrameError),

    /// Transport-level error while opening the port.
    #[error("transport error: {0}")]
    Transport(#[from] niimprint_transport::TransportError),

    /// The bitmap cannot be rasterized.
    #[error("raster error: {0}")]
    Raster(#[from] niimprint_raster::RasterError),

    /// The device answered with a value-error packet.
    #[error("{command} rejected by device (response code {response})")]
    DeviceRejected { command: &'static str, response: u8 },

    /// The device answered with an unimplemented-command packet.
    #[error("{command} not supported by device")]
    UnsupportedCommand { command: &'static str },

    /// The expected response never arrived.
    #[error("no response {expected} to {command} after {attempts} attempts")]
    ResponseTimeout {
        command: &'static str,
        expected: u8,
        attempts: u32,
    },

    /// The session was closed before or during the command.
    #[error("transport closed")]
    TransportClosed,

    /// A caller-supplied value is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Another command is already in flight on this session.
    #[error("session busy: another command is in flight")]
    Busy,

    /// The response arrived but its data could not be decoded.
    #[error("malformed {command} response: {reason}")]
    MalformedResponse {
        command: &'static str,
        reason: String,
    },

    /// A print job failed at the given step.
    #[error("print failed at step {step}: {source}")]
    PrintStep {
        step: PrintStep,
        #[source]
        source: Box<SessionError>,
    },
}

impl SessionError {
    pub(crate) fn malformed(command: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            command,
            reason: reason.into(),
        }
    }

    /// The innermost error, looking through print-step wrapping.
    pub fn root(&self) -> &SessionError {
        match self {
            Self::PrintStep { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
