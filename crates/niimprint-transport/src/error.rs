/// Errors that can occur while locating or talking to a printer port.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No enumerated port matched the requested address or device filter.
    #[error("no printer found at {address}")]
    NotFound { address: String },

    /// The port exists but could not be opened.
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    /// The platform refused to list serial ports.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(std::io::Error),

    /// The transport has been closed.
    #[error("transport closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
