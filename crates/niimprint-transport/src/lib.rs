//! Byte-stream transport for NIIMBOT label printers.
//!
//! The printers enumerate as USB CDC serial ports. This crate finds the right
//! port and opens it as a plain `Read + Write` stream; everything above it
//! (framing, commands, rasterizing) works on any such stream.
//!
//! Port selection is pure ([`select_port`]) so it can be tested without
//! hardware. Opening real ports needs the `serial` feature (on by default).

pub mod discovery;
pub mod error;

#[cfg(feature = "serial")]
pub mod serial;

pub use discovery::{
    select_port, DeviceFilter, PortCandidate, NIIMBOT_MANUFACTURER, NIIMBOT_PRODUCT_ID,
    NIIMBOT_VENDOR_ID,
};
pub use error::{Result, TransportError};

#[cfg(feature = "serial")]
pub use serial::{
    available_ports, SerialConfig, SerialTransport, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT,
};
