//! Command session for NIIMBOT label printers.
//!
//! A [`Session`] owns one byte-stream link. Each command writes one request
//! packet and polls for the packet whose code is the request code plus the
//! command's response offset (see [`Command`]). Device error packets fail
//! the command; unrelated packets are logged and dropped.
//!
//! On top of that sit the typed command wrappers (`set_label_density`,
//! `get_print_status`, `get_rfid`, ...) and [`Session::print`], which runs a
//! complete print job for one bitmap.

pub mod command;
pub mod commands;
pub mod config;
pub mod error;
pub mod print;
pub mod session;
pub mod status;

pub use command::{CalibrationLabel, Command, CommandDescriptor, HeartbeatVariant, InfoCode};
pub use commands::{DENSITY_RANGE, LABEL_TYPE_RANGE};
pub use config::{SessionConfig, DEFAULT_RESPONSE_ATTEMPTS, DEFAULT_RESPONSE_INTERVAL};
pub use error::{Result, SessionError};
pub use print::{PrintOptions, PrintReport, PrintStep, PrinterModel};
pub use session::Session;
pub use status::{
    parse_heartbeat, parse_info, parse_print_status, parse_rfid, Heartbeat, InfoValue,
    PrintStatus, RfidTag,
};
