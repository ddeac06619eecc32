//! Serial protocol client for NIIMBOT thermal label printers.
//!
//! niimprint speaks the B-series/D-series packet protocol over any byte
//! stream: frame encoding and reassembly, a request/response command
//! session, and a rasterizer that turns a grayscale bitmap into the
//! printer's row payloads.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial port discovery and opening (behind `serial` feature)
//! - [`frame`]: `0x55 0x55 ... 0xAA 0xAA` packet codec and stream reassembly
//! - [`raster`]: bitmap to `IMAGE_DATA` row conversion
//! - [`session`]: command session, device reports and print jobs
//! - `logging`: `tracing-subscriber` bootstrap (behind `logging` feature)
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "serial")]
//! # fn main() -> Result<(), niimprint::session::SessionError> {
//! use niimprint::raster::GrayBitmap;
//! use niimprint::session::{PrintOptions, PrinterModel, Session};
//!
//! let session = Session::open(None)?;
//! let mut label = GrayBitmap::blank(96, 32);
//! for x in 0..96 {
//!     label.set(x, 16, 255);
//! }
//! let report = session.print(&label, &PrintOptions::default().with_model(PrinterModel::D110))?;
//! println!("sent {} rows", report.rows_sent);
//! session.close();
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "serial"))]
//! # fn main() {}
//! ```

/// Re-export transport types.
pub mod transport {
    pub use niimprint_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use niimprint_frame::*;
}

/// Re-export raster types.
pub mod raster {
    pub use niimprint_raster::*;
}

/// Re-export session types.
pub mod session {
    pub use niimprint_session::*;
}

#[cfg(feature = "logging")]
pub mod logging;

pub use niimprint_frame::Packet;
pub use niimprint_raster::{Bitmap, GrayBitmap};
pub use niimprint_session::{PrintOptions, PrintReport, Session, SessionError};
