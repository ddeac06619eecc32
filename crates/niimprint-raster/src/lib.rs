//! Rasterizer for NIIMBOT label printers.
//!
//! Turns a decoded grayscale bitmap into the per-row `IMAGE_DATA` payloads
//! the printer expects: a 6-byte header (row index, left/right blank
//! margins, repeat count) followed by the row packed MSB-first.
//!
//! Rows whose width is not a multiple of 8 end in a partial byte; its unused
//! low bits are always 0 (blank), since the row payload does not carry the
//! true width.

pub mod bitmap;
pub mod error;
pub mod options;
pub mod rasterizer;
pub mod row;

pub use bitmap::{Bitmap, GrayBitmap, Inverted};
pub use error::{RasterError, Result};
pub use options::{MarginMode, RasterOptions};
pub use rasterizer::{
    bytes_per_row, rasterize, Rasterizer, Rows, MAX_MARGIN_WIDTH, MAX_PACKET_WIDTH, MAX_ROWS,
};
pub use row::{RasterRow, ROW_HEADER_SIZE};
