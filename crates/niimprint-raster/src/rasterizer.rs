use tracing::{debug, warn};

use crate::bitmap::Bitmap;
use crate::error::{RasterError, Result};
use crate::options::{MarginMode, RasterOptions};
use crate::row::{RasterRow, ROW_HEADER_SIZE};

/// Row indices and the page height are 16-bit on the wire.
pub const MAX_ROWS: u32 = u16::MAX as u32;

/// Largest width whose half still fits a one-byte margin.
pub const MAX_MARGIN_WIDTH: u32 = 2 * u8::MAX as u32 + 1;

/// Largest width whose row payload fits one packet.
pub const MAX_PACKET_WIDTH: u32 = ((u8::MAX as usize - ROW_HEADER_SIZE) * 8) as u32;

/// Bytes needed for one packed row.
pub fn bytes_per_row(width: u32) -> usize {
    width.div_ceil(8) as usize
}

/// Converts a bitmap into `IMAGE_DATA` rows.
///
/// Validation happens once in [`Rasterizer::new`]; producing rows cannot fail.
/// [`rows`](Self::rows) can be called any number of times and always yields
/// the same sequence.
#[derive(Debug)]
pub struct Rasterizer<B> {
    bitmap: B,
    options: RasterOptions,
    row_bytes: usize,
}

impl<B: Bitmap> Rasterizer<B> {
    pub fn new(bitmap: B, options: RasterOptions) -> Result<Self> {
        let width = bitmap.width();
        let height = bitmap.height();

        if height > MAX_ROWS {
            return Err(RasterError::TooManyRows {
                height,
                max: MAX_ROWS,
            });
        }
        if options.margin_mode == MarginMode::Computed && width > MAX_MARGIN_WIDTH {
            return Err(RasterError::WidthTooLarge {
                width,
                max: MAX_MARGIN_WIDTH,
                reason: "half width must fit a one-byte margin",
            });
        }
        if width > MAX_PACKET_WIDTH {
            return Err(RasterError::WidthTooLarge {
                width,
                max: MAX_PACKET_WIDTH,
                reason: "row payload must fit one packet",
            });
        }

        if width % 8 != 0 {
            warn!(
                width,
                pad_bits = 8 - width % 8,
                "bitmap width is not a multiple of 8; padding each row with blank bits"
            );
        }
        debug!(width, height, margin_mode = ?options.margin_mode, "rasterizing bitmap");

        Ok(Self {
            bitmap,
            options,
            row_bytes: bytes_per_row(width),
        })
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Number of packed bytes per row.
    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    /// Lazily produce every row, top to bottom.
    pub fn rows(&self) -> Rows<'_, B> {
        Rows {
            rasterizer: self,
            next: 0,
            end: self.height(),
        }
    }

    /// Build a single row. `y` must be below [`height`](Self::height).
    pub fn row(&self, y: u32) -> RasterRow {
        let width = self.width();
        let mut bits = vec![0u8; self.row_bytes];
        for x in 0..width {
            if self.bitmap.pixel(x, y) != 0 {
                bits[(x / 8) as usize] |= 0x80 >> (x % 8);
            }
        }

        let (left_margin, right_margin) = match self.options.margin_mode {
            MarginMode::Computed => self.margins(y),
            MarginMode::Zeroed => (0, 0),
        };

        RasterRow {
            row_index: y as u16,
            left_margin,
            right_margin,
            repeat_count: 1,
            bits,
        }
    }

    /// Blank pixels from each edge up to the first inked pixel, bounded by the
    /// half width: `[0, mid)` on the left, `[width - mid, width)` on the right.
    ///
    /// This is the run of blank pixels at the edge, not `mid` minus the inked
    /// pixel count of each half: `1111000000001111` yields 0/0.
    fn margins(&self, y: u32) -> (u8, u8) {
        let width = self.width();
        let mid = width / 2;
        let inked = |x: u32| self.bitmap.pixel(x, y) != 0;

        let left = (0..mid).position(inked).map_or(mid, |p| p as u32);
        let right = (width - mid..width)
            .rev()
            .position(inked)
            .map_or(mid, |p| p as u32);

        // mid <= 255 is enforced in `new`.
        (left as u8, right as u8)
    }
}

/// Iterator over a rasterizer's rows.
#[derive(Debug)]
pub struct Rows<'a, B> {
    rasterizer: &'a Rasterizer<B>,
    next: u32,
    end: u32,
}

impl<B: Bitmap> Iterator for Rows<'_, B> {
    type Item = RasterRow;

    fn next(&mut self) -> Option<RasterRow> {
        if self.next >= self.end {
            return None;
        }
        let row = self.rasterizer.row(self.next);
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl<B: Bitmap> ExactSizeIterator for Rows<'_, B> {}

/// Validate `bitmap` and collect all of its rows.
pub fn rasterize<B: Bitmap>(bitmap: B, options: RasterOptions) -> Result<Vec<RasterRow>> {
    let rasterizer = Rasterizer::new(bitmap, options)?;
    Ok(rasterizer.rows().collect())
}
