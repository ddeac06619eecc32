/// Errors raised while validating a bitmap for rasterization.
///
/// All of these are detected before the first row is produced.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RasterError {
    /// Row indices are 16-bit on the wire.
    #[error("bitmap has {height} rows, max {max}")]
    TooManyRows { height: u32, max: u32 },

    /// The width does not fit the row header or a single packet.
    #[error("bitmap is {width} pixels wide, max {max} ({reason})")]
    WidthTooLarge {
        width: u32,
        max: u32,
        reason: &'static str,
    },

    /// The pixel buffer does not hold exactly `width * height` samples.
    #[error("pixel buffer holds {actual} samples, expected {expected}")]
    PixelBufferSize { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, RasterError>;
