use crate::error::{RasterError, Result};

/// A decoded grayscale image in printer polarity.
///
/// `pixel` returns ink intensity: any non-zero value prints, zero is blank.
/// Ordinary luma (white = 255) must be inverted first, see
/// [`GrayBitmap::from_luma`] and [`Inverted`].
pub trait Bitmap {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Intensity at `(x, y)`. Callers stay within `width() x height()`.
    fn pixel(&self, x: u32, y: u32) -> u8;
}

impl<B: Bitmap + ?Sized> Bitmap for &B {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn pixel(&self, x: u32, y: u32) -> u8 {
        (**self).pixel(x, y)
    }
}

/// Row-major 8-bit bitmap held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayBitmap {
    width: u32,
    height: u32,
    ink: Vec<u8>,
}

impl GrayBitmap {
    /// Wrap samples that are already in ink polarity (non-zero prints).
    pub fn from_ink(width: u32, height: u32, ink: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if ink.len() != expected {
            return Err(RasterError::PixelBufferSize {
                expected,
                actual: ink.len(),
            });
        }
        Ok(Self { width, height, ink })
    }

    /// Convert ordinary luma samples (0 = black, 255 = white) to ink polarity.
    pub fn from_luma(width: u32, height: u32, mut luma: Vec<u8>) -> Result<Self> {
        for sample in &mut luma {
            *sample = 255 - *sample;
        }
        Self::from_ink(width, height, luma)
    }

    /// A fully blank bitmap.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ink: vec![0; width as usize * height as usize],
        }
    }

    /// Set one pixel's ink intensity.
    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        let index = self.index(x, y);
        self.ink[index] = value;
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.ink
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl Bitmap for GrayBitmap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> u8 {
        self.ink[self.index(x, y)]
    }
}

/// Flips the polarity of another bitmap (`255 - v`).
#[derive(Debug, Clone)]
pub struct Inverted<B>(pub B);

impl<B: Bitmap> Bitmap for Inverted<B> {
    fn width(&self) -> u32 {
        self.0.width()
    }

    fn height(&self) -> u32 {
        self.0.height()
    }

    fn pixel(&self, x: u32, y: u32) -> u8 {
        255 - self.0.pixel(x, y)
    }
}
