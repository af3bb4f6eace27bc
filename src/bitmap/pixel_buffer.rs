use std::fmt;
use std::sync::Arc;

use super::Canvas;
use crate::color::Color;
use crate::error::{Error, Result};

/// Bytes per ARGB8888 pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Checked `width * height * 4`, rejecting empty images
pub(crate) fn byte_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimension(format!(
            "{}x{} has no pixels",
            width, height
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .ok_or_else(|| Error::invalid_dimension(format!("{}x{} is too large", width, height)))
}

/// Immutable ARGB8888 image.
///
/// Pixels are tightly packed rows, each pixel stored as the little-endian bytes of
/// `0xAARRGGBB` (`[B, G, R, A]`), which is what SDL calls `ARGB8888`.
/// The length of the storage is always `width * height * 4`.
///
/// Cloning shares the storage, so one buffer can back several sprites or be read
/// from other threads. Every operation that changes pixels produces a new buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl PixelBuffer {
    /// Fully transparent buffer
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![0; len].into(),
        })
    }

    /// Buffer filled with a single color
    pub fn filled(width: u32, height: u32, color: Color) -> Result<Self> {
        let mut canvas = Canvas::new(width, height)?;
        canvas.clear(color);
        Ok(canvas.freeze())
    }

    /// Wrap raw `[B, G, R, A]` bytes. The length must match the dimensions exactly.
    pub fn from_argb_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        let len = byte_len(width, height)?;
        if bytes.len() != len {
            return Err(Error::invalid_dimension(format!(
                "{}x{} needs {} bytes, got {}",
                width,
                height,
                len,
                bytes.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels: bytes.into(),
        })
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel in row-major order
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Color) -> Result<Self> {
        let len = byte_len(width, height)?;
        let mut pixels = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y).to_bgra_bytes());
            }
        }
        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// Storage already validated by a [`Canvas`]
    pub(super) fn from_parts(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * BYTES_PER_PIXEL);
        Self {
            width,
            height,
            pixels: pixels.into(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row. Rows are tightly packed.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Number of pixels
    #[inline]
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Read a pixel. Returns None outside the buffer.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if self.in_bounds(x, y) {
            let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
            let px = &self.pixels[idx..idx + BYTES_PER_PIXEL];
            Some(Color::from_bgra_bytes([px[0], px[1], px[2], px[3]]))
        } else {
            None
        }
    }

    /// Pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Color> + '_ {
        self.pixels
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|px| Color::from_bgra_bytes([px[0], px[1], px[2], px[3]]))
    }

    /// Raw bytes for texture upload
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// True when both buffers share the same storage
    pub fn shares_storage(&self, other: &PixelBuffer) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// Mutable copy for drawing
    pub fn to_canvas(&self) -> Canvas {
        Canvas::from_parts(self.width, self.height, self.pixels.to_vec())
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
