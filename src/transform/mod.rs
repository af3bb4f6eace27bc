//! Resampling and affine compositing
//!
//! Every operation reads immutable buffers and returns a new one. Nothing here
//! mutates its inputs, so a failed call never leaves a half-drawn result behind.

mod affine;
mod sample;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::bitmap::{Canvas, PixelBuffer};
use crate::color::Color;
use crate::error::{Error, Result};

pub use affine::Affine;
pub use sample::Interpolation;
use sample::sample;

// ============================================================================
// Resize policy
// ============================================================================

/// How a source is fitted into a target area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Native size at the origin; overflow is clipped, the rest stays empty
    #[default]
    None,
    /// Fill the target exactly, ignoring aspect ratio
    Stretch,
    /// Uniform scale covering the whole target, centered, overflow cropped
    TouchFromOutside,
    /// Uniform scale fitting inside the target, centered, letterboxed
    TouchFromInside,
}

impl ResizeMode {
    pub const ALL: [ResizeMode; 4] = [
        ResizeMode::None,
        ResizeMode::Stretch,
        ResizeMode::TouchFromOutside,
        ResizeMode::TouchFromInside,
    ];

    /// Next policy in [`ResizeMode::ALL`], wrapping around
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Stretch,
            Self::Stretch => Self::TouchFromOutside,
            Self::TouchFromOutside => Self::TouchFromInside,
            Self::TouchFromInside => Self::None,
        }
    }

    /// Where a `src_w x src_h` image lands inside a `dst_w x dst_h` area
    pub fn placement(self, src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Placement {
        match self {
            Self::None => Placement::new(0, 0, src_w, src_h),
            Self::Stretch => Placement::new(0, 0, dst_w, dst_h),
            Self::TouchFromOutside | Self::TouchFromInside => {
                if src_w == 0 || src_h == 0 {
                    return Placement::new(0, 0, dst_w, dst_h);
                }
                let sx = dst_w as f64 / src_w as f64;
                let sy = dst_h as f64 / src_h as f64;
                let s = if self == Self::TouchFromOutside {
                    sx.max(sy)
                } else {
                    sx.min(sy)
                };
                let w = ((src_w as f64 * s).round() as u32).max(1);
                let h = ((src_h as f64 * s).round() as u32).max(1);
                let x = (dst_w as i64 - w as i64) / 2;
                let y = (dst_h as i64 - h as i64) / 2;
                Placement::new(x as i32, y as i32, w, h)
            },
        }
    }
}

impl std::fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Stretch => "stretch",
            Self::TouchFromOutside => "touch-from-outside",
            Self::TouchFromInside => "touch-from-inside",
        };
        f.write_str(name)
    }
}

/// Destination rectangle. May extend past the target on any side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x
            && py >= self.y
            && (px - self.x) < self.width as i32
            && (py - self.y) < self.height as i32
    }
}

// ============================================================================
// Translation
// ============================================================================

/// Per-draw transform of the source image.
///
/// `rotation` is in radians about the source center (a full turn is `TAU`),
/// positive turning clockwise on screen. Flips mirror about the center and are
/// applied before the rotation. `scale` resizes the source first.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Translation {
    pub rotation: f32,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub scale: Option<(u32, u32, ResizeMode)>,
}

impl Translation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rotate(radians: f32) -> Self {
        Self {
            rotation: radians,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    #[must_use]
    pub fn flipped_horizontally(mut self) -> Self {
        self.flip_horizontal = !self.flip_horizontal;
        self
    }

    #[must_use]
    pub fn flipped_vertically(mut self) -> Self {
        self.flip_vertical = !self.flip_vertical;
        self
    }

    #[must_use]
    pub fn scaled_to(mut self, width: u32, height: u32, mode: ResizeMode) -> Self {
        self.scale = Some((width, height, mode));
        self
    }

    /// Source-to-destination matrix for a `w x h` source placed at `(x, y)`
    pub fn matrix(&self, w: u32, h: u32, x: f32, y: f32) -> Affine {
        let cx = w as f32 / 2.0;
        let cy = h as f32 / 2.0;
        Affine::flip_about(self.flip_horizontal, self.flip_vertical, cx, cy)
            .then(Affine::rotate_about(self.rotation, cx, cy))
            .then(Affine::translate(x, y))
    }
}

// ============================================================================
// Operations
// ============================================================================

/// Resize with bilinear filtering
pub fn resize(buffer: &PixelBuffer, width: u32, height: u32, mode: ResizeMode) -> Result<PixelBuffer> {
    resize_with(buffer, width, height, mode, Interpolation::Bilinear)
}

/// Resize into a new `width x height` buffer. Area outside the placement is transparent.
pub fn resize_with(
    buffer: &PixelBuffer,
    width: u32,
    height: u32,
    mode: ResizeMode,
    interpolation: Interpolation,
) -> Result<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimension(format!(
            "resize target {}x{} has no pixels",
            width, height
        )));
    }
    let (sw, sh) = (buffer.width(), buffer.height());
    let p = mode.placement(sw, sh, width, height);
    if p == Placement::new(0, 0, sw, sh) && (width, height) == (sw, sh) {
        return Ok(buffer.clone());
    }
    trace!(?mode, from = ?(sw, sh), to = ?(width, height), ?p, "resize");

    // No resampling happens at native size.
    let interpolation = if mode == ResizeMode::None {
        Interpolation::Nearest
    } else {
        interpolation
    };
    let kx = sw as f32 / p.width as f32;
    let ky = sh as f32 / p.height as f32;
    PixelBuffer::from_fn(width, height, |x, y| {
        let (x, y) = (x as i32, y as i32);
        if !p.contains(x, y) {
            return Color::TRANSPARENT;
        }
        let u = ((x - p.x) as f32 + 0.5) * kx;
        let v = ((y - p.y) as f32 + 0.5) * ky;
        sample(buffer, u, v, interpolation)
    })
}

/// Composite `source` over `destination` at `(x, y)` with bilinear sampling
pub fn draw(
    destination: &PixelBuffer,
    source: &PixelBuffer,
    x: f32,
    y: f32,
    translation: &Translation,
) -> Result<PixelBuffer> {
    draw_with(destination, source, x, y, translation, Interpolation::Bilinear)
}

/// Like [`draw`] for callers holding an optional source
pub fn draw_optional(
    destination: &PixelBuffer,
    source: Option<&PixelBuffer>,
    x: f32,
    y: f32,
    translation: &Translation,
) -> Result<PixelBuffer> {
    let source = source.ok_or_else(|| Error::invalid_argument("draw source is missing"))?;
    draw(destination, source, x, y, translation)
}

/// Composite `source` over a copy of `destination`.
///
/// The source (after the optional scale) is flipped and rotated about its own
/// center, then its top-left corner is moved to `(x, y)`. Every destination
/// pixel center inside the transformed bounds is mapped back into source space,
/// sampled, and blended source-over.
pub fn draw_with(
    destination: &PixelBuffer,
    source: &PixelBuffer,
    x: f32,
    y: f32,
    translation: &Translation,
    interpolation: Interpolation,
) -> Result<PixelBuffer> {
    if !translation.rotation.is_finite() || !x.is_finite() || !y.is_finite() {
        return Err(Error::invalid_argument(format!(
            "non-finite draw parameters: rotation {} at ({}, {})",
            translation.rotation, x, y
        )));
    }
    let source: Cow<'_, PixelBuffer> = match translation.scale {
        Some((w, h, mode)) => Cow::Owned(resize_with(source, w, h, mode, interpolation)?),
        None => Cow::Borrowed(source),
    };

    let forward = translation.matrix(source.width(), source.height(), x, y);
    if bounds(&forward, &source, destination.width(), destination.height()).is_none() {
        return Ok(destination.clone());
    }
    let mut canvas = destination.to_canvas();
    composite(&mut canvas, &source, &forward, interpolation, |c| c);
    Ok(canvas.freeze())
}

/// Blend `source` into `canvas` through a source-to-canvas matrix.
///
/// Each canvas pixel center inside the transformed bounds is mapped back into
/// source space, sampled, passed through `shade`, and blended source-over.
/// Returns false when nothing could be drawn.
pub(crate) fn composite(
    canvas: &mut Canvas,
    source: &PixelBuffer,
    forward: &Affine,
    interpolation: Interpolation,
    shade: impl Fn(Color) -> Color,
) -> bool {
    let Some(inverse) = forward.inverse() else {
        return false;
    };
    let Some((x0, y0, x1, y1)) = bounds(forward, source, canvas.width(), canvas.height()) else {
        return false;
    };

    // Step through source space one destination pixel at a time.
    for dy in y0..y1 {
        let (mut u, mut v) = inverse.apply(x0 as f32 + 0.5, dy as f32 + 0.5);
        for dx in x0..x1 {
            let c = sample(source, u, v, interpolation);
            if c.a != 0 {
                canvas.blend_pixel(dx, dy, shade(c));
            }
            u += inverse.a;
            v += inverse.b;
        }
    }
    true
}

/// Destination pixel range touched by the transformed source, clipped
fn bounds(
    forward: &Affine,
    source: &PixelBuffer,
    width: u32,
    height: u32,
) -> Option<(i32, i32, i32, i32)> {
    let (w, h) = (source.width() as f32, source.height() as f32);
    let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)].map(|(px, py)| forward.apply(px, py));
    let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
    let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
    let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
    let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);
    if !(min_x.is_finite() && max_x.is_finite() && min_y.is_finite() && max_y.is_finite()) {
        return None;
    }

    let x0 = (min_x.floor() as i32).max(0);
    let y0 = (min_y.floor() as i32).max(0);
    let x1 = (max_x.ceil() as i32).min(width as i32);
    let y1 = (max_y.ceil() as i32).min(height as i32);
    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}

/// Mirror left to right
pub fn flip_horizontal(buffer: &PixelBuffer) -> Result<PixelBuffer> {
    let w = buffer.width() as i32;
    PixelBuffer::from_fn(buffer.width(), buffer.height(), |x, y| {
        buffer
            .pixel(w - 1 - x as i32, y as i32)
            .unwrap_or_default()
    })
}

/// Mirror top to bottom
pub fn flip_vertical(buffer: &PixelBuffer) -> Result<PixelBuffer> {
    let h = buffer.height() as i32;
    PixelBuffer::from_fn(buffer.width(), buffer.height(), |x, y| {
        buffer
            .pixel(x as i32, h - 1 - y as i32)
            .unwrap_or_default()
    })
}

/// Rotate about the center into a same-sized transparent buffer. Corners that
/// leave the frame are clipped.
pub fn rotate(buffer: &PixelBuffer, radians: f32) -> Result<PixelBuffer> {
    let canvas = PixelBuffer::new(buffer.width(), buffer.height())?;
    draw(&canvas, buffer, 0.0, 0.0, &Translation::rotate(radians))
}
