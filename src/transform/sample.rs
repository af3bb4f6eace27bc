use serde::{Deserialize, Serialize};

use crate::bitmap::PixelBuffer;
use crate::color::Color;

/// How a source image is read between pixel centers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
}

/// Read `src` at continuous coordinates, pixel `(i, j)` covering `[i, i+1) x [j, j+1)`.
///
/// Points outside `[0, w) x [0, h)` are transparent; there is no edge
/// extension. For a point inside the image, a bilinear tap that would land
/// past the border reuses the nearest border texel, so the outermost half
/// pixel never mixes with the outside.
#[inline]
pub(crate) fn sample(src: &PixelBuffer, u: f32, v: f32, interpolation: Interpolation) -> Color {
    let (w, h) = (src.width() as f32, src.height() as f32);
    if !(u >= 0.0 && u < w && v >= 0.0 && v < h) {
        return Color::TRANSPARENT;
    }
    match interpolation {
        Interpolation::Nearest => nearest(src, u, v),
        Interpolation::Bilinear => bilinear(src, u, v),
    }
}

#[inline]
fn texel(src: &PixelBuffer, x: i32, y: i32) -> Color {
    src.pixel(x, y).unwrap_or(Color::TRANSPARENT)
}

#[inline]
fn nearest(src: &PixelBuffer, u: f32, v: f32) -> Color {
    texel(src, u as i32, v as i32)
}

fn bilinear(src: &PixelBuffer, u: f32, v: f32) -> Color {
    let max_x = src.width() as i32 - 1;
    let max_y = src.height() as i32 - 1;

    let x = u - 0.5;
    let y = v - 0.5;
    let x0f = x.floor();
    let y0f = y.floor();
    let fx = x - x0f;
    let fy = y - y0f;
    let x0 = (x0f as i32).clamp(0, max_x);
    let y0 = (y0f as i32).clamp(0, max_y);
    let x1 = (x0f as i32 + 1).clamp(0, max_x);
    let y1 = (y0f as i32 + 1).clamp(0, max_y);

    let taps = [
        (texel(src, x0, y0), (1.0 - fx) * (1.0 - fy)),
        (texel(src, x1, y0), fx * (1.0 - fy)),
        (texel(src, x0, y1), (1.0 - fx) * fy),
        (texel(src, x1, y1), fx * fy),
    ];

    // Premultiplied accumulation keeps transparent texels from darkening edges.
    let (mut a, mut r, mut g, mut b) = (0.0f32, 0.0f32, 0.0f32, 0.0f32);
    for (c, weight) in taps {
        let wa = weight * c.a as f32;
        a += wa;
        r += wa * c.r as f32;
        g += wa * c.g as f32;
        b += wa * c.b as f32;
    }
    if a <= 0.0 {
        return Color::TRANSPARENT;
    }
    let channel = |v: f32| (v / a).round().clamp(0.0, 255.0) as u8;
    Color::from_argb(
        a.round().clamp(0.0, 255.0) as u8,
        channel(r),
        channel(g),
        channel(b),
    )
}
