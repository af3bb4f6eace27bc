//! Procedural test images
//!
//! Checkerboards, color bars and simple shapes used by the demos and tests.

use super::{Canvas, PixelBuffer};
use crate::color::Color;
use crate::error::{Error, Result};

/// Color bar order used by [`color_stripes`]
pub const STRIPE_COLORS: [Color; 8] = [
    Color::RED,
    Color::GREEN,
    Color::BLUE,
    Color::WHITE,
    Color::MAGENTA,
    Color::CYAN,
    Color::YELLOW,
    Color::BLACK,
];

/// Checkerboard with `field_w x field_h` fields. The top-left field uses `fg`.
pub fn checkerboard(
    width: u32,
    height: u32,
    field_w: u32,
    field_h: u32,
    fg: Color,
    bg: Color,
) -> Result<PixelBuffer> {
    if field_w == 0 || field_h == 0 {
        return Err(Error::invalid_dimension("checkerboard field size must be positive"));
    }
    PixelBuffer::from_fn(width, height, |x, y| {
        if (x / field_w + y / field_h) % 2 == 0 {
            fg
        } else {
            bg
        }
    })
}

/// Eight equally sized bars in [`STRIPE_COLORS`] order
pub fn color_stripes(width: u32, height: u32, horizontal: bool) -> Result<PixelBuffer> {
    stripes(width, height, horizontal, |i| STRIPE_COLORS[i])
}

/// Eight gray bars of ascending brightness (0, 32, ..., 224)
pub fn gray_stripes(width: u32, height: u32, horizontal: bool) -> Result<PixelBuffer> {
    stripes(width, height, horizontal, |i| {
        let v = (i * 32) as u8;
        Color::from_rgb(v, v, v)
    })
}

fn stripes(
    width: u32,
    height: u32,
    horizontal: bool,
    color_of: impl Fn(usize) -> Color,
) -> Result<PixelBuffer> {
    PixelBuffer::from_fn(width, height, |x, y| {
        let (pos, extent) = if horizontal { (y, height) } else { (x, width) };
        let band = (pos as u64 * 8 / extent as u64) as usize;
        color_of(band.min(7))
    })
}

/// Centered rectangle covering `ratio` of each dimension
pub fn rectangle(
    width: u32,
    height: u32,
    fg: Color,
    bg: Color,
    ratio: f32,
    filled: bool,
) -> Result<PixelBuffer> {
    let mut canvas = Canvas::new(width, height)?;
    canvas.clear(bg);
    let ratio = ratio.clamp(0.0, 1.0);
    let w = (width as f32 * ratio).round() as u32;
    let h = (height as f32 * ratio).round() as u32;
    let x = ((width - w) / 2) as i32;
    let y = ((height - h) / 2) as i32;
    if filled {
        canvas.fill_rect(x, y, w, h, fg);
    } else {
        canvas.stroke_rect(x, y, w, h, fg);
    }
    Ok(canvas.freeze())
}

/// Centered ellipse whose axes cover `ratio` of each dimension
pub fn ellipse(
    width: u32,
    height: u32,
    fg: Color,
    bg: Color,
    ratio: f32,
    filled: bool,
) -> Result<PixelBuffer> {
    let mut canvas = Canvas::new(width, height)?;
    canvas.clear(bg);
    let ratio = ratio.clamp(0.0, 1.0);
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let (rx, ry) = (cx * ratio, cy * ratio);
    if filled {
        canvas.fill_ellipse(cx, cy, rx, ry, fg);
    } else {
        canvas.stroke_ellipse(cx, cy, rx, ry, fg);
    }
    Ok(canvas.freeze())
}

/// Filled disc touching all four edges on a transparent background
pub fn circle(size: u32, color: Color) -> Result<PixelBuffer> {
    ellipse(size, size, color, Color::TRANSPARENT, 1.0, true)
}

/// Black image with red top-right, green bottom-left and blue bottom-right quadrants
pub fn quadrants(width: u32, height: u32) -> Result<PixelBuffer> {
    let (hw, hh) = (width / 2, height / 2);
    PixelBuffer::from_fn(width, height, |x, y| match (x >= hw, y >= hh) {
        (false, false) => Color::BLACK,
        (true, false) => Color::RED,
        (false, true) => Color::GREEN,
        (true, true) => Color::BLUE,
    })
}

/// Segment masks for '0'..='9', bit 0 = top, then clockwise, bit 6 = middle
const SEGMENTS: [u8; 10] = [
    0b011_1111, 0b000_0110, 0b101_1011, 0b100_1111, 0b110_0110,
    0b110_1101, 0b111_1101, 0b000_0111, 0b111_1111, 0b110_1111,
];

/// Framed text label.
///
/// A `ratio`-sized outline is centered on `bg` and `text` is drawn inside it in
/// seven-segment style. Digits, `-`, `.` and `:` are drawn; other characters
/// leave a gap.
pub fn label(
    width: u32,
    height: u32,
    fg: Color,
    bg: Color,
    text: &str,
    ratio: f32,
) -> Result<PixelBuffer> {
    let mut canvas = Canvas::new(width, height)?;
    canvas.clear(bg);
    let ratio = ratio.clamp(0.0, 1.0);
    let bw = (width as f32 * ratio).round() as u32;
    let bh = (height as f32 * ratio).round() as u32;
    let bx = ((width - bw) / 2) as i32;
    let by = ((height - bh) / 2) as i32;
    canvas.stroke_rect(bx, by, bw, bh, fg);

    let glyph_h = (bh as f32 * 0.72) as i32;
    if glyph_h < 5 {
        return Ok(canvas.freeze());
    }
    let glyph_w = glyph_h / 2;
    let stroke = (glyph_h / 8).max(1);
    let gap = stroke;
    let advance = |c: char| match c {
        '.' | ':' => stroke * 2,
        _ => glyph_w,
    };
    let total: i32 = text.chars().map(|c| advance(c) + gap).sum::<i32>() - gap;
    let mut x = bx + (bw as i32 - total.max(0)) / 2;
    let y = by + (bh as i32 - glyph_h) / 2;

    for c in text.chars() {
        draw_glyph(&mut canvas, c, x, y, glyph_w, glyph_h, stroke, fg);
        x += advance(c) + gap;
    }
    Ok(canvas.freeze())
}

fn draw_glyph(canvas: &mut Canvas, c: char, x: i32, y: i32, w: i32, h: i32, t: i32, fg: Color) {
    let fill = |canvas: &mut Canvas, x: i32, y: i32, w: i32, h: i32| {
        canvas.fill_rect(x, y, w.max(0) as u32, h.max(0) as u32, fg);
    };
    let mask = match c {
        '0'..='9' => SEGMENTS[c as usize - '0' as usize],
        '-' => 0b100_0000,
        '.' => {
            fill(canvas, x, y + h - t, t, t);
            return;
        },
        ':' => {
            fill(canvas, x, y + h / 3 - t / 2, t, t);
            fill(canvas, x, y + 2 * h / 3 - t / 2, t, t);
            return;
        },
        _ => 0,
    };
    let half = h / 2;
    let rects = [
        (x, y, w, t),
        (x + w - t, y, t, half),
        (x + w - t, y + half, t, h - half),
        (x, y + h - t, w, t),
        (x, y + half, t, h - half),
        (x, y, t, half),
        (x, y + half - t / 2, w, t),
    ];
    for (bit, (rx, ry, rw, rh)) in rects.into_iter().enumerate() {
        if mask & (1 << bit) != 0 {
            fill(canvas, rx, ry, rw, rh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_fields() {
        let b = checkerboard(64, 64, 8, 8, Color::BLUE, Color::GRAY).unwrap();
        assert_eq!(b.pixel(0, 0), Some(Color::BLUE));
        assert_eq!(b.pixel(8, 0), Some(Color::GRAY));
        assert_eq!(b.pixel(8, 8), Some(Color::BLUE));
        assert_eq!(b.pixel(63, 0), Some(Color::GRAY));
    }

    #[test]
    fn test_checkerboard_rejects_empty_field() {
        assert!(checkerboard(8, 8, 0, 8, Color::BLUE, Color::GRAY).is_err());
    }

    #[test]
    fn test_color_stripes_vertical_bands() {
        let b = color_stripes(256, 16, false).unwrap();
        for (i, expected) in STRIPE_COLORS.iter().enumerate() {
            assert_eq!(b.pixel(i as i32 * 32 + 16, 8), Some(*expected));
        }
    }

    #[test]
    fn test_gray_stripes_horizontal_bands() {
        let b = gray_stripes(4, 80, true).unwrap();
        assert_eq!(b.pixel(0, 0), Some(Color::from_rgb(0, 0, 0)));
        assert_eq!(b.pixel(0, 79), Some(Color::from_rgb(224, 224, 224)));
    }

    #[test]
    fn test_rectangle_outline_leaves_center() {
        let b = rectangle(20, 20, Color::RED, Color::WHITE, 0.5, false).unwrap();
        assert_eq!(b.pixel(5, 5), Some(Color::RED));
        assert_eq!(b.pixel(10, 10), Some(Color::WHITE));
        let filled = rectangle(20, 20, Color::RED, Color::WHITE, 0.5, true).unwrap();
        assert_eq!(filled.pixel(10, 10), Some(Color::RED));
        assert_eq!(filled.pixel(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn test_circle_corners_transparent() {
        let b = circle(100, Color::YELLOW).unwrap();
        assert_eq!(b.pixel(50, 50), Some(Color::YELLOW));
        assert_eq!(b.pixel(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_quadrants_layout() {
        let b = quadrants(100, 100).unwrap();
        assert_eq!(b.pixel(10, 10), Some(Color::BLACK));
        assert_eq!(b.pixel(60, 10), Some(Color::RED));
        assert_eq!(b.pixel(10, 60), Some(Color::GREEN));
        assert_eq!(b.pixel(60, 60), Some(Color::BLUE));
        assert_eq!(b.pixel(49, 49), Some(Color::BLACK));
        assert_eq!(b.pixel(50, 50), Some(Color::BLUE));
    }

    #[test]
    fn test_label_draws_segments() {
        let eight = label(100, 100, Color::GOLDENROD, Color::TRANSPARENT, "8", 1.0).unwrap();
        let one = label(100, 100, Color::GOLDENROD, Color::TRANSPARENT, "1", 1.0).unwrap();
        // Middle bar is lit for 8 and dark for 1.
        assert_eq!(eight.pixel(50, 50), Some(Color::GOLDENROD));
        assert_eq!(one.pixel(50, 50), Some(Color::TRANSPARENT));
        // Outline frames the label.
        assert_eq!(one.pixel(0, 0), Some(Color::GOLDENROD));
        assert_eq!(one.pixel(99, 50), Some(Color::GOLDENROD));
    }

    #[test]
    fn test_label_too_small_for_text_is_just_a_frame() {
        let b = label(10, 6, Color::WHITE, Color::BLACK, "12.5", 0.5).unwrap();
        assert!(b.pixels().any(|c| c == Color::WHITE));
    }
}
