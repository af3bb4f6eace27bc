use super::pixel_buffer::{byte_len, BYTES_PER_PIXEL};
use super::PixelBuffer;
use crate::color::Color;
use crate::error::Result;
use crate::util::mul_div255;

// ============================================================================
// Blending
// ============================================================================

/// Source-over blend of straight (non-premultiplied) colors.
///
/// `out.a = sa + da * (1 - sa)`, `out.c = (sc * sa + dc * da * (1 - sa)) / out.a`.
/// Over an opaque destination this is `sc * sa + dc * (1 - sa)`.
#[inline]
pub fn blend_over(dst: Color, src: Color) -> Color {
    match src.a {
        255 => src,
        0 => dst,
        sa => {
            let sa = sa as u32;
            let da = mul_div255(dst.a as u32, 255 - sa);
            let out_a = sa + da;
            if out_a == 0 {
                return Color::TRANSPARENT;
            }
            let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * da + out_a / 2) / out_a) as u8;
            Color::from_argb(
                out_a as u8,
                mix(src.r, dst.r),
                mix(src.g, dst.g),
                mix(src.b, dst.b),
            )
        },
    }
}

// ============================================================================
// Canvas
// ============================================================================

/// Mutable ARGB8888 drawing surface.
/// Buffers are assembled here and frozen into an immutable [`PixelBuffer`].
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// Transparent canvas
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            pixels: vec![0; len],
            width,
            height,
        })
    }

    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * BYTES_PER_PIXEL);
        Self {
            pixels,
            width,
            height,
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

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL
    }

    /// Fill every pixel, alpha included
    pub fn clear(&mut self, color: Color) {
        let px = color.to_bgra_bytes();
        for chunk in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Overwrite a single pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            self.pixels[idx..idx + BYTES_PER_PIXEL].copy_from_slice(&color.to_bgra_bytes());
        }
    }

    /// Read a pixel (bounds checked)
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            let px = &self.pixels[idx..idx + BYTES_PER_PIXEL];
            Some(Color::from_bgra_bytes([px[0], px[1], px[2], px[3]]))
        } else {
            None
        }
    }

    /// Composite a color over the pixel at (x, y)
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(dst) = self.pixel(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            self.pixels[idx..idx + BYTES_PER_PIXEL]
                .copy_from_slice(&blend_over(dst, color).to_bgra_bytes());
        }
    }

    /// Blended horizontal span from x1 to x2 inclusive
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, color: Color) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let mut idx = self.pixel_index(start as u32, y as u32);
        for _ in start..=end {
            let px = &mut self.pixels[idx..idx + BYTES_PER_PIXEL];
            let dst = Color::from_bgra_bytes([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&blend_over(dst, color).to_bgra_bytes());
            idx += BYTES_PER_PIXEL;
        }
    }

    /// Blended vertical span from y1 to y2 inclusive
    pub fn vline(&mut self, x: i32, y1: i32, y2: i32, color: Color) {
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        for y in y1.max(0)..=y2.min(self.height as i32 - 1) {
            self.blend_pixel(x, y, color);
        }
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        if w == 0 {
            return;
        }
        for row in 0..h as i32 {
            self.hline(x, x + w as i32 - 1, y + row, color);
        }
    }

    /// One pixel rectangle outline
    pub fn stroke_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        if w == 0 || h == 0 {
            return;
        }
        let x2 = x + w as i32 - 1;
        let y2 = y + h as i32 - 1;
        self.hline(x, x2, y, color);
        if y2 != y {
            self.hline(x, x2, y2, color);
        }
        if h > 2 {
            self.vline(x, y + 1, y2 - 1, color);
            if x2 != x {
                self.vline(x2, y + 1, y2 - 1, color);
            }
        }
    }

    /// Fill an axis-aligned ellipse using horizontal spans.
    /// A pixel is covered when its center lies inside the ellipse.
    pub fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Color) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let top = (cy - ry).floor().max(0.0) as i32;
        let bottom = (cy + ry).ceil().min(self.height as f32) as i32;
        for y in top..bottom {
            let dy = (y as f32 + 0.5 - cy) / ry;
            if dy.abs() > 1.0 {
                continue;
            }
            let half = rx * (1.0 - dy * dy).sqrt();
            let x1 = (cx - half - 0.5).ceil() as i32;
            let x2 = (cx + half - 0.5).floor() as i32;
            if x1 <= x2 {
                self.hline(x1, x2, y, color);
            }
        }
    }

    /// One pixel ellipse outline
    pub fn stroke_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Color) {
        if rx <= 0.0 || ry <= 0.0 {
            return;
        }
        let top = (cy - ry - 1.0).floor().max(0.0) as i32;
        let bottom = (cy + ry + 1.0).ceil().min(self.height as f32) as i32;
        let left = (cx - rx - 1.0).floor().max(0.0) as i32;
        let right = (cx + rx + 1.0).ceil().min(self.width as f32) as i32;
        let r_min = rx.min(ry);
        for y in top..bottom {
            for x in left..right {
                let nx = (x as f32 + 0.5 - cx) / rx;
                let ny = (y as f32 + 0.5 - cy) / ry;
                let d = (nx * nx + ny * ny).sqrt();
                if ((d - 1.0) * r_min).abs() < 0.5 {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    /// Copy another buffer onto this one at position (x, y), replacing pixels
    pub fn blit(&mut self, src: &PixelBuffer, x: i32, y: i32) {
        self.copy_rows(src, x, y, |_, s| s);
    }

    /// Composite a buffer at (x, y) with source-over blending
    pub fn composite(&mut self, src: &PixelBuffer, x: i32, y: i32) {
        self.copy_rows(src, x, y, blend_over);
    }

    fn copy_rows(
        &mut self,
        src: &PixelBuffer,
        x: i32,
        y: i32,
        op: impl Fn(Color, Color) -> Color,
    ) {
        let src_w = src.width() as i32;
        let src_h = src.height() as i32;
        let dst_w = self.width as i32;
        let dst_h = self.height as i32;

        for sy in 0..src_h {
            let dy = y + sy;
            if dy < 0 || dy >= dst_h {
                continue;
            }
            for sx in 0..src_w {
                let dx = x + sx;
                if dx < 0 || dx >= dst_w {
                    continue;
                }
                if let (Some(s), Some(d)) = (src.pixel(sx, sy), self.pixel(dx, dy)) {
                    self.set_pixel(dx, dy, op(d, s));
                }
            }
        }
    }

    /// Snapshot the current contents without giving up the canvas
    pub fn snapshot(&self) -> PixelBuffer {
        self.clone().freeze()
    }

    /// Finish drawing
    pub fn freeze(self) -> PixelBuffer {
        PixelBuffer::from_parts(self.width, self.height, self.pixels)
    }
}

impl From<&PixelBuffer> for Canvas {
    fn from(buffer: &PixelBuffer) -> Self {
        buffer.to_canvas()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_over_opaque_destination() {
        let out = blend_over(Color::BLACK, Color::WHITE.with_alpha(128));
        assert_eq!(out.a, 255);
        assert_eq!(out.r, 128);
        assert_eq!(out.g, 128);
        assert_eq!(out.b, 128);
    }

    #[test]
    fn test_blend_over_fast_paths() {
        assert_eq!(blend_over(Color::BLUE, Color::RED), Color::RED);
        assert_eq!(blend_over(Color::BLUE, Color::TRANSPARENT), Color::BLUE);
    }

    #[test]
    fn test_blend_over_transparent_destination_keeps_color() {
        let out = blend_over(Color::TRANSPARENT, Color::RED.with_alpha(100));
        assert_eq!(out, Color::RED.with_alpha(100));
    }

    #[test]
    fn test_clear_and_read_back() {
        let mut c = Canvas::new(3, 3).unwrap();
        c.clear(Color::GRAY);
        assert_eq!(c.pixel(2, 2), Some(Color::GRAY));
        assert_eq!(c.pixel(3, 0), None);
    }

    #[test]
    fn test_set_pixel_out_of_bounds_is_ignored() {
        let mut c = Canvas::new(2, 2).unwrap();
        c.set_pixel(-1, 0, Color::RED);
        c.set_pixel(2, 0, Color::RED);
        assert!(c.freeze().pixels().all(|p| p == Color::TRANSPARENT));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut c = Canvas::new(4, 4).unwrap();
        c.fill_rect(2, 2, 10, 10, Color::RED);
        let b = c.freeze();
        assert_eq!(b.pixel(1, 1), Some(Color::TRANSPARENT));
        assert_eq!(b.pixel(2, 2), Some(Color::RED));
        assert_eq!(b.pixel(3, 3), Some(Color::RED));
    }

    #[test]
    fn test_stroke_rect_leaves_interior() {
        let mut c = Canvas::new(5, 5).unwrap();
        c.stroke_rect(0, 0, 5, 5, Color::WHITE);
        let b = c.freeze();
        assert_eq!(b.pixel(0, 0), Some(Color::WHITE));
        assert_eq!(b.pixel(4, 2), Some(Color::WHITE));
        assert_eq!(b.pixel(2, 2), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_fill_ellipse_covers_center_not_corners() {
        let mut c = Canvas::new(20, 20).unwrap();
        c.fill_ellipse(10.0, 10.0, 10.0, 10.0, Color::GREEN);
        let b = c.freeze();
        assert_eq!(b.pixel(10, 10), Some(Color::GREEN));
        assert_eq!(b.pixel(0, 10), Some(Color::GREEN));
        assert_eq!(b.pixel(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(b.pixel(19, 19), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_composite_blends_and_blit_replaces() {
        let half_red = PixelBuffer::filled(2, 2, Color::RED.with_alpha(128)).unwrap();

        let mut c = Canvas::new(4, 4).unwrap();
        c.clear(Color::BLACK);
        c.composite(&half_red, 1, 1);
        assert_eq!(c.pixel(1, 1), Some(Color::from_rgb(128, 0, 0)));
        assert_eq!(c.pixel(0, 0), Some(Color::BLACK));

        c.blit(&half_red, 1, 1);
        assert_eq!(c.pixel(1, 1), Some(Color::RED.with_alpha(128)));
    }

    #[test]
    fn test_composite_negative_offset_clips() {
        let src = PixelBuffer::filled(3, 3, Color::BLUE).unwrap();
        let mut c = Canvas::new(3, 3).unwrap();
        c.composite(&src, -2, -2);
        assert_eq!(c.pixel(0, 0), Some(Color::BLUE));
        assert_eq!(c.pixel(1, 1), Some(Color::TRANSPARENT));
    }
}
