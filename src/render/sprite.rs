use crate::bitmap::{Canvas, PixelBuffer};
use crate::color::Color;
use crate::math3d::Vec3;
use crate::transform::{self, Affine, Interpolation};
use crate::util::mul_div255;

/// A textured quad owned by the caller and composited by a renderer.
///
/// Coordinates are normalized device coordinates: the backbuffer spans
/// `[-1, 1]` on both axes with +y up. The unscaled quad covers the whole
/// backbuffer. `rotation.z` turns it counter-clockwise, in radians. Larger
/// `position.z` is farther away and gets drawn first.
#[derive(Debug, Clone)]
pub struct Sprite {
    key: String,
    renderer_id: u64,
    generation: u64,
    texture: Option<PixelBuffer>,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Multiplies each texel channel
    pub tint: Color,
    /// Extra opacity in `0.0..=1.0`
    pub alpha: f32,
    pub visible: bool,
}

impl Sprite {
    pub(super) fn new(key: String, renderer_id: u64, generation: u64) -> Self {
        Self {
            key,
            renderer_id,
            generation,
            texture: None,
            position: Vec3::zero(),
            rotation: Vec3::zero(),
            scale: Vec3::one(),
            tint: Color::WHITE,
            alpha: 1.0,
            visible: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub(super) fn renderer_id(&self) -> u64 {
        self.renderer_id
    }

    pub(super) fn generation(&self) -> u64 {
        self.generation
    }

    /// Upload a texture. The buffer's storage is shared, not copied.
    pub fn set_texture(&mut self, buffer: &PixelBuffer) {
        self.texture = Some(buffer.clone());
    }

    pub fn texture(&self) -> Option<&PixelBuffer> {
        self.texture.as_ref()
    }

    pub fn clear_texture(&mut self) {
        self.texture = None;
    }

    /// Texture-pixel to backbuffer-pixel matrix
    pub(super) fn matrix(&self, texture: &PixelBuffer, width: u32, height: u32) -> Affine {
        let (tw, th) = (texture.width() as f32, texture.height() as f32);
        let (w, h) = (width as f32, height as f32);
        let to_quad = Affine {
            a: 2.0 / tw,
            b: 0.0,
            c: 0.0,
            d: -2.0 / th,
            e: -1.0,
            f: 1.0,
        };
        let to_pixels = Affine {
            a: w / 2.0,
            b: 0.0,
            c: 0.0,
            d: -h / 2.0,
            e: w / 2.0,
            f: h / 2.0,
        };
        // In y-up space the rotation matrix turns counter-clockwise.
        to_quad
            .then(Affine::scale(self.scale.x, self.scale.y))
            .then(Affine::rotate(self.rotation.z))
            .then(Affine::translate(self.position.x, self.position.y))
            .then(to_pixels)
    }

    /// Blend into the backbuffer. Returns false when nothing was drawn.
    pub(super) fn composite(&self, canvas: &mut Canvas) -> bool {
        let Some(texture) = &self.texture else {
            return false;
        };
        if !self.visible || self.alpha <= 0.0 {
            return false;
        }
        let forward = self.matrix(texture, canvas.width(), canvas.height());
        let tint = self.tint;
        let opacity = (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u32;
        let tinted = tint != Color::WHITE || opacity != 255;
        transform::composite(canvas, texture, &forward, Interpolation::Bilinear, |c| {
            if !tinted {
                return c;
            }
            let alpha = mul_div255(mul_div255(c.a as u32, tint.a as u32), opacity);
            Color::from_argb(
                alpha as u8,
                mul_div255(c.r as u32, tint.r as u32) as u8,
                mul_div255(c.g as u32, tint.g as u32) as u8,
                mul_div255(c.b as u32, tint.b as u32) as u8,
            )
        })
    }
}
