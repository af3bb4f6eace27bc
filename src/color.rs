//! ARGB color value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::Rng;

/// Four 8-bit channels. Equality and hashing compare every channel exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::from_argb(0, 0, 0, 0);
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);
    pub const WHITE: Color = Color::from_rgb(255, 255, 255);
    pub const RED: Color = Color::from_rgb(255, 0, 0);
    pub const GREEN: Color = Color::from_rgb(0, 128, 0);
    pub const BLUE: Color = Color::from_rgb(0, 0, 255);
    pub const GRAY: Color = Color::from_rgb(128, 128, 128);
    pub const DARK_BLUE: Color = Color::from_rgb(0, 0, 139);
    pub const YELLOW: Color = Color::from_rgb(255, 255, 0);
    pub const MAGENTA: Color = Color::from_rgb(255, 0, 255);
    pub const CYAN: Color = Color::from_rgb(0, 255, 255);
    pub const GOLDENROD: Color = Color::from_rgb(218, 165, 32);
    pub const LAWN_GREEN: Color = Color::from_rgb(124, 252, 0);

    #[inline]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Fully opaque color
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { a: 255, r, g, b }
    }

    /// Unpack a `0xAARRGGBB` word
    #[inline]
    pub const fn from_argb_u32(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack into a `0xAARRGGBB` word
    #[inline]
    pub const fn to_argb_u32(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Read from the in-memory pixel layout (`[B, G, R, A]`)
    #[inline]
    pub const fn from_bgra_bytes(px: [u8; 4]) -> Self {
        Self {
            a: px[3],
            r: px[2],
            g: px[1],
            b: px[0],
        }
    }

    /// In-memory pixel layout: little-endian bytes of `0xAARRGGBB`
    #[inline]
    pub const fn to_bgra_bytes(self) -> [u8; 4] {
        [self.b, self.g, self.r, self.a]
    }

    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Random opaque color
    pub fn random(rng: &mut Rng) -> Self {
        Self::from_rgb(rng.next_u8(), rng.next_u8(), rng.next_u8())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.to_argb_u32())
    }
}

impl From<u32> for Color {
    fn from(argb: u32) -> Self {
        Self::from_argb_u32(argb)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.to_argb_u32()
    }
}
