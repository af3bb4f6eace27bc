//! Dominant color detection
//!
//! Channels are quantized so anti-aliased near-duplicates fall into one bucket.
//! Each bucket reports its most common exact color, never an average, so the
//! result only contains colors that actually occur in the image.

use std::collections::HashMap;

use crate::bitmap::PixelBuffer;
use crate::color::Color;
use crate::error::{Error, Result};

/// Bits kept per channel by [`detect_colors`]
pub const DEFAULT_BITS: u8 = 5;

/// One quantized color bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBucket {
    /// Most frequent exact color in the bucket; earliest wins ties
    pub representative: Color,
    /// Pixels in the bucket
    pub count: usize,
    /// Row-major index of the first pixel that landed here
    pub first_index: usize,
}

#[derive(Default)]
struct Tally {
    count: usize,
    first_index: usize,
    exact: HashMap<Color, (usize, usize)>,
}

impl Tally {
    fn representative(&self) -> Color {
        self.exact
            .iter()
            .max_by(|(_, (ca, ia)), (_, (cb, ib))| ca.cmp(cb).then(ib.cmp(ia)))
            .map(|(c, _)| *c)
            .unwrap_or_default()
    }
}

/// Buckets ordered by pixel count, largest first. Equal counts keep scan order.
pub fn histogram(buffer: &PixelBuffer, bits: u8) -> Result<Vec<ColorBucket>> {
    if !(1..=8).contains(&bits) {
        return Err(Error::invalid_argument(format!(
            "quantization bits must be 1..=8, got {}",
            bits
        )));
    }
    let shift = 8 - bits;
    let mut tallies: HashMap<u32, Tally> = HashMap::new();
    for (i, c) in buffer.pixels().enumerate() {
        let key = Color::from_argb(c.a >> shift, c.r >> shift, c.g >> shift, c.b >> shift).to_argb_u32();
        let tally = tallies.entry(key).or_insert_with(|| Tally {
            first_index: i,
            ..Tally::default()
        });
        tally.count += 1;
        tally.exact.entry(c).or_insert((0, i)).0 += 1;
    }

    let mut buckets: Vec<ColorBucket> = tallies
        .values()
        .map(|t| ColorBucket {
            representative: t.representative(),
            count: t.count,
            first_index: t.first_index,
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then(a.first_index.cmp(&b.first_index)));
    Ok(buckets)
}

/// Up to `n` dominant colors, most frequent first. Deterministic for a given buffer.
pub fn detect_colors(buffer: &PixelBuffer, n: usize) -> Result<Vec<Color>> {
    if n == 0 {
        return Err(Error::invalid_argument("requested color count must be positive"));
    }
    let buckets = histogram(buffer, DEFAULT_BITS)?;
    Ok(buckets.into_iter().take(n).map(|b| b.representative).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::generate;

    #[test]
    fn test_single_color() {
        let b = PixelBuffer::filled(10, 10, Color::GOLDENROD).unwrap();
        assert_eq!(detect_colors(&b, 5).unwrap(), vec![Color::GOLDENROD]);
    }

    #[test]
    fn test_quadrants_ties_follow_scan_order() {
        let b = generate::quadrants(100, 100).unwrap();
        assert_eq!(
            detect_colors(&b, 4).unwrap(),
            vec![Color::BLACK, Color::RED, Color::GREEN, Color::BLUE]
        );
        assert_eq!(detect_colors(&b, 2).unwrap(), vec![Color::BLACK, Color::RED]);
    }

    #[test]
    fn test_frequency_order() {
        let b = PixelBuffer::from_fn(10, 1, |x, _| if x < 3 { Color::RED } else { Color::BLUE })
            .unwrap();
        assert_eq!(detect_colors(&b, 2).unwrap(), vec![Color::BLUE, Color::RED]);
    }

    #[test]
    fn test_near_duplicates_merge() {
        let shade = Color::from_rgb(201, 0, 0);
        let base = Color::from_rgb(200, 0, 0);
        let b = PixelBuffer::from_fn(5, 1, |x, _| match x {
            0 => shade,
            4 => Color::WHITE,
            _ => base,
        })
        .unwrap();
        let buckets = histogram(&b, DEFAULT_BITS).unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].count, 4);
        assert_eq!(buckets[0].representative, base);
        assert_eq!(buckets[0].first_index, 0);
    }

    #[test]
    fn test_deterministic() {
        let b = generate::color_stripes(64, 8, false).unwrap();
        let first = detect_colors(&b, 8).unwrap();
        for _ in 0..3 {
            assert_eq!(detect_colors(&b, 8).unwrap(), first);
        }
        assert_eq!(first, generate::STRIPE_COLORS.to_vec());
    }

    #[test]
    fn test_invalid_arguments() {
        let b = PixelBuffer::filled(2, 2, Color::RED).unwrap();
        assert!(matches!(detect_colors(&b, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(histogram(&b, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(histogram(&b, 9), Err(Error::InvalidArgument(_))));
    }
}
