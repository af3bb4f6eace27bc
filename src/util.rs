//! Shared utilities

/// Simple deterministic RNG using xorshift64
/// Seeds random test colors without pulling in an RNG crate
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) } // xorshift never leaves zero
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    #[inline]
    pub fn next_u8(&mut self) -> u8 {
        (self.next_u64() >> 56) as u8
    }
}

/// Rounded `x * y / 255` for 8-bit channel math
#[inline]
pub(crate) fn mul_div255(x: u32, y: u32) -> u32 {
    (x * y + 127) / 255
}
