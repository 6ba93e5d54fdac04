//! Randomness for speed coefficients and occupancy jitter.
//!
//! The scheduler draws from a [`RandomSource`] so callers can pin results:
//! [`DetRng`] replays the same sequence for the same seed, and tests can plug
//! in a constant source to assert exact speeds.

use std::time::{SystemTime, UNIX_EPOCH};

/// A source of uniform samples in `[0, 1)`.
pub trait RandomSource: Send {
    /// Next sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Uniform sample in `[low, high)`.
    fn next_range(&mut self, low: f32, high: f32) -> f32 {
        let value = (high - low).mul_add(self.next_unit(), low);
        // Rounding can land exactly on `high` for samples just below 1.0
        if value < high { value } else { low }
    }
}

/// Deterministic xorshift64* generator.
#[derive(Debug, Clone)]
pub struct DetRng {
    state: u64,
}

impl DetRng {
    /// Create a generator from a seed. A zero seed is remapped since
    /// xorshift never leaves the all-zero state.
    pub const fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    /// Seed from the system clock.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64);
        Self::new(nanos)
    }

    /// Next raw 64-bit value.
    #[inline]
    pub const fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}

impl RandomSource for DetRng {
    #[allow(clippy::cast_precision_loss)]
    fn next_unit(&mut self) -> f32 {
        // Top 24 bits fill the f32 mantissa exactly, so the result stays below 1.0
        (self.next_u64() >> 40) as f32 / (1u32 << 24) as f32
    }
}
