//! Random sources.
//!
//! Everything random on the site (boot line pacing, rain glyphs, chat replies,
//! snare noise) draws from a [`RandomSource`] so tests can swap in a
//! deterministic one.

/// A source of uniformly distributed floats in `[0, 1)`.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform draw from `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }

    /// Uniform index into a collection of `len` items. Returns 0 for empty input.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

fn unit_from_bits(bits: u64) -> f64 {
    // Top 53 bits give an evenly spaced f64 in [0, 1).
    (bits >> 11) as f64 / (1u64 << 53) as f64
}

/// Browser entropy (`crypto.getRandomValues` through getrandom).
#[derive(Debug, Default)]
pub struct EntropyRandom {
    #[cfg(not(feature = "rng"))]
    state: u64,
}

impl EntropyRandom {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "rng")]
impl RandomSource for EntropyRandom {
    fn next_f64(&mut self) -> f64 {
        let mut buf = [0u8; 8];
        if getrandom::getrandom(&mut buf).is_err() {
            log::debug!("getrandom failed, falling back to 0.5");
            return 0.5;
        }
        unit_from_bits(u64::from_le_bytes(buf))
    }
}

#[cfg(not(feature = "rng"))]
impl RandomSource for EntropyRandom {
    fn next_f64(&mut self) -> f64 {
        // Simple linear transform of the performance clock (not crypto secure).
        let now = web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0);
        self.state = self
            .state
            .wrapping_add(now as u64)
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        unit_from_bits(self.state)
    }
}

/// Deterministic xorshift64* generator.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        // xorshift has a fixed point at zero
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        unit_from_bits(x.wrapping_mul(0x2545_F491_4F6C_DD1D))
    }
}

/// Replays a fixed list of values, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    pos: usize,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            pos: 0,
        }
    }

    /// Always yields `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
