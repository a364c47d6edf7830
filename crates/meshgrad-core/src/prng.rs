//! Seeded random source.
//!
//! A seed string is folded into a 64-bit key (FNV-1a, then SplitMix64 mixing)
//! and drives a `Pcg64` stream. PCG output is specified bit-for-bit, so the same
//! seed produces the same gradient on every platform.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use uuid::Uuid;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic generator created from a seed string.
#[derive(Debug, Clone)]
pub struct Prng {
    rng: Pcg64,
}

impl Prng {
    pub fn new(seed: &str) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed_key(seed)),
        }
    }

    /// Uniform integer in `[min, max]`, both inclusive.
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    ///
    /// Drawn as `u64` so 32- and 64-bit targets consume the same stream bits.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len as u64) as usize
    }

    /// Uniform float in `[min, max)`. Returns `min` when the range is empty.
    pub fn float(&mut self, min: f64, max: f64) -> f64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if hi - lo <= 0.0 {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Uniform element of `items`.
    ///
    /// # Panics
    /// Panics when `items` is empty; callers guarantee a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let i = self.index(items.len());
        &items[i]
    }

    /// Index drawn with probability proportional to `weights[i]`.
    ///
    /// Walks the cumulative weights against a single uniform draw over the total.
    /// Non-positive totals fall back to index 0.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if weights.is_empty() || total <= 0.0 {
            return 0;
        }
        let threshold = self.float(0.0, total);
        let mut acc = 0.0;
        for (i, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            acc += w;
            if threshold < acc {
                return i;
            }
        }
        // Float accumulation can leave `threshold` a hair above the last sum.
        weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
    }

    /// Identifier drawn from the stream, laid out as a v4 UUID.
    pub fn uuid(&mut self) -> Uuid {
        uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid()
    }
}

/// Fold a seed string into a well-mixed 64-bit key.
pub fn seed_key(seed: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for b in seed.as_bytes() {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    splitmix(hash)
}

fn splitmix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}
