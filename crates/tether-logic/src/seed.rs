//! Stable id hashing and stateless seeded sequences.
//!
//! Per-item individuality (tether length, wind sensitivity, jitter) is a
//! pure function of the item id: id → hash → seed → draws. No generator
//! state is stored anywhere, so recreating a body for the same id always
//! lands on the same parameters.

/// 32-bit rolling string hash (multiplier 31 over UTF-16 code units,
/// wrapping), folded to a non-negative value.
pub fn stable_hash(id: &str) -> u32 {
    let mut h: i32 = 0;
    for unit in id.encode_utf16() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32);
    }
    h.unsigned_abs()
}

/// An indexable stream of uniform draws fixed by a seed.
///
/// `value(i)` is a pure function of `(seed, i)`; draws at different indices
/// are decorrelated by a 64-bit avalanche mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededSequence {
    seed: u64,
}

impl SeededSequence {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn from_id(id: &str) -> Self {
        Self::new(stable_hash(id) as u64)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw in `[0, 1)`.
    pub fn value(&self, index: u64) -> f32 {
        let mut h = self
            .seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(index.wrapping_mul(1442695040888963407));
        h ^= h >> 33;
        h = h.wrapping_mul(0xff51afd7ed558ccd);
        h ^= h >> 33;
        h = h.wrapping_mul(0xc4ceb9fe1a85ec53);
        h ^= h >> 33;
        // 24 high bits fit exactly in an f32 mantissa
        (h >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform draw in `[min, max]`.
    pub fn range(&self, index: u64, min: f32, max: f32) -> f32 {
        min + (max - min) * self.value(index)
    }

    /// Uniform draw in `[-1, 1)`.
    pub fn signed(&self, index: u64) -> f32 {
        self.value(index) * 2.0 - 1.0
    }
}
