//! Seeded coherent-noise provider.
//!
//! Wind and wander steering both need a deterministic function that is
//! continuous in its inputs, so motion drifts instead of jittering. The
//! [`CoherentNoise`] trait is the narrow seam; [`PerlinNoise`] backs it with
//! the `noise` crate's gradient noise.

use ::noise::{NoiseFn, Perlin};

/// Deterministic `f(x, y) → [-1, 1]`, continuous in both arguments.
pub trait CoherentNoise {
    fn sample(&self, x: f64, y: f64) -> f32;

    /// One-dimensional slice along `y = 0`.
    fn sample_1d(&self, x: f64) -> f32 {
        self.sample(x, 0.0)
    }
}

/// Perlin gradient noise seeded once at construction.
#[derive(Clone)]
pub struct PerlinNoise {
    perlin: Perlin,
    seed: u32,
}

impl PerlinNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl std::fmt::Debug for PerlinNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerlinNoise").field("seed", &self.seed).finish()
    }
}

impl CoherentNoise for PerlinNoise {
    fn sample(&self, x: f64, y: f64) -> f32 {
        let v = self.perlin.get([x, y]);
        if v.is_finite() {
            v.clamp(-1.0, 1.0) as f32
        } else {
            0.0
        }
    }
}

impl<N: CoherentNoise + ?Sized> CoherentNoise for &N {
    fn sample(&self, x: f64, y: f64) -> f32 {
        (**self).sample(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_are_bounded() {
        let n = PerlinNoise::new(42);
        for i in 0..5_000 {
            let x = i as f64 * 0.173 - 400.0;
            let y = i as f64 * 0.031 + 1000.0;
            let v = n.sample(x, y);
            assert!((-1.0..=1.0).contains(&v), "sample {v}");
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = PerlinNoise::new(7);
        let b = PerlinNoise::new(7);
        for i in 0..100 {
            let x = i as f64 * 0.37;
            assert_eq!(a.sample(x, 3.3), b.sample(x, 3.3));
        }
    }

    #[test]
    fn field_is_continuous() {
        let n = PerlinNoise::new(3);
        let mut prev = n.sample_1d(0.0);
        for i in 1..2_000 {
            let v = n.sample_1d(i as f64 * 0.001);
            assert!((v - prev).abs() < 0.05, "jump {prev} → {v}");
            prev = v;
        }
    }
}
