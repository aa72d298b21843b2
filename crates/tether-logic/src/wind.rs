//! Ambient breeze shared by every suspended body.
//!
//! The field is spatially uniform: one force vector per tick, sampled from
//! seeded coherent noise at the accumulated time. X and Z come from the
//! same noise function at widely separated coordinates so the axes are
//! decorrelated; Y averages two further-offset, lower-frequency samples
//! and is scaled down so gusts never lift bodies unrealistically.
//!
//! A sample is a pure function of `(accumulated time, seed, config)`.

use serde::{Deserialize, Serialize};

use crate::error::{non_negative, ConfigError};
use crate::math::Vec3;
use crate::noise::{CoherentNoise, PerlinNoise};

/// Tuning for the breeze.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Multiplier on frame delta before it enters the time accumulator.
    pub time_scale: f32,
    /// Peak per-axis force on X and Z. Kept small; movement should be
    /// barely perceptible.
    pub max_force: f32,
    /// Y magnitude as a fraction of `max_force`.
    pub vertical_ratio: f32,
    /// Noise-space distance between the per-axis sample points.
    pub axis_offset: f32,
    /// Frequency multiplier for the vertical samples relative to X/Z.
    pub vertical_frequency: f32,
    pub seed: u32,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            time_scale: 0.3,
            max_force: 0.02,
            vertical_ratio: 0.3,
            axis_offset: 100.0,
            vertical_frequency: 0.5,
            seed: 1,
        }
    }
}

impl WindConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("wind.time_scale", self.time_scale)?;
        non_negative("wind.max_force", self.max_force)?;
        non_negative("wind.axis_offset", self.axis_offset)?;
        non_negative("wind.vertical_frequency", self.vertical_frequency)?;
        if !(0.0..=1.0).contains(&self.vertical_ratio) {
            return Err(ConfigError::Tuning {
                field: "wind.vertical_ratio",
                value: self.vertical_ratio,
            });
        }
        Ok(())
    }
}

/// One tick's breeze. Transient; recomputed every frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindSample {
    pub force: Vec3,
    /// Accumulated noise time the sample was taken at.
    pub time: f64,
}

/// Time accumulator plus seeded noise.
#[derive(Debug, Clone)]
pub struct WindField<N = PerlinNoise> {
    config: WindConfig,
    noise: N,
    time: f64,
}

impl WindField<PerlinNoise> {
    pub fn new(config: WindConfig) -> Self {
        let noise = PerlinNoise::new(config.seed);
        Self::with_noise(config, noise)
    }
}

impl<N: CoherentNoise> WindField<N> {
    pub fn with_noise(config: WindConfig, noise: N) -> Self {
        Self {
            config,
            noise,
            time: 0.0,
        }
    }

    pub fn config(&self) -> &WindConfig {
        &self.config
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.config.time_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }

    /// Advance the accumulator by `delta × time_scale` and sample.
    pub fn tick(&mut self, delta: f32) -> WindSample {
        if delta.is_finite() && delta > 0.0 {
            self.time += (delta * self.config.time_scale) as f64;
        }
        self.sample_at(self.time)
    }

    /// Sample without advancing time.
    pub fn sample_at(&self, time: f64) -> WindSample {
        let c = &self.config;
        let offset = c.axis_offset as f64;
        let vf = c.vertical_frequency as f64;

        let x = self.noise.sample(time, 0.0);
        let z = self.noise.sample(time + offset, offset);
        let y = 0.5
            * (self.noise.sample(time * vf + 2.0 * offset, 2.0 * offset)
                + self.noise.sample(time * vf * 0.5 + 3.0 * offset, 0.0));

        WindSample {
            force: Vec3::new(
                x.clamp(-1.0, 1.0) * c.max_force,
                y.clamp(-1.0, 1.0) * c.max_force * c.vertical_ratio,
                z.clamp(-1.0, 1.0) * c.max_force,
            ),
            time,
        }
    }

    /// Drop accumulated time, e.g. when a scene session restarts.
    pub fn reset(&mut self) {
        self.time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(f32);

    impl CoherentNoise for Constant {
        fn sample(&self, _x: f64, _y: f64) -> f32 {
            self.0
        }
    }

    #[test]
    fn forces_stay_within_limits() {
        let config = WindConfig::default();
        let mut wind = WindField::new(config);
        for _ in 0..20_000 {
            let s = wind.tick(1.0 / 60.0);
            assert!(s.force.x.abs() <= config.max_force);
            assert!(s.force.z.abs() <= config.max_force);
            assert!(s.force.y.abs() <= config.max_force * config.vertical_ratio + 1e-9);
        }
    }

    #[test]
    fn saturated_noise_hits_exact_caps() {
        let config = WindConfig::default();
        let wind = WindField::with_noise(config, Constant(1.0));
        let s = wind.sample_at(0.0);
        assert_eq!(s.force.x, config.max_force);
        assert_eq!(s.force.z, config.max_force);
        assert!((s.force.y - config.max_force * 0.3).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_noise_is_clamped() {
        let config = WindConfig::default();
        let wind = WindField::with_noise(config, Constant(-4.0));
        let s = wind.sample_at(1.0);
        assert_eq!(s.force.x, -config.max_force);
    }

    #[test]
    fn time_advances_by_scaled_delta() {
        let mut wind = WindField::new(WindConfig {
            time_scale: 0.5,
            ..Default::default()
        });
        wind.tick(2.0);
        assert!((wind.time() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_and_invalid_delta_do_not_advance() {
        let mut wind = WindField::new(WindConfig::default());
        wind.tick(0.0);
        wind.tick(-1.0);
        wind.tick(f32::NAN);
        assert_eq!(wind.time(), 0.0);
    }

    #[test]
    fn deterministic_for_same_seed_and_time() {
        let a = WindField::new(WindConfig::default());
        let b = WindField::new(WindConfig::default());
        for i in 0..50 {
            let t = i as f64 * 0.77;
            assert_eq!(a.sample_at(t), b.sample_at(t));
        }
    }

    #[test]
    fn rejects_vertical_ratio_above_one() {
        let config = WindConfig {
            vertical_ratio: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
