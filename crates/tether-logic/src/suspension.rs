//! Per-item suspension parameters.
//!
//! Each content item hangs from a fixed ceiling anchor on a tether. Where
//! the anchor sits, how long the tether is and how strongly the breeze
//! moves the body are all derived from a stable hash of the item id, so the
//! same item always hangs the same way no matter how often its body is torn
//! down and rebuilt.

use serde::{Deserialize, Serialize};

use crate::bounds::SceneBounds;
use crate::error::{non_negative, ordered_range, ConfigError};
use crate::math::Vec3;
use crate::seed::SeededSequence;
use crate::wind::WindSample;

/// Hard floor on tether length regardless of configured range.
pub const MIN_TETHER_LENGTH: f32 = 1.0;

// Draw indices into the per-item seeded sequence.
const DRAW_JITTER: u64 = 0;
const DRAW_TETHER: u64 = 1;
const DRAW_SENSITIVITY: u64 = 2;
const DRAW_DEPTH: u64 = 3;

/// Physical tuning shared by every suspended body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyTuning {
    /// Deliberately light so the breeze and agent bumps are visible.
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Radius of the spherical collision volume agents can strike.
    pub collider_radius: f32,
    /// Per-axis multiplier from wind force to impulse. Y stays below X/Z.
    pub impulse_scale: Vec3,
}

impl Default for BodyTuning {
    fn default() -> Self {
        Self {
            mass: 0.5,
            linear_damping: 0.8,
            angular_damping: 0.9,
            collider_radius: 0.4,
            impulse_scale: Vec3::new(0.05, 0.015, 0.05),
        }
    }
}

/// Ranges for the seeded per-item draws plus body tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspensionConfig {
    pub tether_min: f32,
    pub tether_max: f32,
    pub sensitivity_min: f32,
    pub sensitivity_max: f32,
    /// Maximum horizontal jitter added to an item's slot.
    pub slot_jitter: f32,
    /// Maximum |z| offset from the centre line.
    pub depth_spread: f32,
    pub body: BodyTuning,
}

impl Default for SuspensionConfig {
    fn default() -> Self {
        Self {
            tether_min: 2.0,
            tether_max: 3.5,
            sensitivity_min: 0.8,
            sensitivity_max: 1.2,
            slot_jitter: 0.3,
            depth_spread: 0.6,
            body: BodyTuning::default(),
        }
    }
}

impl SuspensionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ordered_range("suspension.tether", self.tether_min, self.tether_max)?;
        ordered_range(
            "suspension.sensitivity",
            self.sensitivity_min,
            self.sensitivity_max,
        )?;
        non_negative("suspension.slot_jitter", self.slot_jitter)?;
        non_negative("suspension.depth_spread", self.depth_spread)?;
        non_negative("body.linear_damping", self.body.linear_damping)?;
        non_negative("body.angular_damping", self.body.angular_damping)?;
        non_negative("body.collider_radius", self.body.collider_radius)?;
        non_negative("body.impulse_scale.x", self.body.impulse_scale.x)?;
        non_negative("body.impulse_scale.y", self.body.impulse_scale.y)?;
        non_negative("body.impulse_scale.z", self.body.impulse_scale.z)?;
        if !(self.body.mass.is_finite() && self.body.mass > 0.0) {
            return Err(ConfigError::Tuning {
                field: "body.mass",
                value: self.body.mass,
            });
        }
        Ok(())
    }
}

/// Everything needed to hang one item. A pure function of
/// `(id, index, total, bounds, config)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuspensionParams {
    pub seed: u64,
    /// Evenly spread slot before jitter.
    pub slot_x: f32,
    /// Final horizontal position of the anchor.
    pub horizontal_offset: f32,
    pub depth_offset: f32,
    pub tether_length: f32,
    pub wind_sensitivity: f32,
    /// Fixed point at ceiling height above the slot.
    pub anchor: Vec3,
    /// Where the body hangs at rest, straight below the anchor.
    pub rest_position: Vec3,
}

impl SuspensionParams {
    pub fn derive(
        id: &str,
        index: usize,
        total: usize,
        bounds: &SceneBounds,
        config: &SuspensionConfig,
    ) -> Self {
        let seq = SeededSequence::from_id(id);

        let (slot_x, horizontal_offset) = if total > 1 {
            let t = index.min(total - 1) as f32 / (total - 1) as f32;
            let slot = (t - 0.5) * bounds.spread_width();
            let jitter = seq.signed(DRAW_JITTER) * config.slot_jitter;
            let bx = bounds.bound_x();
            (slot, (slot + jitter).clamp(-bx, bx))
        } else {
            (0.0, 0.0)
        };

        let tether_length = seq
            .range(DRAW_TETHER, config.tether_min, config.tether_max)
            .max(MIN_TETHER_LENGTH);
        let wind_sensitivity = seq.range(
            DRAW_SENSITIVITY,
            config.sensitivity_min,
            config.sensitivity_max,
        );
        let bz = bounds.bound_z();
        let depth_offset = (seq.signed(DRAW_DEPTH) * config.depth_spread).clamp(-bz, bz);

        let anchor = Vec3::new(horizontal_offset, bounds.ceiling_y, depth_offset);
        let rest_position = anchor - Vec3::Y * tether_length;

        Self {
            seed: seq.seed(),
            slot_x,
            horizontal_offset,
            depth_offset,
            tether_length,
            wind_sensitivity,
            anchor,
            rest_position,
        }
    }
}

/// Impulse for one body this tick: wind × sensitivity × per-axis tuning.
pub fn wind_impulse(sample: &WindSample, sensitivity: f32, tuning: &BodyTuning) -> Vec3 {
    sample.force.scale(tuning.impulse_scale) * sensitivity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(id: &str, index: usize, total: usize) -> SuspensionParams {
        SuspensionParams::derive(
            id,
            index,
            total,
            &SceneBounds::default(),
            &SuspensionConfig::default(),
        )
    }

    #[test]
    fn ranges_hold_for_many_ids() {
        for i in 0..2_000 {
            let id = format!("post-{i}");
            let p = derive(&id, i % 5, 5);
            assert!((2.0..=3.5).contains(&p.tether_length), "{id}: {}", p.tether_length);
            assert!((0.8..=1.2).contains(&p.wind_sensitivity));
        }
    }

    #[test]
    fn derivation_is_idempotent() {
        assert_eq!(derive("the-same-id", 2, 5), derive("the-same-id", 2, 5));
    }

    #[test]
    fn single_item_sits_dead_centre() {
        let p = derive("only-one", 0, 1);
        assert_eq!(p.slot_x, 0.0);
        assert_eq!(p.horizontal_offset, 0.0);
        assert_eq!(p.anchor.x, 0.0);
    }

    #[test]
    fn slots_spread_across_available_width() {
        let b = SceneBounds::default();
        let first = derive("a", 0, 5);
        let last = derive("b", 4, 5);
        let mid = derive("c", 2, 5);
        assert!((first.slot_x + b.bound_x()).abs() < 1e-5);
        assert!((last.slot_x - b.bound_x()).abs() < 1e-5);
        assert!(mid.slot_x.abs() < 1e-5);
    }

    #[test]
    fn jitter_is_small_and_clamped() {
        let b = SceneBounds::default();
        for i in 0..200 {
            let p = derive(&format!("j{i}"), i % 7, 7);
            assert!((p.horizontal_offset - p.slot_x).abs() <= 0.3 + 1e-5);
            assert!(p.horizontal_offset.abs() <= b.bound_x());
            assert!(p.depth_offset.abs() <= 0.6 + 1e-6);
        }
    }

    #[test]
    fn anchor_is_at_ceiling_and_body_hangs_below() {
        let p = derive("hang", 1, 3);
        assert_eq!(p.anchor.y, SceneBounds::default().ceiling_y);
        assert!((p.anchor.y - p.rest_position.y - p.tether_length).abs() < 1e-5);
        assert_eq!(p.anchor.x, p.rest_position.x);
    }

    #[test]
    fn tether_never_below_hard_minimum() {
        let config = SuspensionConfig {
            tether_min: 0.1,
            tether_max: 0.2,
            ..Default::default()
        };
        let p = SuspensionParams::derive("short", 0, 1, &SceneBounds::default(), &config);
        assert_eq!(p.tether_length, MIN_TETHER_LENGTH);
    }

    #[test]
    fn vertical_impulse_weaker_than_horizontal() {
        let sample = WindSample {
            force: Vec3::new(0.02, 0.02, 0.02),
            time: 0.0,
        };
        let imp = wind_impulse(&sample, 1.0, &BodyTuning::default());
        assert!(imp.y.abs() < imp.x.abs());
        assert!(imp.y.abs() < imp.z.abs());
    }

    #[test]
    fn rejects_inverted_tether_range() {
        let config = SuspensionConfig {
            tether_min: 3.0,
            tether_max: 2.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
