//! Static scene geometry: floor footprint, margins, floor and ceiling height.
//!
//! Everything that places or confines an object asks this module where the
//! usable volume ends. The derived limit on each horizontal axis is
//! `floor_size / 2 - margin`, with the margin a fixed fraction of the floor
//! size on that axis.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Floor, ceiling and margin configuration. Immutable once the scene starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneBounds {
    pub floor_width: f32,
    pub floor_depth: f32,
    /// Fraction of each floor dimension kept clear at the edges.
    pub margin_fraction: f32,
    pub floor_y: f32,
    pub ceiling_y: f32,
}

impl Default for SceneBounds {
    fn default() -> Self {
        Self {
            floor_width: 20.0,
            floor_depth: 12.0,
            margin_fraction: 0.1,
            floor_y: 0.0,
            ceiling_y: 4.0,
        }
    }
}

impl SceneBounds {
    /// Reject geometry that leaves no usable floor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes_ok = self.floor_width.is_finite()
            && self.floor_depth.is_finite()
            && self.floor_width > 0.0
            && self.floor_depth > 0.0;
        if !sizes_ok {
            return Err(ConfigError::FloorSize {
                width: self.floor_width,
                depth: self.floor_depth,
            });
        }
        // margin >= half the floor would leave an empty or inverted interior
        if !(self.margin_fraction.is_finite()
            && self.margin_fraction >= 0.0
            && self.margin_fraction < 0.5)
        {
            return Err(ConfigError::MarginFraction(self.margin_fraction));
        }
        if !(self.floor_y.is_finite() && self.ceiling_y.is_finite() && self.ceiling_y > self.floor_y)
        {
            return Err(ConfigError::CeilingBelowFloor {
                floor: self.floor_y,
                ceiling: self.ceiling_y,
            });
        }
        Ok(())
    }

    pub fn margin_x(&self) -> f32 {
        self.floor_width * self.margin_fraction
    }

    pub fn margin_z(&self) -> f32 {
        self.floor_depth * self.margin_fraction
    }

    /// Largest |x| an object may occupy.
    pub fn bound_x(&self) -> f32 {
        self.floor_width / 2.0 - self.margin_x()
    }

    /// Largest |z| an object may occupy.
    pub fn bound_z(&self) -> f32 {
        self.floor_depth / 2.0 - self.margin_z()
    }

    /// Width available for spreading suspended items across X.
    pub fn spread_width(&self) -> f32 {
        self.bound_x() * 2.0
    }

    pub fn height(&self) -> f32 {
        self.ceiling_y - self.floor_y
    }

    pub fn contains(&self, x: f32, z: f32) -> bool {
        x.abs() <= self.bound_x() && z.abs() <= self.bound_z()
    }

    /// Clamp a floor point into the usable area.
    pub fn clamp(&self, x: f32, z: f32) -> (f32, f32) {
        let bx = self.bound_x();
        let bz = self.bound_z();
        (x.clamp(-bx, bx), z.clamp(-bz, bz))
    }
}
