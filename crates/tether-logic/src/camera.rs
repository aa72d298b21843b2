//! Bounded zoom/orbit rig.
//!
//! One zoom distance clamped to `[min_zoom, max_zoom]` and an orbit whose
//! polar (from +Y) and azimuth (about +Y, from +Z) angles are clamped so the
//! floor and ceiling stay framed.

use serde::{Deserialize, Serialize};

use crate::error::{ordered_range, ConfigError};
use crate::math::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub initial_zoom: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_azimuth: f32,
    pub max_azimuth: f32,
    pub initial_polar: f32,
    /// Point the rig orbits and looks at.
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: 6.0,
            max_zoom: 30.0,
            initial_zoom: 16.0,
            min_polar: 0.35,
            max_polar: 1.35,
            min_azimuth: -0.9,
            max_azimuth: 0.9,
            initial_polar: 1.15,
            target: Vec3::new(0.0, 1.5, 0.0),
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ordered_range("camera.zoom", self.min_zoom, self.max_zoom)?;
        if self.min_zoom <= 0.0 {
            return Err(ConfigError::Range {
                field: "camera.zoom",
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        ordered_range("camera.polar", self.min_polar, self.max_polar)?;
        if self.min_polar < 0.0 || self.max_polar > std::f32::consts::PI {
            return Err(ConfigError::Range {
                field: "camera.polar",
                min: self.min_polar,
                max: self.max_polar,
            });
        }
        ordered_range("camera.azimuth", self.min_azimuth, self.max_azimuth)?;
        if !self.target.is_finite() {
            return Err(ConfigError::Tuning {
                field: "camera.target",
                value: f32::NAN,
            });
        }
        Ok(())
    }
}

/// Viewer vantage. All setters clamp; the rig can never leave its ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    config: CameraConfig,
    zoom: f32,
    polar: f32,
    azimuth: f32,
}

impl CameraRig {
    pub fn new(config: CameraConfig) -> Self {
        let mut rig = Self {
            config,
            zoom: config.min_zoom,
            polar: config.min_polar,
            azimuth: 0.0,
        };
        rig.set_zoom(config.initial_zoom);
        rig.set_orbit(0.0, config.initial_polar);
        rig
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn target(&self) -> Vec3 {
        self.config.target
    }

    pub fn set_zoom(&mut self, distance: f32) {
        if distance.is_finite() {
            self.zoom = distance.clamp(self.config.min_zoom, self.config.max_zoom);
        }
    }

    /// Multiply the zoom distance, e.g. `0.9` per scroll notch in.
    pub fn zoom_by(&mut self, factor: f32) {
        self.set_zoom(self.zoom * factor);
    }

    pub fn set_orbit(&mut self, azimuth: f32, polar: f32) {
        if azimuth.is_finite() {
            self.azimuth = azimuth.clamp(self.config.min_azimuth, self.config.max_azimuth);
        }
        if polar.is_finite() {
            self.polar = polar.clamp(self.config.min_polar, self.config.max_polar);
        }
    }

    pub fn orbit(&mut self, d_azimuth: f32, d_polar: f32) {
        self.set_orbit(self.azimuth + d_azimuth, self.polar + d_polar);
    }

    /// Camera position on the sphere of radius `zoom` around the target.
    pub fn eye_position(&self) -> Vec3 {
        let (sp, cp) = self.polar.sin_cos();
        let (sa, ca) = self.azimuth.sin_cos();
        self.config.target + Vec3::new(sp * sa, cp, sp * ca) * self.zoom
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
