//! Aggregated scene configuration.
//!
//! Every tunable lives here so a scene can be described by one JSON
//! document. Missing fields fall back to defaults; [`SceneConfig::validate`]
//! runs before anything is simulated and the first problem wins.

use serde::{Deserialize, Serialize};

use crate::bounds::SceneBounds;
use crate::camera::CameraConfig;
use crate::error::ConfigError;
use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::suspension::SuspensionConfig;
use crate::wander::WanderConfig;
use crate::wind::WindConfig;

/// How many floor agents to spawn and from which master seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSpawnConfig {
    pub count: usize,
    pub master_seed: u64,
}

impl Default for AgentSpawnConfig {
    fn default() -> Self {
        Self {
            count: 3,
            master_seed: 0x7e7e_a11e,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub bounds: SceneBounds,
    pub wind: WindConfig,
    pub suspension: SuspensionConfig,
    pub wander: WanderConfig,
    pub agents: AgentSpawnConfig,
    pub camera: CameraConfig,
    pub page_size: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            bounds: SceneBounds::default(),
            wind: WindConfig::default(),
            suspension: SuspensionConfig::default(),
            wander: WanderConfig::default(),
            agents: AgentSpawnConfig::default(),
            camera: CameraConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounds.validate()?;
        if self.page_size == 0 {
            return Err(ConfigError::PageSize);
        }
        self.wind.validate()?;
        self.suspension.validate()?;
        self.wander.validate()?;
        self.camera.validate()?;
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn empty_document_means_defaults() {
        let config = SceneConfig::from_json("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn partial_document_overrides_only_given_fields() {
        let config =
            SceneConfig::from_json(r#"{"page_size": 3, "bounds": {"floor_width": 30.0}}"#).unwrap();
        assert_eq!(config.page_size, 3);
        assert_eq!(config.bounds.floor_width, 30.0);
        assert_eq!(config.bounds.floor_depth, SceneBounds::default().floor_depth);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = SceneConfig::from_json(r#"{"page_size": 0}"#).unwrap_err();
        assert_eq!(err, ConfigError::PageSize);
    }

    #[test]
    fn bad_margin_is_rejected_before_start() {
        let err = SceneConfig::from_json(r#"{"bounds": {"margin_fraction": 0.6}}"#).unwrap_err();
        assert_eq!(err, ConfigError::MarginFraction(0.6));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SceneConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
