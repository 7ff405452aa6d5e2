//! Tunables for the linking passes, with an optional YAML override file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_HIT_KILL_TOLERANCE: f64 = 0.25;
pub const DEFAULT_LAUNCH_IMPACT_WINDOW: f64 = 60.0;
pub const DEFAULT_SPLASH_TIME_WINDOW: f64 = 0.15;
pub const DEFAULT_SPLASH_RADIUS_M: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Seconds allowed between an impact and the destruction it caused.
    pub hit_kill_tolerance: f64,
    /// Seconds a heuristic impact may trail its launch.
    pub launch_impact_window: f64,
    /// Prefer launches whose locked target is the impacted target.
    pub prefer_locked_target: bool,
    /// Seconds a splash kill may differ from the primary kill.
    pub splash_time_window: f64,
    /// Ground radius around the primary kill for splash kills.
    pub splash_radius_m: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            hit_kill_tolerance: DEFAULT_HIT_KILL_TOLERANCE,
            launch_impact_window: DEFAULT_LAUNCH_IMPACT_WINDOW,
            prefer_locked_target: true,
            splash_time_window: DEFAULT_SPLASH_TIME_WINDOW,
            splash_radius_m: DEFAULT_SPLASH_RADIUS_M,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config value: {0}")]
    Validation(String),
}

impl LinkConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Load overrides from a YAML file; absent keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config = Self::from_yaml_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("hit_kill_tolerance", self.hit_kill_tolerance),
            ("launch_impact_window", self.launch_impact_window),
            ("splash_time_window", self.splash_time_window),
            ("splash_radius_m", self.splash_radius_m),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        assert_eq!(LinkConfig::from_yaml_str("").expect("parse"), LinkConfig::default());
    }

    #[test]
    fn partial_yaml_overrides_only_named_keys() {
        let config = LinkConfig::from_yaml_str("hit_kill_tolerance: 0.5\nprefer_locked_target: false\n")
            .expect("parse");
        assert_eq!(config.hit_kill_tolerance, 0.5);
        assert!(!config.prefer_locked_target);
        assert_eq!(config.launch_impact_window, DEFAULT_LAUNCH_IMPACT_WINDOW);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(LinkConfig::from_yaml_str("hit_window: 3\n").is_err());
    }

    #[test]
    fn negative_values_fail_validation() {
        let config = LinkConfig {
            splash_radius_m: -1.0,
            ..LinkConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }
}
