//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Smallest view scale the zoom tools may reach.
pub const MIN_ZOOM: f64 = 0.001;
/// Largest view scale the zoom tools may reach.
pub const MAX_ZOOM: f64 = 1000.0;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunables for gesture recognition, zoom limits and history depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window after the first pointer-down in which a second pointer turns
    /// the gesture into a double drag.
    #[serde(with = "secs_f64")]
    pub grace_period: Duration,
    /// Motion (screen pixels) a pointer may travel and still count as a tap.
    pub click_threshold: f64,
    /// Maximum time between taps for them to count as a multi-tap.
    #[serde(with = "secs_f64")]
    pub multi_tap_interval: Duration,
    /// Maximum distance (screen pixels) between taps of a multi-tap.
    pub multi_tap_distance: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Number of commands kept in the undo stack.
    pub max_history: usize,
    /// Hit radius (screen pixels) of line edit handles.
    pub handle_tolerance: f64,
    /// Hold back `BeginDrag` until the grace period has elapsed instead of
    /// beginning optimistically and cancelling when a second finger lands.
    pub defer_begin_drag: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_millis(100),
            click_threshold: 5.0,
            multi_tap_interval: Duration::from_millis(500),
            multi_tap_distance: 5.0,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            max_history: 100,
            handle_tolerance: 24.0,
            defer_begin_drag: false,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a config from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that limits and thresholds are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} must be positive and ordered",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.click_threshold < 0.0 || self.multi_tap_distance < 0.0 || self.handle_tolerance < 0.0 {
            return Err(ConfigError::Invalid("distance thresholds must be non-negative".to_string()));
        }
        if self.max_history == 0 {
            return Err(ConfigError::Invalid("max_history must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Clamp a scale into the configured zoom range.
    pub fn clamp_zoom(&self, scale: f64) -> f64 {
        scale.clamp(self.min_zoom, self.max_zoom)
    }
}

/// Durations are written as fractional seconds.
mod secs_f64 {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.grace_period, Duration::from_millis(100));
        assert!((config.min_zoom - MIN_ZOOM).abs() < f64::EPSILON);
        assert!((config.max_zoom - MAX_ZOOM).abs() < f64::EPSILON);
        assert!(!config.defer_begin_drag);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{ "grace_period": 0.25, "max_history": 10 }"#).unwrap();
        assert_eq!(config.grace_period, Duration::from_millis(250));
        assert_eq!(config.max_history, 10);
        assert!((config.click_threshold - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_inverted_zoom_range() {
        let result = EngineConfig::from_json(r#"{ "min_zoom": 10.0, "max_zoom": 1.0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_negative_grace_period() {
        let result = EngineConfig::from_json(r#"{ "grace_period": -1.0 }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_clamp_zoom() {
        let config = EngineConfig::default();
        assert!((config.clamp_zoom(5000.0) - MAX_ZOOM).abs() < f64::EPSILON);
        assert!((config.clamp_zoom(0.0) - MIN_ZOOM).abs() < f64::EPSILON);
    }
}
