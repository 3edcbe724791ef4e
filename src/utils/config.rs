use crate::api::types::RestartPolicy;
use crate::core::{MAX_SAMPLE_INTERVAL_S, NOMINAL_SAMPLE_INTERVAL_S};
use crate::processing::{BlendPolicy, IntervalPolicy};
use crate::sensors::PositionOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Integration step used when acceleration samples carry no timing (s)
    pub nominal_sample_interval_s: f64,
    /// Whether measured inter-sample timing overrides the nominal step
    pub interval_policy: IntervalPolicy,
    /// How fix-derived and inertial speed are combined
    pub blend_policy: BlendPolicy,
    /// Behavior of `start` while already tracking
    pub restart_policy: RestartPolicy,
    /// Options handed to the position source on subscribe
    pub position_options: PositionOptions,
    /// Log verbosity for the binary
    pub log_level: LogLevel,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            nominal_sample_interval_s: NOMINAL_SAMPLE_INTERVAL_S,
            interval_policy: IntervalPolicy::default(),
            blend_policy: BlendPolicy::default(),
            restart_policy: RestartPolicy::default(),
            position_options: PositionOptions::default(),
            log_level: LogLevel::Info,
        }
    }
}

/// Logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and info messages
    Info,
    /// All messages including debug
    Debug,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::None => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    #[error("{message}")]
    Io { message: String },
    /// JSON serialization/deserialization error
    #[error("{message}")]
    Serialization { message: String },
}

impl TrackerConfig {
    /// Check every parameter, reporting the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let interval = self.nominal_sample_interval_s;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "nominal_sample_interval_s".to_string(),
                value: interval.to_string(),
                reason: "Nominal interval must be a positive number of seconds".to_string(),
            });
        }
        if interval > MAX_SAMPLE_INTERVAL_S {
            return Err(ConfigError::InvalidParameter {
                parameter: "nominal_sample_interval_s".to_string(),
                value: interval.to_string(),
                reason: format!("Nominal interval above {}s is not a sensor rate", MAX_SAMPLE_INTERVAL_S),
            });
        }
        if self.position_options.timeout_ms == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "position_options.timeout_ms".to_string(),
                value: "0".to_string(),
                reason: "Position timeout must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Load and validate configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: TrackerConfig = serde_json::from_str(&content).map_err(|e| ConfigError::Serialization {
            message: format!("Failed to parse config file '{}': {}", path_str, e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialization {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::Io {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("knotmeter_{}_{}.json", name, std::process::id()))
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = TrackerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.nominal_sample_interval_s, 0.1);
        assert_eq!(config.blend_policy, BlendPolicy::SharedBaseline);
        assert_eq!(config.restart_policy, RestartPolicy::Restart);
        assert_eq!(config.position_options.maximum_age_ms, 1000);
        assert_eq!(config.position_options.timeout_ms, 10_000);
        assert!(config.position_options.high_accuracy);
    }

    #[test]
    fn test_invalid_interval_rejected() {
        for bad in [0.0, -0.1, f64::NAN, 11.0] {
            let config = TrackerConfig {
                nominal_sample_interval_s: bad,
                ..TrackerConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidParameter { ref parameter, .. }) if parameter == "nominal_sample_interval_s"
            ));
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = TrackerConfig::default();
        config.position_options.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"blend_policy": "separate_sources", "restart_policy": "reject"}"#).unwrap();

        assert_eq!(config.blend_policy, BlendPolicy::SeparateSources);
        assert_eq!(config.restart_policy, RestartPolicy::Reject);
        assert_eq!(config.interval_policy, IntervalPolicy::PreferMeasured);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("save_and_load");
        let config = TrackerConfig {
            nominal_sample_interval_s: 0.02,
            interval_policy: IntervalPolicy::Nominal,
            log_level: LogLevel::Debug,
            ..TrackerConfig::default()
        };

        config.save_to_file(&path).unwrap();
        let loaded = TrackerConfig::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let path = temp_path("invalid");
        std::fs::write(&path, r#"{"nominal_sample_interval_s": -1.0}"#).unwrap();
        let result = TrackerConfig::from_file(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::InvalidParameter { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = TrackerConfig::from_file(temp_path("does_not_exist"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(log::LevelFilter::from(LogLevel::None), log::LevelFilter::Off);
        assert_eq!(log::LevelFilter::from(LogLevel::Debug), log::LevelFilter::Debug);
    }
}
