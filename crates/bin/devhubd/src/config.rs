//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `devhub.toml` in the working directory (or the path named by
//! `DEVHUB_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::time::Duration;

use serde::Deserialize;

/// Upper bound on any simulated device latency.
pub const MAX_LATENCY_MS: u64 = 10_000;

const DEFAULT_PATH: &str = "devhub.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Simulated device settings.
    pub devices: DevicesConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Latency of each virtual device, in milliseconds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DevicesConfig {
    pub light_latency_ms: u64,
    pub speaker_latency_ms: u64,
    pub toilet_latency_ms: u64,
}

impl DevicesConfig {
    #[must_use]
    pub fn light_latency(&self) -> Duration {
        Duration::from_millis(self.light_latency_ms)
    }

    #[must_use]
    pub fn speaker_latency(&self) -> Duration {
        Duration::from_millis(self.speaker_latency_ms)
    }

    #[must_use]
    pub fn toilet_latency(&self) -> Duration {
        Duration::from_millis(self.toilet_latency_ms)
    }
}

impl Config {
    /// Load configuration from `devhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if a
    /// value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("DEVHUB_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("DEVHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        override_latency("DEVHUB_LIGHT_LATENCY_MS", &mut self.devices.light_latency_ms)?;
        override_latency("DEVHUB_SPEAKER_LATENCY_MS", &mut self.devices.speaker_latency_ms)?;
        override_latency("DEVHUB_TOILET_LATENCY_MS", &mut self.devices.toilet_latency_ms)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let latencies = [
            ("light", self.devices.light_latency_ms),
            ("speaker", self.devices.speaker_latency_ms),
            ("toilet", self.devices.toilet_latency_ms),
        ];
        for (device, latency_ms) in latencies {
            if latency_ms > MAX_LATENCY_MS {
                return Err(ConfigError::Validation(format!(
                    "{device} latency {latency_ms}ms exceeds {MAX_LATENCY_MS}ms"
                )));
            }
        }
        Ok(())
    }
}

fn override_latency(var: &str, target: &mut u64) -> Result<(), ConfigError> {
    if let Ok(val) = std::env::var(var) {
        *target = parse_latency(var, &val)?;
    }
    Ok(())
}

fn parse_latency(var: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{var} must be an integer, got {value:?}")))
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "devhubd=info,devhub_app=info,devhub_adapter_virtual=info".to_string(),
        }
    }
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            light_latency_ms: 500,
            speaker_latency_ms: 1000,
            toilet_latency_ms: 1500,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
