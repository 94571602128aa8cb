//! Shell configuration loaded from TOML.
//!
//! # Responsibility
//! - Hold every tunable of the shell: store namespace, upload policy,
//!   simulated delays and the in-flight navigation policy.
//! - Load and validate a `transcoope.toml` file.
//!
//! # Invariants
//! - Every field has a default, so an empty file is a valid config.
//! - A validated config has a non-empty namespace, a positive upload limit
//!   and at least one accepted media type.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_NAMESPACE: &str = "transcoope_";
/// 50 MiB, inclusive.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;
pub const DEFAULT_ACCEPTED_MEDIA_TYPES: [&str; 4] =
    ["audio/mpeg", "audio/wav", "audio/flac", "audio/m4a"];

/// What the navigator does with a content load requested while another load
/// is still in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InFlightPolicy {
    /// Drop the request. The section becomes active but stays empty until it
    /// is visited again.
    Drop,
    /// Remember the latest request and replay it once the in-flight load ends.
    #[default]
    LatestWins,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub namespace: String,
    pub max_upload_bytes: u64,
    pub accepted_media_types: Vec<String>,
    pub in_flight_policy: InFlightPolicy,
    pub load_delay_ms: u64,
    pub step_delay_ms: u64,
    pub background_refresh_delay_ms: u64,
    pub post_transcription_nav_delay_ms: u64,
    pub search_delay_ms: u64,
    pub date_refresh_interval_ms: u64,
    pub log_level: Option<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            accepted_media_types: DEFAULT_ACCEPTED_MEDIA_TYPES
                .iter()
                .map(|value| value.to_string())
                .collect(),
            in_flight_policy: InFlightPolicy::default(),
            load_delay_ms: 0,
            step_delay_ms: 1_500,
            background_refresh_delay_ms: 2_000,
            post_transcription_nav_delay_ms: 1_000,
            search_delay_ms: 500,
            date_refresh_interval_ms: 60_000,
            log_level: None,
        }
    }
}

impl ShellConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::Invalid("namespace cannot be empty".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        if self.accepted_media_types.is_empty() {
            return Err(ConfigError::Invalid(
                "accepted_media_types must list at least one type".to_string(),
            ));
        }
        Ok(())
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn background_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.background_refresh_delay_ms)
    }

    pub fn post_transcription_nav_delay(&self) -> Duration {
        Duration::from_millis(self.post_transcription_nav_delay_ms)
    }

    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }

    /// Interval of the date-label refresh; clamped to at least one second.
    pub fn date_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.date_refresh_interval_ms.max(1_000))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, InFlightPolicy, ShellConfig, DEFAULT_MAX_UPLOAD_BYTES};

    #[test]
    fn empty_document_yields_defaults() {
        let config = ShellConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, ShellConfig::default());
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.in_flight_policy, InFlightPolicy::LatestWins);
    }

    #[test]
    fn parses_overrides() {
        let config = ShellConfig::from_toml_str(
            r#"
            namespace = "demo_"
            in_flight_policy = "drop"
            step_delay_ms = 10
            "#,
        )
        .expect("valid config");
        assert_eq!(config.namespace, "demo_");
        assert_eq!(config.in_flight_policy, InFlightPolicy::Drop);
        assert_eq!(config.step_delay().as_millis(), 10);
        assert_eq!(config.accepted_media_types.len(), 4);
    }

    #[test]
    fn rejects_empty_namespace() {
        let err = ShellConfig::from_toml_str("namespace = \"  \"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = ShellConfig::from_toml_str("in_flight_policy = \"queue_all\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn date_refresh_interval_is_clamped() {
        let config = ShellConfig {
            date_refresh_interval_ms: 0,
            ..ShellConfig::default()
        };
        assert_eq!(config.date_refresh_interval().as_millis(), 1_000);
    }
}
