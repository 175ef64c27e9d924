//! Runtime configuration, loaded from TOML.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// Process-wide settings.
///
/// Every field has a default, so an empty document is a valid config.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use portal_runtime::config::Config;
///
/// let config = Config::from_toml_str("debug = true\ntoast_auto_dismiss_ms = 2500").unwrap();
/// assert!(config.debug);
/// assert_eq!(config.toast_auto_dismiss(), Duration::from_millis(2500));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Log every message and state change at `debug` level.
    pub debug: bool,
    pub toast_auto_dismiss_ms: u64,
    /// Filter directives used when `RUST_LOG` is unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            toast_auto_dismiss_ms: 5000,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.toast_auto_dismiss_ms == 0 {
            return Err(ConfigError::Invalid {
                message: "toast_auto_dismiss_ms must be greater than zero".to_owned(),
            });
        }
        Ok(())
    }

    pub fn toast_auto_dismiss(&self) -> Duration {
        Duration::from_millis(self.toast_auto_dismiss_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_zero_dismiss_delay_is_rejected() {
        let err = Config::from_toml_str("toast_auto_dismiss_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_unknown_field_is_a_parse_error() {
        let err = Config::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = Config::load("/nonexistent/portal.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/portal.toml"));
    }

    #[test]
    fn test_log_filter_round_trips() {
        let config = Config {
            log_filter: Some("portal_runtime=trace".into()),
            ..Config::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }
}
