//! Card backend connection settings.
//!
//! # Invariants
//! - `base_url` is non-empty and uses `http` or `https`.
//! - `request_timeout_ms` is positive.

use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Where and how to reach the card backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Prefix for `/cards` routes, e.g. `https://studio.example/api`.
    pub base_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Sent as `Authorization: Bearer <token>` when present.
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            auth_token: None,
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: BackendConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: format!("expected http:// or https:// scheme, got `{base_url}`"),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if matches!(&self.auth_token, Some(token) if token.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "auth_token",
                reason: "must not be blank when set".to_string(),
            });
        }
        Ok(())
    }

    /// Base URL without trailing slashes.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendConfig, ConfigError, DEFAULT_REQUEST_TIMEOUT_MS};
    use std::io::Write;

    #[test]
    fn toml_applies_defaults() {
        let config = BackendConfig::from_toml_str(r#"base_url = "http://localhost:3000/api/""#)
            .expect("minimal config should parse");
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.auth_token, None);
        assert_eq!(config.normalized_base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn rejects_unknown_fields_and_bad_values() {
        let err = BackendConfig::from_toml_str("base_url = \"http://x\"\nretries = 3")
            .expect_err("unknown field must fail");
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = BackendConfig::from_toml_str("base_url = \"ftp://x\"")
            .expect_err("scheme must be http(s)");
        assert!(matches!(err, ConfigError::InvalidValue { field: "base_url", .. }));

        let err = BackendConfig::from_toml_str("base_url = \"http://x\"\nrequest_timeout_ms = 0")
            .expect_err("zero timeout must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "request_timeout_ms",
                ..
            }
        ));
    }

    #[test]
    fn from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "base_url = \"https://studio.example/api\"\nauth_token = \"secret\""
        )
        .expect("write config");

        let config = BackendConfig::from_path(file.path()).expect("config should load");
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
    }
}
