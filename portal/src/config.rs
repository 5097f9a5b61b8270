//! Portal configuration with TOML file support.

use crate::error::PortalError;
use crate::logging::LogFormat;
use campus_types::PortalParams;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the portal.
///
/// Can be loaded from a TOML file via [`PortalConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Liveness and verification tuning. Missing keys take the college defaults.
    #[serde(default)]
    pub params: PortalParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl PortalConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PortalError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| PortalError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, PortalError> {
        let config: Self = toml::from_str(s).map_err(|e| PortalError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    ///
    /// An unbounded `params.max_challenge_attempts` is not representable and
    /// is dropped, so it reads back as the default cap.
    pub fn to_toml_string(&self) -> Result<String, PortalError> {
        toml::to_string_pretty(self).map_err(|e| PortalError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), PortalError> {
        self.log_format()?;
        if self.log_level.trim().is_empty() {
            return Err(PortalError::Config("log_level must not be empty".into()));
        }
        self.params.validate()?;
        Ok(())
    }

    pub fn log_format(&self) -> Result<LogFormat, PortalError> {
        self.log_format.parse()
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            log_level: default_log_level(),
            params: PortalParams::default(),
        }
    }
}
