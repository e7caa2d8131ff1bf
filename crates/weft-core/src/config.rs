//! Editor configuration
//!
//! Loaded from TOML; every section and key is optional.
//!
//! ```toml
//! [preview]
//! debounce_ms = 300
//! default_language = "rust"
//! default_framework = "axum"
//!
//! [autosave]
//! enabled = true
//! quiet_period_ms = 2000
//!
//! [logging]
//! level = "weft=debug,info"
//! json = false
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use weft_preview::{PreviewConfig, Target};

/// Top-level editor configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub preview: PreviewConfig,
    pub autosave: AutosaveConfig,
    pub logging: LoggingConfig,
}

/// Background save after edits settle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub enabled: bool,
    /// Quiet period before an autosave; longer than the preview debounce
    pub quiet_period_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            quiet_period_ms: 2_000,
        }
    }
}

impl AutosaveConfig {
    #[inline]
    #[must_use]
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` overrides it
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl EditorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With preview debounce
    #[inline]
    #[must_use]
    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.preview.debounce_ms = debounce_ms;
        self
    }

    /// With the starting preview target
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.preview.default_language = target.language();
        self.preview.default_framework = target.framework();
        self
    }

    /// With autosave enabled after `quiet_period_ms`
    #[inline]
    #[must_use]
    pub fn with_autosave(mut self, quiet_period_ms: u64) -> Self {
        self.autosave = AutosaveConfig {
            enabled: true,
            quiet_period_ms,
        };
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Syntax errors, unknown enum values, or failed [`Self::validate`].
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a config file
    ///
    /// # Errors
    /// See [`Self::from_toml_str`]; also [`ConfigError::Read`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    /// - zero preview debounce
    /// - enabled autosave whose quiet period is not longer than the debounce
    /// - a default framework outside the default language
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.preview.debounce_ms == 0 {
            return Err(ConfigError::Invalid("preview.debounce_ms must be positive".into()));
        }
        if self.autosave.enabled && self.autosave.quiet_period_ms <= self.preview.debounce_ms {
            return Err(ConfigError::Invalid(format!(
                "autosave.quiet_period_ms ({}) must exceed preview.debounce_ms ({})",
                self.autosave.quiet_period_ms, self.preview.debounce_ms
            )));
        }
        self.preview.default_target()?;
        Ok(())
    }

    /// Starting preview target
    ///
    /// # Errors
    /// Only for a config that skipped [`Self::validate`].
    pub fn target(&self) -> Result<Target, ConfigError> {
        Ok(self.preview.default_target()?)
    }

    /// Effective configuration as TOML
    ///
    /// # Errors
    /// Never fails for this type in practice; serializer errors are reported.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}
