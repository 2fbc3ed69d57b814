// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading, validation, and merging for Skygear error reporting.
//!
//! This crate provides [`ErrorConfig`] (log level plus per-code display
//! message overrides) together with helpers for loading from TOML files,
//! merging overlays, and producing advisory [`ConfigWarning`]s.  A validated
//! config becomes a [`MessageCatalog`], the lookup callers use when showing an
//! error to a user.
//!
//! The `log_level` setting does not configure logging by itself; the host
//! application turns it into a subscriber filter with
//! [`ErrorConfig::env_filter`].
#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use skygear_error::{ErrorCode, SkygearError};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file was not found.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file exists but could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A code was given its own message while codes that normally share its
    /// text were left alone.
    SplitMessageGroup {
        /// The overridden code.
        code: ErrorCode,
        /// Group members still using the built-in text.
        untouched: Vec<ErrorCode>,
    },
    /// The fallback message was replaced.
    FallbackOverridden,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::SplitMessageGroup { code, untouched } => {
                write!(f, "override for '{code}' splits its message group; ")?;
                let names: Vec<&str> = untouched.iter().map(ErrorCode::as_str).collect();
                write!(f, "still using the built-in text: {}", names.join(", "))
            }
            ConfigWarning::FallbackOverridden => write!(
                f,
                "override for '{}' also applies to every unrecognized code",
                ErrorCode::UnexpectedError
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Error-reporting settings for the Skygear SDK.
///
/// ```toml
/// log_level = "debug"
///
/// [messages]
/// RESOURCE_NOT_FOUND = "Nothing here."
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ErrorConfig {
    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Display message overrides keyed by code name (`"RESOURCE_NOT_FOUND"`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub messages: BTreeMap<String, String>,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".into()),
            messages: BTreeMap::new(),
        }
    }
}

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

impl ErrorConfig {
    /// Build a subscriber filter from `log_level`, defaulting to `info`.
    ///
    /// Only `error`, `warn`, `info`, `debug` and `trace` are accepted; anything
    /// else is a [`ConfigError::ValidationError`].
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        let level = self.log_level.as_deref().unwrap_or("info");
        if !VALID_LOG_LEVELS.contains(&level) {
            return Err(ConfigError::ValidationError {
                reasons: vec![format!("invalid log_level '{level}'")],
            });
        }
        Ok(EnvFilter::new(level))
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load an [`ErrorConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`ErrorConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<ErrorConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|e| {
                let path = p.display().to_string();
                if e.kind() == std::io::ErrorKind::NotFound {
                    ConfigError::FileNotFound { path }
                } else {
                    ConfigError::Io { path, source: e }
                }
            })?;
            parse_toml(&content)?
        }
        None => ErrorConfig::default(),
    };
    apply_env_overrides(&mut config);
    debug!(
        target: "skygear.config",
        path = ?path,
        overrides = config.messages.len(),
        "loaded error config"
    );
    Ok(config)
}

/// Parse a TOML string into an [`ErrorConfig`].
pub fn parse_toml(content: &str) -> Result<ErrorConfig, ConfigError> {
    toml::from_str::<ErrorConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides.
///
/// Recognised variables:
/// - `SKYGEAR_LOG_LEVEL`
pub fn apply_env_overrides(config: &mut ErrorConfig) {
    if let Ok(val) = std::env::var("SKYGEAR_LOG_LEVEL") {
        config.log_level = Some(val);
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a parsed configuration, returning advisory warnings.
///
/// Unknown log levels, unknown code names and blank messages are returned as
/// a [`ConfigError::ValidationError`]; soft issues come back as warnings.
pub fn validate_config(config: &ErrorConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();

    if let Some(ref level) = config.log_level
        && !VALID_LOG_LEVELS.contains(&level.as_str())
    {
        errors.push(format!("invalid log_level '{level}'"));
    }

    let overridden: Vec<ErrorCode> = config
        .messages
        .keys()
        .filter_map(|k| ErrorCode::from_name(k))
        .collect();

    for (key, message) in &config.messages {
        let Some(code) = ErrorCode::from_name(key) else {
            errors.push(format!("unknown error code '{key}'"));
            continue;
        };
        if message.trim().is_empty() {
            errors.push(format!("message for '{key}' must not be empty"));
            continue;
        }

        if code.is_fallback() {
            warnings.push(ConfigWarning::FallbackOverridden);
        }

        let untouched: Vec<ErrorCode> = ErrorCode::ALL
            .iter()
            .copied()
            .filter(|other| {
                *other != code && other.message() == code.message() && !overridden.contains(other)
            })
            .collect();
        if !untouched.is_empty() {
            warnings.push(ConfigWarning::SplitMessageGroup { code, untouched });
        }
    }

    if errors.is_empty() {
        for w in &warnings {
            warn!(target: "skygear.config", "{w}");
        }
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge two configurations.  Values in `overlay` take precedence over `base`.
///
/// Message maps are combined; on key collisions the overlay entry wins.
pub fn merge_configs(base: ErrorConfig, overlay: ErrorConfig) -> ErrorConfig {
    let mut messages = base.messages;
    messages.extend(overlay.messages);
    ErrorConfig {
        log_level: overlay.log_level.or(base.log_level),
        messages,
    }
}

// ---------------------------------------------------------------------------
// MessageCatalog
// ---------------------------------------------------------------------------

/// Display message lookup with optional per-code overrides.
///
/// Always total: a code without an override gets [`ErrorCode::message`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    overrides: BTreeMap<ErrorCode, String>,
}

impl MessageCatalog {
    /// Catalog with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `config` and build a catalog from its `messages` table.
    pub fn from_config(config: &ErrorConfig) -> Result<Self, ConfigError> {
        validate_config(config)?;
        let overrides = config
            .messages
            .iter()
            .filter_map(|(k, v)| ErrorCode::from_name(k).map(|code| (code, v.clone())))
            .collect();
        Ok(Self { overrides })
    }

    /// Replace the message for a single code.
    ///
    /// A blank or whitespace-only message is ignored and the code keeps its
    /// current text.
    pub fn with_override(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        if !message.trim().is_empty() {
            self.overrides.insert(code, message);
        }
        self
    }

    /// Whether `code` has an override.
    pub fn is_overridden(&self, code: ErrorCode) -> bool {
        self.overrides.contains_key(&code)
    }

    /// Message to show for `code`.
    pub fn message(&self, code: ErrorCode) -> &str {
        self.overrides
            .get(&code)
            .map(String::as_str)
            .unwrap_or_else(|| code.message())
    }

    /// Message to show for `err`, resolved through its code.
    pub fn message_for(&self, err: &SkygearError) -> &str {
        self.message(err.code())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
