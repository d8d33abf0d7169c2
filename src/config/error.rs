//! Configuration errors

use std::io;

use super::value::ValueKind;

/// Errors raised while loading or overriding configuration.
///
/// None of these are recovered internally: a configuration that fails to
/// load must not be used with partially applied overrides.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} is not a valid config key")]
    UnknownKey { key: String },

    #[error("Type mismatch ({expected} vs. {found}) for config key: {key}{}", detail_suffix(.detail))]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
        detail: Option<String>,
    },

    #[error("Override list must contain key/value pairs, got {len} items")]
    MalformedArguments { len: usize },

    #[error("Failed to read config file: {0}")]
    IoError(#[from] io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default()
}

impl ConfigError {
    pub(crate) fn unknown_key(key: impl Into<String>) -> Self {
        ConfigError::UnknownKey { key: key.into() }
    }

    pub(crate) fn type_mismatch(key: impl Into<String>, expected: ValueKind, found: ValueKind) -> Self {
        ConfigError::TypeMismatch {
            key: key.into(),
            expected,
            found,
            detail: None,
        }
    }

    /// Attach a note to a type mismatch; other variants are returned as-is
    pub(crate) fn with_detail(self, note: impl Into<String>) -> Self {
        match self {
            ConfigError::TypeMismatch {
                key,
                expected,
                found,
                ..
            } => ConfigError::TypeMismatch {
                key,
                expected,
                found,
                detail: Some(note.into()),
            },
            other => other,
        }
    }
}
