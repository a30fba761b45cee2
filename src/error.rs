//! Structured error types for configuration loading.

use serde::Serialize;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The destination is not a usable struct-shaped record.
    InvalidTarget,
    /// The base document failed to decode.
    DocumentParseError,
    /// A synthesized environment override failed to decode.
    EnvironmentParseError,
}

/// Failure reported by the document codec.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to read document: {0}")]
    Read(#[from] std::io::Error),

    #[error("{0}")]
    Syntax(#[from] toml::de::Error),

    #[error("invalid value for `{path}`: {message}")]
    Value { path: String, message: String },
}

impl CodecError {
    pub fn value(message: impl Into<String>) -> Self {
        Self::Value {
            path: String::new(),
            message: message.into(),
        }
    }

    /// Type mismatch between what a field accepts and what the document holds.
    pub fn mismatch(expected: &str, found: &toml::Value) -> Self {
        Self::value(format!("expected {}, found {}", expected, found.type_str()))
    }

    /// Prefix the error's key path with `key`. Only value errors carry a path.
    pub fn at(self, key: &str) -> Self {
        match self {
            Self::Value { path, message } => {
                let path = if path.is_empty() {
                    key.to_string()
                } else if path.starts_with('[') {
                    format!("{}{}", key, path)
                } else {
                    format!("{}.{}", key, path)
                };
                Self::Value { path, message }
            }
            other => other,
        }
    }

    /// Prefix the error's key path with an array index.
    pub fn at_index(self, index: usize) -> Self {
        match self {
            Self::Value { path, message } => {
                let path = if path.is_empty() || path.starts_with('[') {
                    format!("[{}]{}", index, path)
                } else {
                    format!("[{}].{}", index, path)
                };
                Self::Value { path, message }
            }
            other => other,
        }
    }
}

/// Error returned by [`crate::load`] and [`crate::ConfigMerger::load`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid configuration target: {0}")]
    InvalidTarget(String),

    #[error("failed parsing configuration document: {0}")]
    DocumentParse(#[source] CodecError),

    #[error("failed parsing environment config {var}: {source}")]
    EnvironmentParse {
        var: String,
        #[source]
        source: CodecError,
    },
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTarget(_) => ErrorKind::InvalidTarget,
            Self::DocumentParse(_) => ErrorKind::DocumentParseError,
            Self::EnvironmentParse { .. } => ErrorKind::EnvironmentParseError,
        }
    }

    /// Name of the environment variable whose override failed, if any.
    pub fn env_var(&self) -> Option<&str> {
        match self {
            Self::EnvironmentParse { var, .. } => Some(var),
            _ => None,
        }
    }
}

/// Result type for load operations.
pub type LoadResult<T> = std::result::Result<T, LoadError>;
