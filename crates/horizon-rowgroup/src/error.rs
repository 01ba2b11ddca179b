//! Error types for flattener configuration.
//!
//! Grouping, filtering, sorting and toggling never fail. Errors only arise
//! while loading a [`FlattenerConfig`](crate::FlattenerConfig).

use std::path::PathBuf;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a flattener from configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error.
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("Config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A field kind name that is not recognised.
    #[error("Unknown field kind '{0}'")]
    UnknownFieldKind(String),

    /// A year-rank mode name that is not recognised.
    #[error("Unknown year rank '{0}'")]
    UnknownYearRank(String),

    /// A reference date that is not `YYYY-MM-DD`.
    #[error("Invalid reference date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl Error {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an unknown field kind error.
    pub fn unknown_field_kind(kind: impl Into<String>) -> Self {
        Self::UnknownFieldKind(kind.into())
    }

    /// Create an unknown year rank error.
    pub fn unknown_year_rank(mode: impl Into<String>) -> Self {
        Self::UnknownYearRank(mode.into())
    }

    /// Create an invalid date error.
    pub fn invalid_date(value: impl Into<String>, source: chrono::ParseError) -> Self {
        Self::InvalidDate {
            value: value.into(),
            source,
        }
    }
}
