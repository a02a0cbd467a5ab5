//! PKG-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, PkgError>;

/// Top-level error type for the release asset packager.
#[derive(Debug, Error)]
pub enum PkgError {
    #[error("[PKG-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[PKG-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[PKG-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[PKG-2001] malformed checksum line {line}: {details}")]
    ChecksumParse { line: usize, details: String },

    #[error("[PKG-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[PKG-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PkgError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "PKG-1001",
            Self::MissingConfig { .. } => "PKG-1002",
            Self::ConfigParse { .. } => "PKG-1003",
            Self::ChecksumParse { .. } => "PKG-2001",
            Self::Serialization { .. } => "PKG-2101",
            Self::Io { .. } => "PKG-3002",
        }
    }

    /// Whether the failure came from user-supplied input rather than the environment.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::ConfigParse { .. }
                | Self::ChecksumParse { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for PkgError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for PkgError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
