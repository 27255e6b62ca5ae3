//! Error types for fwcfg-core

use std::path::PathBuf;

use crate::resolver::ResolveError;

/// Result type for fwcfg-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fwcfg-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Overlay text could not be parsed
    #[error("{origin}:{line}: {message}")]
    OverlayParse {
        origin: String,
        line: usize,
        message: String,
    },

    /// Overlay content is well-formed but unusable
    #[error("Invalid overlay {origin}: {message}")]
    InvalidOverlay { origin: String, message: String },

    /// Overlay file extension not recognised
    #[error("Unsupported overlay format: {path}")]
    UnsupportedOverlay { path: PathBuf },

    /// Project manifest is invalid
    #[error("Invalid project manifest at {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    /// Project manifest already exists
    #[error("Project manifest already exists at {path}")]
    ManifestExists { path: PathBuf },

    /// `-D` definition is not `KEY=VALUE` with a valid key
    #[error("Invalid definition '{definition}': expected KEY=VALUE")]
    InvalidDefine { definition: String },

    /// I/O error with the offending path
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Resolution failed with fatal violations
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Catalog error from fwcfg-meta
    #[error(transparent)]
    Meta(#[from] fwcfg_meta::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(origin: &str, line: usize, message: impl Into<String>) -> Self {
        Self::OverlayParse {
            origin: origin.to_string(),
            line,
            message: message.into(),
        }
    }
}
