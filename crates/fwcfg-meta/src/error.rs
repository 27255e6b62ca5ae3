//! Error types for fwcfg-meta

use std::path::PathBuf;

use crate::catalog::CatalogProblem;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog at {path}: {message}")]
    CatalogParse { path: PathBuf, message: String },

    #[error("Invalid catalog: {}", format_problems(.problems))]
    InvalidCatalog { problems: Vec<CatalogProblem> },

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_problems(problems: &[CatalogProblem]) -> String {
    problems
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
