//! Overlay sources
//!
//! An overlay is the integrator's sparse set of changes. It is written either
//! as a directive header (`.h`) or as a TOML table (`.toml`) and is lowered
//! once into an ordered Override [`SourceLayer`].

pub mod directive;
pub mod table;

use std::path::Path;

use crate::error::{Error, Result};
use crate::source::SourceLayer;

/// Overlay syntax, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayFormat {
    /// `#define` / `#undef` header
    Directive,
    /// `[overrides]` table
    Table,
}

impl OverlayFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(Self::Table),
            Some("h" | "hh" | "hpp" | "inc") | None => Ok(Self::Directive),
            Some(_) => Err(Error::UnsupportedOverlay {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Parse overlay text in the given format
pub fn parse_overlay(text: &str, format: OverlayFormat, origin: &str) -> Result<SourceLayer> {
    match format {
        OverlayFormat::Directive => directive::parse(text, origin),
        OverlayFormat::Table => table::parse(text, origin),
    }
}

/// Load an overlay file; a missing file is an empty overlay
pub fn load_overlay(path: &Path) -> Result<SourceLayer> {
    let format = OverlayFormat::from_path(path)?;
    let origin = path.display().to_string();

    if !path.exists() {
        tracing::debug!(?path, "No overlay file, using defaults only");
        return Ok(SourceLayer::overrides().with_origin(origin));
    }

    tracing::debug!(?path, ?format, "Loading overlay");
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let layer = parse_overlay(&text, format, &origin)?;
    tracing::debug!(entries = layer.len(), "Overlay loaded");
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            OverlayFormat::from_path(&PathBuf::from("user_config_override.h")).unwrap(),
            OverlayFormat::Directive
        );
        assert_eq!(
            OverlayFormat::from_path(&PathBuf::from("overlay.TOML")).unwrap(),
            OverlayFormat::Table
        );
        assert!(matches!(
            OverlayFormat::from_path(&PathBuf::from("overlay.yaml")),
            Err(Error::UnsupportedOverlay { .. })
        ));
    }

    #[test]
    fn missing_file_is_empty_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let layer = load_overlay(&dir.path().join("user_config_override.h")).unwrap();
        assert!(layer.is_empty());
    }

    #[test]
    fn loads_directive_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_config_override.h");
        std::fs::write(&path, "#undef CFG_HOLDER\n#define CFG_HOLDER 4618\n").unwrap();

        let layer = load_overlay(&path).unwrap();
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.origin(), Some(path.display().to_string().as_str()));
    }
}
