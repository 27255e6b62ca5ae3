//! Loading catalogs from disk

use std::fs;
use std::path::Path;

use crate::catalog::Catalog;
use crate::{Error, Result};

/// Catalogs larger than this are rejected before parsing
pub const MAX_CATALOG_BYTES: u64 = 4 * 1024 * 1024;

/// Load and validate a catalog file.
///
/// Parse errors are reported with the file path; validation problems are
/// returned as [`Error::InvalidCatalog`].
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    if metadata.len() > MAX_CATALOG_BYTES {
        return Err(Error::CatalogParse {
            path: path.to_path_buf(),
            message: format!(
                "file is {} bytes (max {})",
                metadata.len(),
                MAX_CATALOG_BYTES
            ),
        });
    }

    tracing::debug!(?path, "Loading catalog");
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    match Catalog::parse(&content) {
        Err(Error::TomlDe(e)) => Err(Error::CatalogParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        other => other,
    }
}
