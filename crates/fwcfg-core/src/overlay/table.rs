//! TOML overlay
//!
//! ```toml
//! undefine = ["USE_EMULATION_WEMO"]
//!
//! [overrides]
//! CFG_HOLDER = 4618
//! STA_SSID1 = "YourSSID"
//! USE_DISPLAY_ST7789 = true
//! ```
//!
//! `undefine` entries are applied before `[overrides]`, and overrides in
//! key order.

use fwcfg_meta::RawValue;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::source::{LayerEntry, LayerSyntax, SourceLayer};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableOverlay {
    #[serde(default)]
    undefine: Vec<String>,
    #[serde(default)]
    overrides: toml::Table,
}

/// Parse TOML overlay text; `origin` names the file in errors
pub fn parse(text: &str, origin: &str) -> Result<SourceLayer> {
    let overlay: TableOverlay = toml::from_str(text).map_err(|e| Error::InvalidOverlay {
        origin: origin.to_string(),
        message: e.message().to_string(),
    })?;

    let mut layer = SourceLayer::overrides()
        .with_syntax(LayerSyntax::Table)
        .with_origin(origin);

    for name in overlay.undefine {
        layer.push(LayerEntry::undefine(name));
    }
    for (name, value) in &overlay.overrides {
        let raw = RawValue::from_toml(value).map_err(|e| Error::InvalidOverlay {
            origin: origin.to_string(),
            message: format!("override '{}': {}", name, e),
        })?;
        layer.push(LayerEntry::set(name.as_str(), raw));
    }
    Ok(layer)
}
