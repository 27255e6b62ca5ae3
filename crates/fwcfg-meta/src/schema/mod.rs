//! Schema definitions for the defaults catalog
//!
//! A catalog is a single TOML file declaring every setting the firmware
//! knows about, plus the constraints between them:
//!
//! - `[[setting]]` - one entry per setting, with type and default
//! - `[[group]]` - exclusion groups (also implied by `group` tags)
//! - `[[dependency]]` - "A requires B" rules between flags
//! - `[holder]` - the setting that gates flash-held values

pub mod dependency;
pub mod group;
pub mod setting;

pub use dependency::{DependencyDefinition, DependencyRule, FlagState};
pub use group::{ExclusionGroup, GroupDefinition};
pub use setting::{Setting, SettingDefinition};

use serde::{Deserialize, Serialize};

/// Raw catalog file as deserialized from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogFile {
    /// Holder section naming the flash-settings gate
    #[serde(default)]
    pub holder: Option<HolderSection>,

    #[serde(default, rename = "setting")]
    pub settings: Vec<SettingDefinition>,

    #[serde(default, rename = "group")]
    pub groups: Vec<GroupDefinition>,

    #[serde(default, rename = "dependency")]
    pub dependencies: Vec<DependencyDefinition>,
}

/// Names the setting whose change causes flash-held settings to be reloaded
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HolderSection {
    pub setting: String,
}
