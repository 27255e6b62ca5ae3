//! Setting definition schema
//!
//! # Example TOML
//!
//! ```toml
//! [[setting]]
//! id = "WIFI_IP_ADDRESS"
//! type = "ip"
//! default = "0.0.0.0"
//! env = "MY_IP"
//! description = "Static IP address, 0.0.0.0 for DHCP"
//! ```

use serde::{Deserialize, Serialize};

use crate::value::{SettingType, Value};

/// A setting as written in the catalog file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SettingDefinition {
    /// Preprocessor identifier (e.g., "USE_DISPLAY_ST7789")
    pub id: String,
    /// Declared value type
    #[serde(rename = "type")]
    pub setting_type: SettingType,
    /// Compiled-in default
    pub default: toml::Value,
    /// Exclusion group tag
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Allow-listed external key that may supply this setting at build time
    #[serde(default)]
    pub env: Option<String>,
    /// Value is persisted on the device and only reapplied when the holder changes
    #[serde(default)]
    pub flash: bool,
}

/// A validated setting with a typed default
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Setting {
    pub id: String,
    #[serde(rename = "type")]
    pub setting_type: SettingType,
    pub default: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    pub flash: bool,
}

impl Setting {
    /// Whether this is a boolean feature toggle
    pub fn is_flag(&self) -> bool {
        self.setting_type == SettingType::Bool
    }
}
