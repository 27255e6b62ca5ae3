//! Rendering a resolved configuration for downstream consumers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::resolver::ResolvedConfiguration;

/// Include guard of generated headers
pub const HEADER_GUARD: &str = "FWCFG_RESOLVED_H";

/// Output format for `fwcfg resolve`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// C header consumed by the firmware compile
    #[default]
    Header,
    /// `{ NAME: { value, source } }`
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => write!(f, "header"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "header" | "h" => Ok(Self::Header),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

pub fn render(config: &ResolvedConfiguration, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Header => Ok(render_header(config)),
        OutputFormat::Json => render_json(config),
    }
}

/// Include-guarded C header with one directive per setting
///
/// Enabled flags are `#define`d without a value, disabled flags are
/// `#undef`d, and strings and IP addresses are quoted.
pub fn render_header(config: &ResolvedConfiguration) -> String {
    let mut out = String::new();
    out.push_str("// Generated by fwcfg. Do not edit.\n");
    out.push_str(&format!("// {}\n", config.fingerprint()));
    out.push_str(&format!("#ifndef {}\n#define {}\n\n", HEADER_GUARD, HEADER_GUARD));

    for setting in config.iter() {
        match setting.value.to_c_literal() {
            Some(literal) => out.push_str(&format!("#define {} {}\n", setting.id, literal)),
            None if setting.value.is_enabled() => {
                out.push_str(&format!("#define {}\n", setting.id))
            }
            None => out.push_str(&format!("#undef {}\n", setting.id)),
        }
    }

    out.push_str(&format!("\n#endif  // {}\n", HEADER_GUARD));
    out
}

pub fn render_json(config: &ResolvedConfiguration) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ConfigResolver;
    use crate::source::SourceLayer;
    use fwcfg_meta::{CatalogBuilder, RawValue, SettingType};

    fn config() -> ResolvedConfiguration {
        let catalog = CatalogBuilder::new()
            .setting("CFG_HOLDER", SettingType::Integer, toml::Value::Integer(4617))
            .setting("STA_SSID1", SettingType::String, toml::Value::String(String::new()))
            .setting("WIFI_GATEWAY", SettingType::Ip, toml::Value::String("192.168.1.1".into()))
            .flag("USE_SPI", false)
            .flag("USE_RULES", true)
            .build()
            .unwrap();
        ConfigResolver::new(catalog)
            .with_overrides(SourceLayer::overrides().set("STA_SSID1", RawValue::Text("\"home\"".into())))
            .resolve()
            .unwrap()
    }

    #[test]
    fn header_body() {
        let header = render_header(&config());
        let body: Vec<&str> = header
            .lines()
            .filter(|l| l.starts_with("#define") || l.starts_with("#undef"))
            .collect();
        assert_eq!(
            body,
            vec![
                "#define FWCFG_RESOLVED_H",
                "#define CFG_HOLDER 4617",
                "#define STA_SSID1 \"home\"",
                "#define WIFI_GATEWAY \"192.168.1.1\"",
                "#undef USE_SPI",
                "#define USE_RULES",
            ]
        );
        assert!(header.starts_with("// Generated by fwcfg"));
        assert!(header.ends_with("#endif  // FWCFG_RESOLVED_H\n"));
    }

    #[test]
    fn json_carries_source() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&config()).unwrap()).unwrap();
        assert_eq!(json["STA_SSID1"]["value"], "home");
        assert_eq!(json["STA_SSID1"]["source"], "override");
        assert_eq!(json["WIFI_GATEWAY"]["value"], "192.168.1.1");
        assert_eq!(json["USE_SPI"]["source"], "default");
    }

    #[test]
    fn format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
