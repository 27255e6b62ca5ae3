//! Build-time environment inputs
//!
//! The build orchestrator may supply values for allow-listed settings through
//! three channels, in ascending precedence: process environment variables,
//! `-DNAME=value` tokens in a build-flags variable, and `-D` flags on the
//! command line. A key only reaches the resolver if the catalog binds it to a
//! setting. Other process and build-flags keys are ignored; a command-line
//! key the catalog does not bind is an error the project reports.

use fwcfg_meta::{Catalog, RawValue, is_valid_identifier, unquote};
use tracing::debug;

use crate::source::{LayerEntry, LayerSyntax, SourceLayer};

/// Build-flags variable read by default
pub const DEFAULT_BUILD_FLAGS_VAR: &str = "PLATFORMIO_BUILD_FLAGS";

/// Channel an input arrived through
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InputOrigin {
    Process,
    BuildFlags,
    CommandLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Input {
    key: String,
    value: String,
    origin: InputOrigin,
}

/// Ordered key/value inputs; for a repeated key the last one wins
#[derive(Debug, Clone, Default)]
pub struct EnvironmentInput {
    inputs: Vec<Input>,
}

impl EnvironmentInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process environment plus the `-D` tokens of `build_flags_var`
    pub fn from_process_env(build_flags_var: &str) -> Self {
        let mut input = Self::new();
        for (key, value) in std::env::vars_os() {
            let (Some(key), Some(value)) = (key.to_str(), value.to_str()) else {
                continue;
            };
            if key != build_flags_var {
                input.insert(key, value, InputOrigin::Process);
            }
        }
        if let Ok(flags) = std::env::var(build_flags_var) {
            debug!(var = build_flags_var, "Reading build flags");
            input.extend_build_flags(&flags);
        }
        input
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>, origin: InputOrigin) {
        self.inputs.push(Input {
            key: key.into(),
            value: value.into(),
            origin,
        });
    }

    /// Add every `-DNAME[=value]` in a compiler flags string
    pub fn extend_build_flags(&mut self, flags: &str) {
        let tokens = tokenize(flags);
        let mut iter = tokens.iter();
        while let Some(token) = iter.next() {
            let define = if token == "-D" {
                iter.next().map(String::as_str)
            } else {
                token.strip_prefix("-D")
            };
            if let Some((key, value)) = define.and_then(parse_define) {
                self.insert(key, value, InputOrigin::BuildFlags);
            }
        }
    }

    /// Add a command-line `KEY=VALUE` (or bare `KEY`) definition
    pub fn define(&mut self, definition: &str) -> bool {
        match parse_define(definition) {
            Some((key, value)) => {
                self.insert(key, value, InputOrigin::CommandLine);
                true
            }
            None => false,
        }
    }

    /// Last value supplied for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inputs
            .iter()
            .rev()
            .find(|i| i.key == key)
            .map(|i| i.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Environment layer holding only the allow-listed inputs
    pub fn to_layer(&self, catalog: &Catalog) -> SourceLayer {
        let mut inputs: Vec<&Input> = self.inputs.iter().collect();
        inputs.sort_by_key(|i| i.origin);

        let mut layer = SourceLayer::environment()
            .with_syntax(LayerSyntax::KeyValue)
            .with_origin("environment");

        for input in inputs {
            match catalog.env_binding(&input.key) {
                Some(setting) => {
                    debug!(key = %input.key, setting, origin = ?input.origin, "Environment input accepted");
                    layer.push(LayerEntry::set(
                        setting,
                        RawValue::Text(unquote(&input.value).to_string()),
                    ));
                }
                None => debug!(key = %input.key, origin = ?input.origin, "Ignoring key that is not allow-listed"),
            }
        }
        layer
    }

    /// Command-line keys the catalog does not allow-list, in the order given
    pub fn unlisted_defines<'a>(&'a self, catalog: &Catalog) -> Vec<&'a str> {
        let mut keys: Vec<&str> = Vec::new();
        for input in &self.inputs {
            if input.origin == InputOrigin::CommandLine
                && catalog.env_binding(&input.key).is_none()
                && !keys.contains(&input.key.as_str())
            {
                keys.push(&input.key);
            }
        }
        keys
    }
}

/// `NAME=value` or bare `NAME` (value `1`); `None` if NAME is not an identifier
fn parse_define(definition: &str) -> Option<(String, String)> {
    let (key, value) = match definition.split_once('=') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (definition.trim(), "1"),
    };
    is_valid_identifier(key).then(|| (key.to_string(), value.to_string()))
}

/// Split a flags string on whitespace, honoring quotes and backslash escapes
fn tokenize(flags: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = flags.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (_, '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
                in_token = true;
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Assignment;
    use fwcfg_meta::{CatalogBuilder, SettingType};
    use rstest::rstest;

    fn catalog() -> Catalog {
        CatalogBuilder::new()
            .setting("WIFI_IP_ADDRESS", SettingType::Ip, toml::Value::String("0.0.0.0".into()))
            .env("MY_IP", "WIFI_IP_ADDRESS")
            .setting("WIFI_GATEWAY", SettingType::Ip, toml::Value::String("192.168.1.1".into()))
            .env("MY_GW", "WIFI_GATEWAY")
            .build()
            .unwrap()
    }

    #[rstest]
    #[case("-DMY_IP=192.168.1.99", vec!["-DMY_IP=192.168.1.99"])]
    #[case("  -Os   -DA  ", vec!["-Os", "-DA"])]
    #[case(r#"'-DMY_IP="192.168.1.99"'"#, vec![r#"-DMY_IP="192.168.1.99""#])]
    #[case(r#"-DMY_IP=\"10.0.0.2\""#, vec![r#"-DMY_IP="10.0.0.2""#])]
    #[case(r#"-DNAME="two words""#, vec!["-DNAME=two words"])]
    fn tokenizes_flags(#[case] flags: &str, #[case] expected: Vec<&str>) {
        assert_eq!(tokenize(flags), expected);
    }

    #[test]
    fn build_flags_define_forms() {
        let mut input = EnvironmentInput::new();
        input.extend_build_flags(r#"-Wall -D MY_GW=192.168.1.254 '-DMY_IP="10.0.0.5"' -DUSE_X"#);
        assert_eq!(input.get("MY_GW"), Some("192.168.1.254"));
        assert_eq!(input.get("MY_IP"), Some("\"10.0.0.5\""));
        assert_eq!(input.get("USE_X"), Some("1"));
        assert_eq!(input.len(), 3);
    }

    #[test]
    fn invalid_defines_are_rejected() {
        let mut input = EnvironmentInput::new();
        assert!(!input.define("=5"));
        assert!(!input.define("MY-IP=1"));
        assert!(input.define("MY_IP=10.0.0.1"));
    }

    #[test]
    fn only_allow_listed_keys_reach_the_layer() {
        let mut input = EnvironmentInput::new();
        input.insert("PATH", "/usr/bin", InputOrigin::Process);
        input.insert("MY_IP", "\"10.0.0.9\"", InputOrigin::Process);
        input.insert("WIFI_GATEWAY", "10.0.0.1", InputOrigin::Process);

        let layer = input.to_layer(&catalog());
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.entries()[0].setting, "WIFI_IP_ADDRESS");
        assert_eq!(
            layer.entries()[0].assignment,
            Assignment::Set(RawValue::Text("10.0.0.9".into()))
        );
    }

    #[test]
    fn unlisted_keys_only_reported_for_command_line() {
        let mut input = EnvironmentInput::new();
        input.insert("USE_BERRY", "1", InputOrigin::Process);
        input.extend_build_flags("-DUSE_RULES -DMY_IP=10.0.0.2");
        input.define("MY_IPP=10.0.0.3");
        input.define("MY_IPP=10.0.0.4");
        input.define("MY_GW=10.0.0.254");

        assert_eq!(input.unlisted_defines(&catalog()), vec!["MY_IPP"]);
        assert_eq!(input.to_layer(&catalog()).len(), 2);
    }

    #[test]
    fn command_line_outranks_build_flags_and_process() {
        let mut input = EnvironmentInput::new();
        input.define("MY_IP=10.0.0.3");
        input.extend_build_flags("-DMY_IP=10.0.0.2");
        input.insert("MY_IP", "10.0.0.1", InputOrigin::Process);

        let layer = input.to_layer(&catalog());
        let last = layer.entries_for("WIFI_IP_ADDRESS").last().unwrap();
        assert_eq!(last.assignment, Assignment::Set(RawValue::Text("10.0.0.3".into())));
    }
}
