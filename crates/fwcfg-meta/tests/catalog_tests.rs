//! Tests for catalog parsing, validation and loading

use fwcfg_meta::schema::FlagState;
use fwcfg_meta::{Catalog, CatalogProblem, Error, SettingType, Value, load_catalog};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::PathBuf;

fn sample_catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/projects/sample/defaults.toml")
}

fn problems(err: Error) -> Vec<CatalogProblem> {
    match err {
        Error::InvalidCatalog { problems } => problems,
        other => panic!("expected InvalidCatalog, got: {other}"),
    }
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_minimal_catalog() {
    let catalog = Catalog::parse(
        r#"
[[setting]]
id = "USE_SPI"
type = "bool"
default = false
"#,
    )
    .unwrap();

    assert_eq!(catalog.len(), 1);
    let setting = catalog.setting("USE_SPI").unwrap();
    assert_eq!(setting.setting_type, SettingType::Bool);
    assert_eq!(setting.default, Value::Bool(false));
    assert!(setting.group.is_none());
    assert!(!setting.flash);
}

#[test]
fn test_parse_empty_catalog() {
    let catalog = Catalog::parse("").unwrap();
    assert!(catalog.is_empty());
    assert!(catalog.groups().is_empty());
    assert!(catalog.dependencies().is_empty());
    assert_eq!(catalog.holder(), None);
}

#[test]
fn test_parse_dependency_with_states() {
    let catalog = Catalog::parse(
        r#"
[[setting]]
id = "USE_DISPLAY_LVGL_ONLY"
type = "bool"
default = false

[[setting]]
id = "USE_DISPLAY_MODES1TO5"
type = "bool"
default = true

[[dependency]]
setting = "USE_DISPLAY_LVGL_ONLY"
requires = "USE_DISPLAY_MODES1TO5"
state = "disabled"
"#,
    )
    .unwrap();

    let rule = &catalog.dependencies()[0];
    assert_eq!(rule.when, FlagState::Enabled);
    assert_eq!(rule.state, FlagState::Disabled);
}

#[test]
fn test_unknown_type_is_parse_error() {
    let err = Catalog::parse(
        r#"
[[setting]]
id = "X"
type = "float"
default = 1.5
"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::TomlDe(_)));
}

#[rstest]
#[case::group_key("[[group]]\nid = \"display\"\nmembrs = [\"A\"]\n", "membrs")]
#[case::dependency_key("[[dependency]]\nsetting = \"A\"\nrequire = \"B\"\n", "require")]
#[case::top_level_table("[holdr]\nsetting = \"A\"\n", "holdr")]
fn test_misspelled_key_is_parse_error(#[case] text: &str, #[case] key: &str) {
    let err = Catalog::parse(text).unwrap_err();
    assert!(matches!(err, Error::TomlDe(_)), "unexpected error: {err}");
    assert!(err.to_string().contains(key), "error does not name '{key}': {err}");
}

#[test]
fn test_misspelled_group_tag_does_not_drop_member() {
    let err = Catalog::parse(
        r#"
[[setting]]
id = "A"
type = "bool"
default = false
grop = "display"

[[setting]]
id = "B"
type = "bool"
default = false
group = "display"
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown field `grop`"));
}

// ============================================================================
// Validation
// ============================================================================

#[rstest]
#[case("bool", "\"yes please\"")]
#[case("integer", "\"many\"")]
#[case("ip", "\"256.0.0.1\"")]
#[case("string", "true")]
fn test_default_must_match_type(#[case] ty: &str, #[case] default: &str) {
    let content = format!("[[setting]]\nid = \"S\"\ntype = \"{ty}\"\ndefault = {default}\n");
    let problems = problems(Catalog::parse(&content).unwrap_err());

    assert_eq!(problems.len(), 1);
    assert!(matches!(&problems[0], CatalogProblem::InvalidDefault { id, .. } if id == "S"));
}

#[test]
fn test_all_problems_reported_together() {
    let problems = problems(
        Catalog::parse(
            r#"
[[setting]]
id = "USE-SPI"
type = "bool"
default = false

[[setting]]
id = "A"
type = "bool"
default = false

[[setting]]
id = "A"
type = "bool"
default = true

[[dependency]]
setting = "A"
requires = "MISSING"
"#,
        )
        .unwrap_err(),
    );

    assert_eq!(
        problems,
        vec![
            CatalogProblem::InvalidIdentifier {
                id: "USE-SPI".into()
            },
            CatalogProblem::DuplicateSetting { id: "A".into() },
            CatalogProblem::UnknownSetting {
                id: "MISSING".into(),
                context: "dependency rule on 'A'".into()
            },
        ]
    );
}

#[test]
fn test_duplicate_env_key() {
    let problems = problems(
        Catalog::parse(
            r#"
[[setting]]
id = "WIFI_DNS"
type = "ip"
default = "0.0.0.0"
env = "MY_DNS"

[[setting]]
id = "WIFI_DNS2"
type = "ip"
default = "0.0.0.0"
env = "MY_DNS"
"#,
        )
        .unwrap_err(),
    );

    assert_eq!(
        problems,
        vec![CatalogProblem::DuplicateEnvKey {
            key: "MY_DNS".into(),
            first: "WIFI_DNS".into(),
            second: "WIFI_DNS2".into(),
        }]
    );
}

#[test]
fn test_self_dependency_rejected() {
    let problems = problems(
        Catalog::parse(
            r#"
[[setting]]
id = "A"
type = "bool"
default = false

[[dependency]]
setting = "A"
requires = "A"
"#,
        )
        .unwrap_err(),
    );
    assert_eq!(problems, vec![CatalogProblem::SelfDependency { id: "A".into() }]);
}

#[test]
fn test_tagged_string_setting_cannot_join_group() {
    let problems = problems(
        Catalog::parse(
            r#"
[[setting]]
id = "MQTT_HOST"
type = "string"
default = ""
group = "display-driver"
"#,
        )
        .unwrap_err(),
    );
    assert!(matches!(
        &problems[0],
        CatalogProblem::NonBooleanSetting { id, found: SettingType::String, .. } if id == "MQTT_HOST"
    ));
}

// ============================================================================
// Sample fixture
// ============================================================================

#[test]
fn test_load_sample_catalog() {
    let catalog = load_catalog(&sample_catalog_path()).unwrap();

    assert_eq!(catalog.holder(), Some("CFG_HOLDER"));
    assert_eq!(catalog.env_binding("MY_IP"), Some("WIFI_IP_ADDRESS"));
    assert_eq!(catalog.env_binding("MY_DNS2"), Some("WIFI_DNS2"));

    let groups: Vec<&str> = catalog.groups().iter().map(|g| g.id.as_str()).collect();
    assert_eq!(groups, vec!["display-driver", "rtc-driver"]);

    let rtc = catalog.group("rtc-driver").unwrap();
    assert_eq!(rtc.members, vec!["USE_DS3231", "USE_BM8563", "USE_PCF85063"]);
    assert_eq!(rtc.description.as_deref(), Some("Select only one RTC chip"));

    assert!(catalog.setting("MQTT_PORT").unwrap().flash);
    assert_eq!(
        catalog.setting("MQTT_PORT").unwrap().default,
        Value::Integer(1883)
    );
}

#[test]
fn test_sample_settings_keep_declaration_order() {
    let catalog = load_catalog(&sample_catalog_path()).unwrap();
    assert_eq!(catalog.settings()[0].id, "CFG_HOLDER");
    assert_eq!(catalog.index_of("CFG_HOLDER"), Some(0));
    assert_eq!(catalog.index_of("STA_SSID1"), Some(1));
}
