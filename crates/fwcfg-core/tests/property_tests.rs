use fwcfg_core::{ConfigResolver, Source, SourceLayer};
use fwcfg_meta::{Catalog, CatalogBuilder, RawValue, SettingType, Value};
use proptest::prelude::*;

const SETTINGS: [&str; 6] = [
    "USE_SPI",
    "USE_RULES",
    "USE_BERRY",
    "CFG_HOLDER",
    "MQTT_PORT",
    "USE_BUZZER",
];

fn catalog() -> Catalog {
    CatalogBuilder::new()
        .flag("USE_SPI", false)
        .flag("USE_RULES", true)
        .flag("USE_BERRY", false)
        .setting("CFG_HOLDER", SettingType::Integer, toml::Value::Integer(4617))
        .setting("MQTT_PORT", SettingType::Integer, toml::Value::Integer(1883))
        .flag("USE_BUZZER", false)
        .build()
        .unwrap()
}

/// (setting index, value) pairs valid for every setting type
fn entries() -> impl Strategy<Value = Vec<(usize, i64)>> {
    prop::collection::vec((0..SETTINGS.len(), 0i64..=1), 0..12)
}

fn layer(source: Source, entries: &[(usize, i64)]) -> SourceLayer {
    entries.iter().fold(SourceLayer::new(source), |layer, (i, v)| {
        layer.set(SETTINGS[*i], RawValue::Integer(*v))
    })
}

fn expected_value(catalog: &Catalog, id: &str, v: i64) -> Value {
    match catalog.setting(id).map(|s| s.setting_type) {
        Some(SettingType::Bool) => Value::Bool(v == 1),
        _ => Value::Integer(v),
    }
}

proptest! {
    #[test]
    fn test_highest_source_wins(overrides in entries(), environment in entries()) {
        let catalog = catalog();
        let config = ConfigResolver::new(catalog.clone())
            .with_overrides(layer(Source::Override, &overrides))
            .with_environment(layer(Source::Environment, &environment))
            .resolve()
            .unwrap();

        // Every declared setting resolves exactly once
        prop_assert_eq!(config.len(), SETTINGS.len());

        for (i, id) in SETTINGS.iter().enumerate() {
            let last_env = environment.iter().rev().find(|(j, _)| *j == i);
            let last_override = overrides.iter().rev().find(|(j, _)| *j == i);
            let resolved = config.get(id).unwrap();

            match (last_env, last_override) {
                (Some((_, v)), _) => {
                    prop_assert_eq!(resolved.source, Source::Environment);
                    prop_assert_eq!(&resolved.value, &expected_value(&catalog, id, *v));
                }
                (None, Some((_, v))) => {
                    prop_assert_eq!(resolved.source, Source::Override);
                    prop_assert_eq!(&resolved.value, &expected_value(&catalog, id, *v));
                }
                (None, None) => {
                    prop_assert_eq!(resolved.source, Source::Default);
                    prop_assert_eq!(&resolved.value, &resolved.default);
                }
            }
        }
    }

    #[test]
    fn test_resolution_is_deterministic(overrides in entries(), environment in entries()) {
        let resolver = ConfigResolver::new(catalog())
            .with_overrides(layer(Source::Override, &overrides))
            .with_environment(layer(Source::Environment, &environment));

        let first = resolver.resolve().unwrap();
        let second = resolver.resolve().unwrap();
        prop_assert_eq!(first.fingerprint(), second.fingerprint());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_validation_never_changes_values(overrides in entries()) {
        let resolver = ConfigResolver::new(catalog())
            .with_overrides(layer(Source::Override, &overrides));
        let before = resolver.resolve().unwrap();
        let _ = resolver.validate();
        prop_assert_eq!(before, resolver.resolve().unwrap());
    }
}
