//! The validated defaults catalog
//!
//! [`Catalog`] is the Default source of every resolution: it declares each
//! setting with its compiled-in value, the exclusion groups and dependency
//! rules between flags, and which external keys may supply values at build
//! time. A catalog is validated as a whole and every problem is reported at
//! once.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::schema::{
    CatalogFile, DependencyDefinition, DependencyRule, ExclusionGroup, FlagState,
    GroupDefinition, HolderSection, Setting, SettingDefinition,
};
use crate::validation::is_valid_identifier;
use crate::value::{RawValue, SettingType, ValueError};
use crate::{Error, Result};

/// A problem found while validating a catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogProblem {
    #[error("setting '{id}' is declared more than once")]
    DuplicateSetting { id: String },

    #[error("'{id}' is not a valid identifier")]
    InvalidIdentifier { id: String },

    #[error("default for '{id}' is invalid: {reason}")]
    InvalidDefault { id: String, reason: ValueError },

    #[error("{context} references unknown setting '{id}'")]
    UnknownSetting { id: String, context: String },

    #[error("{context} requires a bool setting but '{id}' is {found}")]
    NonBooleanSetting {
        id: String,
        found: SettingType,
        context: String,
    },

    #[error("environment key '{key}' is bound to both '{first}' and '{second}'")]
    DuplicateEnvKey {
        key: String,
        first: String,
        second: String,
    },

    #[error("group '{id}' is declared more than once")]
    DuplicateGroup { id: String },

    #[error("dependency rule on '{id}' refers to itself")]
    SelfDependency { id: String },
}

/// Validated catalog of settings, groups and dependency rules
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    settings: Vec<Setting>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    groups: Vec<ExclusionGroup>,
    dependencies: Vec<DependencyRule>,
    /// Environment key -> setting id
    environment: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    holder: Option<String>,
}

impl Catalog {
    /// Parse and validate a catalog from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    /// Validate a deserialized catalog file
    pub fn from_file(file: CatalogFile) -> Result<Self> {
        let mut problems = Vec::new();
        let mut settings: Vec<Setting> = Vec::with_capacity(file.settings.len());
        let mut index = HashMap::new();

        for def in file.settings {
            if !is_valid_identifier(&def.id) {
                problems.push(CatalogProblem::InvalidIdentifier { id: def.id.clone() });
                continue;
            }
            if index.contains_key(&def.id) {
                problems.push(CatalogProblem::DuplicateSetting { id: def.id.clone() });
                continue;
            }
            let default = RawValue::from_toml(&def.default)
                .and_then(|raw| def.setting_type.coerce(&raw));
            let default = match default {
                Ok(v) => v,
                Err(reason) => {
                    problems.push(CatalogProblem::InvalidDefault {
                        id: def.id.clone(),
                        reason,
                    });
                    continue;
                }
            };
            index.insert(def.id.clone(), settings.len());
            settings.push(Setting {
                id: def.id,
                setting_type: def.setting_type,
                default,
                group: def.group,
                description: def.description,
                env: def.env,
                flash: def.flash,
            });
        }

        let lookup = |id: &str, context: String, problems: &mut Vec<CatalogProblem>| -> bool {
            match index.get(id).map(|&i| &settings[i]) {
                None => {
                    problems.push(CatalogProblem::UnknownSetting {
                        id: id.to_string(),
                        context,
                    });
                    false
                }
                Some(s) if !s.is_flag() => {
                    problems.push(CatalogProblem::NonBooleanSetting {
                        id: id.to_string(),
                        found: s.setting_type,
                        context,
                    });
                    false
                }
                Some(_) => true,
            }
        };

        let groups = build_groups(&file.groups, &settings, &mut problems, &lookup);

        let mut dependencies = Vec::with_capacity(file.dependencies.len());
        for def in file.dependencies {
            let context = format!("dependency rule on '{}'", def.setting);
            let ok_setting = lookup(&def.setting, context.clone(), &mut problems);
            let ok_requires = lookup(&def.requires, context, &mut problems);
            if def.setting == def.requires {
                problems.push(CatalogProblem::SelfDependency { id: def.setting });
                continue;
            }
            if ok_setting && ok_requires {
                dependencies.push(DependencyRule {
                    setting: def.setting,
                    requires: def.requires,
                    when: def.when,
                    state: def.state,
                });
            }
        }

        let mut environment: BTreeMap<String, String> = BTreeMap::new();
        for setting in &settings {
            let Some(key) = &setting.env else { continue };
            if !is_valid_identifier(key) {
                problems.push(CatalogProblem::InvalidIdentifier { id: key.clone() });
                continue;
            }
            if let Some(first) = environment.get(key) {
                problems.push(CatalogProblem::DuplicateEnvKey {
                    key: key.clone(),
                    first: first.clone(),
                    second: setting.id.clone(),
                });
                continue;
            }
            environment.insert(key.clone(), setting.id.clone());
        }

        let holder = match file.holder {
            Some(HolderSection { setting }) if !index.contains_key(&setting) => {
                problems.push(CatalogProblem::UnknownSetting {
                    id: setting,
                    context: "holder".to_string(),
                });
                None
            }
            Some(HolderSection { setting }) => Some(setting),
            None => None,
        };

        if !problems.is_empty() {
            return Err(Error::InvalidCatalog { problems });
        }

        tracing::debug!(
            settings = settings.len(),
            groups = groups.len(),
            dependencies = dependencies.len(),
            "Catalog validated"
        );

        Ok(Self {
            settings,
            index,
            groups,
            dependencies,
            environment,
            holder,
        })
    }

    /// All settings in declaration order
    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    pub fn setting(&self, id: &str) -> Option<&Setting> {
        self.index.get(id).map(|&i| &self.settings[i])
    }

    /// Position of a setting in declaration order
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Exclusion groups in declaration order
    pub fn groups(&self) -> &[ExclusionGroup] {
        &self.groups
    }

    pub fn group(&self, id: &str) -> Option<&ExclusionGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn dependencies(&self) -> &[DependencyRule] {
        &self.dependencies
    }

    /// Setting allow-listed for the given environment key
    pub fn env_binding(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str)
    }

    /// All allow-listed environment keys and the settings they supply
    pub fn env_bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.environment
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The holder setting gating flash-held settings, if declared
    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }
}

fn build_groups(
    definitions: &[GroupDefinition],
    settings: &[Setting],
    problems: &mut Vec<CatalogProblem>,
    lookup: &dyn Fn(&str, String, &mut Vec<CatalogProblem>) -> bool,
) -> Vec<ExclusionGroup> {
    let mut groups: Vec<ExclusionGroup> = Vec::new();
    let mut seen = HashSet::new();

    for def in definitions {
        if !seen.insert(def.id.clone()) {
            problems.push(CatalogProblem::DuplicateGroup { id: def.id.clone() });
            continue;
        }
        let context = format!("group '{}'", def.id);
        let mut members: Vec<String> = Vec::new();
        for member in &def.members {
            if lookup(member, context.clone(), problems) && !members.contains(member) {
                members.push(member.clone());
            }
        }
        groups.push(ExclusionGroup {
            id: def.id.clone(),
            description: def.description.clone(),
            members,
        });
    }

    // Settings tagged with a group join it, creating the group on first sight
    for setting in settings {
        let Some(group_id) = &setting.group else { continue };
        let context = format!("group '{}'", group_id);
        if !lookup(&setting.id, context, problems) {
            continue;
        }
        match groups.iter_mut().find(|g| &g.id == group_id) {
            Some(group) => {
                if !group.contains(&setting.id) {
                    group.members.push(setting.id.clone());
                }
            }
            None => groups.push(ExclusionGroup {
                id: group_id.clone(),
                description: None,
                members: vec![setting.id.clone()],
            }),
        }
    }

    // Keep members in catalog order regardless of how they were listed
    let position = |id: &str| settings.iter().position(|s| s.id == id).unwrap_or(usize::MAX);
    for group in &mut groups {
        group.members.sort_by_key(|m| position(m));
    }

    groups
}

/// Programmatic catalog construction, validated like a parsed file
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    file: CatalogFile,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a boolean flag
    pub fn flag(self, id: &str, default: bool) -> Self {
        self.setting(id, SettingType::Bool, toml::Value::Boolean(default))
    }

    /// Declare a boolean flag tagged with an exclusion group
    pub fn grouped_flag(mut self, id: &str, default: bool, group: &str) -> Self {
        self = self.flag(id, default);
        if let Some(last) = self.file.settings.last_mut() {
            last.group = Some(group.to_string());
        }
        self
    }

    /// Declare a setting of any type
    pub fn setting(mut self, id: &str, setting_type: SettingType, default: toml::Value) -> Self {
        self.file.settings.push(SettingDefinition {
            id: id.to_string(),
            setting_type,
            default,
            group: None,
            description: None,
            env: None,
            flash: false,
        });
        self
    }

    /// Allow-list an environment key for an already declared setting
    pub fn env(mut self, key: &str, setting: &str) -> Self {
        if let Some(def) = self.file.settings.iter_mut().find(|s| s.id == setting) {
            def.env = Some(key.to_string());
        }
        self
    }

    /// Mark an already declared setting as flash-held
    pub fn flash(mut self, setting: &str) -> Self {
        if let Some(def) = self.file.settings.iter_mut().find(|s| s.id == setting) {
            def.flash = true;
        }
        self
    }

    pub fn holder(mut self, setting: &str) -> Self {
        self.file.holder = Some(HolderSection {
            setting: setting.to_string(),
        });
        self
    }

    /// Declare an explicit exclusion group
    pub fn group(mut self, id: &str, members: &[&str]) -> Self {
        self.file.groups.push(GroupDefinition {
            id: id.to_string(),
            description: None,
            members: members.iter().map(|m| m.to_string()).collect(),
        });
        self
    }

    /// `setting` enabled requires `requires` enabled
    pub fn requires(self, setting: &str, requires: &str) -> Self {
        self.dependency(setting, FlagState::Enabled, requires, FlagState::Enabled)
    }

    pub fn dependency(
        mut self,
        setting: &str,
        when: FlagState,
        requires: &str,
        state: FlagState,
    ) -> Self {
        self.file.dependencies.push(DependencyDefinition {
            setting: setting.to_string(),
            requires: requires.to_string(),
            when,
            state,
        });
        self
    }

    pub fn build(self) -> Result<Catalog> {
        Catalog::from_file(self.file)
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} settings, {} exclusion groups, {} dependency rules",
            self.settings.len(),
            self.groups.len(),
            self.dependencies.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn tagged_settings_form_groups_in_catalog_order() {
        let catalog = CatalogBuilder::new()
            .grouped_flag("USE_DISPLAY_ST7789", false, "display-driver")
            .grouped_flag("USE_DISPLAY_SSD1306", true, "display-driver")
            .build()
            .unwrap();

        let group = catalog.group("display-driver").unwrap();
        assert_eq!(group.members, vec!["USE_DISPLAY_ST7789", "USE_DISPLAY_SSD1306"]);
    }

    #[test]
    fn explicit_members_merge_with_tags() {
        let catalog = CatalogBuilder::new()
            .flag("A", false)
            .grouped_flag("B", false, "g")
            .group("g", &["A", "B"])
            .build()
            .unwrap();

        assert_eq!(catalog.groups().len(), 1);
        assert_eq!(catalog.groups()[0].members, vec!["A", "B"]);
    }

    #[test]
    fn duplicate_settings_are_reported() {
        let err = CatalogBuilder::new()
            .flag("A", false)
            .flag("A", true)
            .build()
            .unwrap_err();

        match err {
            Error::InvalidCatalog { problems } => {
                assert_eq!(
                    problems,
                    vec![CatalogProblem::DuplicateSetting { id: "A".into() }]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_boolean_group_member_is_rejected() {
        let err = CatalogBuilder::new()
            .setting("PORT", SettingType::Integer, toml::Value::Integer(1883))
            .group("g", &["PORT"])
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("requires a bool setting"));
    }

    #[test]
    fn env_bindings_are_indexed() {
        let catalog = CatalogBuilder::new()
            .setting(
                "WIFI_IP_ADDRESS",
                SettingType::Ip,
                toml::Value::String("0.0.0.0".into()),
            )
            .env("MY_IP", "WIFI_IP_ADDRESS")
            .build()
            .unwrap();

        assert_eq!(catalog.env_binding("MY_IP"), Some("WIFI_IP_ADDRESS"));
        assert_eq!(catalog.env_binding("MY_GW"), None);
        assert_eq!(
            catalog.env_bindings().collect::<Vec<_>>(),
            vec![("MY_IP", "WIFI_IP_ADDRESS")]
        );
        assert_eq!(
            catalog.setting("WIFI_IP_ADDRESS").unwrap().default,
            Value::Ip(std::net::Ipv4Addr::UNSPECIFIED)
        );
    }

    #[test]
    fn unknown_holder_is_reported() {
        let err = CatalogBuilder::new()
            .flag("A", false)
            .holder("CFG_HOLDER")
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("holder references unknown setting 'CFG_HOLDER'"));
    }
}
