//! Fatal configuration violations and the validation outcome

use fwcfg_meta::{FlagState, SettingType};
use serde::Serialize;
use std::fmt;

use crate::source::Source;

/// A problem that must stop the build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A source referenced an identifier the catalog does not declare
    UnknownSetting { setting: String, source: Source },

    /// A supplied value does not fit the setting's declared type
    MalformedValue {
        setting: String,
        source: Source,
        expected: SettingType,
        reason: String,
    },

    /// More than one member of an exclusion group is enabled
    ConflictingFeatures { group: String, members: Vec<String> },

    /// A triggered dependency rule is not satisfied
    MissingDependency {
        setting: String,
        trigger: FlagState,
        requires: String,
        required_state: FlagState,
    },
}

impl Violation {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownSetting { .. } => "unknown_setting",
            Self::MalformedValue { .. } => "malformed_value",
            Self::ConflictingFeatures { .. } => "conflicting_features",
            Self::MissingDependency { .. } => "missing_dependency",
        }
    }

    /// Whether this violation names `setting`
    pub fn involves(&self, setting: &str) -> bool {
        match self {
            Self::UnknownSetting { setting: s, .. } | Self::MalformedValue { setting: s, .. } => {
                s == setting
            }
            Self::ConflictingFeatures { members, .. } => members.iter().any(|m| m == setting),
            Self::MissingDependency {
                setting: s,
                requires,
                ..
            } => s == setting || requires == setting,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSetting { setting, source } => {
                write!(f, "unknown setting '{}' supplied by {}", setting, source)
            }
            Self::MalformedValue {
                setting,
                source,
                expected,
                reason,
            } => write!(
                f,
                "malformed {} value for '{}' from {}: {}",
                expected, setting, source, reason
            ),
            Self::ConflictingFeatures { group, members } => write!(
                f,
                "group '{}' allows one enabled member, found {}: {}",
                group,
                members.len(),
                members.join(", ")
            ),
            Self::MissingDependency {
                setting,
                trigger,
                requires,
                required_state,
            } => write!(
                f,
                "'{}' is {} and requires '{}' to be {}",
                setting, trigger, requires, required_state
            ),
        }
    }
}

/// Outcome of constraint checking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "violations", rename_all = "lowercase")]
pub enum Validation {
    Valid,
    /// Never empty
    Invalid(Vec<Violation>),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Valid => &[],
            Self::Invalid(violations) => violations,
        }
    }

    pub fn into_violations(self) -> Vec<Violation> {
        match self {
            Self::Valid => Vec::new(),
            Self::Invalid(violations) => violations,
        }
    }
}

impl From<Vec<Violation>> for Validation {
    fn from(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicting_features_display() {
        let v = Violation::ConflictingFeatures {
            group: "display-driver".into(),
            members: vec!["USE_DISPLAY_LCD".into(), "USE_DISPLAY_ST7789".into()],
        };
        assert_eq!(
            v.to_string(),
            "group 'display-driver' allows one enabled member, found 2: USE_DISPLAY_LCD, USE_DISPLAY_ST7789"
        );
        assert!(v.involves("USE_DISPLAY_LCD"));
        assert!(!v.involves("USE_SPI"));
    }

    #[test]
    fn missing_dependency_display() {
        let v = Violation::MissingDependency {
            setting: "USE_LVGL".into(),
            trigger: FlagState::Enabled,
            requires: "USE_BERRY".into(),
            required_state: FlagState::Enabled,
        };
        assert_eq!(
            v.to_string(),
            "'USE_LVGL' is enabled and requires 'USE_BERRY' to be enabled"
        );
        assert_eq!(v.code(), "missing_dependency");
    }

    #[test]
    fn empty_violation_list_is_valid() {
        assert!(Validation::from(Vec::new()).is_valid());
        let invalid = Validation::from(vec![Violation::UnknownSetting {
            setting: "Z".into(),
            source: Source::Environment,
        }]);
        assert!(!invalid.is_valid());
        assert_eq!(invalid.violations().len(), 1);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let v = Violation::UnknownSetting {
            setting: "Z".into(),
            source: Source::Environment,
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "unknown_setting");
        assert_eq!(json["source"], "environment");
    }
}
