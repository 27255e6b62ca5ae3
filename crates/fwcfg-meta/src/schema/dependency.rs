//! Dependency rule schema
//!
//! # Example TOML
//!
//! ```toml
//! [[dependency]]
//! setting = "USE_PCF85063"
//! requires = "USE_RTC_CHIPS"
//!
//! [[dependency]]
//! setting = "USE_DISPLAY_LVGL_ONLY"
//! requires = "USE_DISPLAY_MODES1TO5"
//! state = "disabled"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enabled/disabled state of a flag, used on both sides of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagState {
    #[default]
    Enabled,
    Disabled,
}

impl FlagState {
    pub fn matches(self, enabled: bool) -> bool {
        match self {
            Self::Enabled => enabled,
            Self::Disabled => !enabled,
        }
    }
}

impl fmt::Display for FlagState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// A dependency rule as written in the catalog file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyDefinition {
    /// Antecedent flag
    pub setting: String,
    /// Consequent flag
    pub requires: String,
    /// State of the antecedent that triggers the rule
    #[serde(default)]
    pub when: FlagState,
    /// State the consequent must be in once triggered
    #[serde(default)]
    pub state: FlagState,
}

/// A validated dependency rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRule {
    pub setting: String,
    pub requires: String,
    pub when: FlagState,
    pub state: FlagState,
}

impl DependencyRule {
    /// Whether the rule holds for the given antecedent/consequent states
    pub fn is_satisfied(&self, antecedent: bool, consequent: bool) -> bool {
        !self.when.matches(antecedent) || self.state.matches(consequent)
    }
}

impl fmt::Display for DependencyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} requires {} {}",
            self.setting, self.when, self.requires, self.state
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_enabled_requires_enabled() {
        let def: DependencyDefinition =
            toml::from_str("setting = \"A\"\nrequires = \"B\"\n").unwrap();
        assert_eq!(def.when, FlagState::Enabled);
        assert_eq!(def.state, FlagState::Enabled);
    }

    #[test]
    fn untriggered_rule_always_holds() {
        let rule = DependencyRule {
            setting: "A".into(),
            requires: "B".into(),
            when: FlagState::Enabled,
            state: FlagState::Enabled,
        };
        assert!(rule.is_satisfied(false, false));
        assert!(rule.is_satisfied(false, true));
        assert!(rule.is_satisfied(true, true));
        assert!(!rule.is_satisfied(true, false));
    }

    #[test]
    fn requires_disabled() {
        let rule = DependencyRule {
            setting: "A".into(),
            requires: "B".into(),
            when: FlagState::Enabled,
            state: FlagState::Disabled,
        };
        assert!(rule.is_satisfied(true, false));
        assert!(!rule.is_satisfied(true, true));
    }
}
