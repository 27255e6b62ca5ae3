//! Exclusion group schema
//!
//! At most one member of an exclusion group may be enabled. Members are
//! either listed explicitly or tagged on the setting with `group = "..."`.

use serde::{Deserialize, Serialize};

/// An exclusion group as written in the catalog file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroupDefinition {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Explicit members, in addition to settings tagged with this group
    #[serde(default)]
    pub members: Vec<String>,
}

/// A validated exclusion group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExclusionGroup {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Members in catalog declaration order
    pub members: Vec<String>,
}

impl ExclusionGroup {
    pub fn contains(&self, setting: &str) -> bool {
        self.members.iter().any(|m| m == setting)
    }
}
