//! Mutual-exclusion and dependency constraint checker
//!
//! Runs against a finished [`ResolvedConfiguration`] and never changes it.
//! Group violations come first in group declaration order, then dependency
//! violations in rule declaration order.

use fwcfg_meta::{Catalog, DependencyRule, ExclusionGroup};
use tracing::debug;

use crate::resolver::ResolvedConfiguration;
use crate::violation::{Validation, Violation};

/// Check every exclusion group and dependency rule of `catalog`
pub fn check(catalog: &Catalog, config: &ResolvedConfiguration) -> Validation {
    let mut violations: Vec<Violation> = catalog
        .groups()
        .iter()
        .filter_map(|group| check_group(group, config))
        .collect();

    violations.extend(
        catalog
            .dependencies()
            .iter()
            .filter_map(|rule| check_dependency(rule, config)),
    );

    debug!(violations = violations.len(), "Constraint check complete");
    Validation::from(violations)
}

/// At most one member enabled; members are reported in catalog order
pub fn check_group(group: &ExclusionGroup, config: &ResolvedConfiguration) -> Option<Violation> {
    let enabled: Vec<String> = group
        .members
        .iter()
        .filter(|m| config.is_enabled(m))
        .cloned()
        .collect();

    (enabled.len() > 1).then(|| Violation::ConflictingFeatures {
        group: group.id.clone(),
        members: enabled,
    })
}

pub fn check_dependency(
    rule: &DependencyRule,
    config: &ResolvedConfiguration,
) -> Option<Violation> {
    let antecedent = config.is_enabled(&rule.setting);
    let consequent = config.is_enabled(&rule.requires);

    (!rule.is_satisfied(antecedent, consequent)).then(|| Violation::MissingDependency {
        setting: rule.setting.clone(),
        trigger: rule.when,
        requires: rule.requires.clone(),
        required_state: rule.state,
    })
}
