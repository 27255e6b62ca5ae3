//! Advisory checks on the override layer
//!
//! Checks for:
//! - Value settings `#define`d without a preceding `#undef`
//! - Flash-held settings changed while the holder keeps its default
//! - Overrides that restate the default

use fwcfg_meta::Catalog;
use std::collections::HashMap;
use tracing::warn;

use crate::report::{Diagnostic, DiagnosticCode};
use crate::resolver::ResolvedConfiguration;
use crate::source::{Assignment, LayerSyntax, Source, SourceLayer};

/// Lint the override layer against a successful resolution
pub fn lint(
    catalog: &Catalog,
    overrides: &SourceLayer,
    config: &ResolvedConfiguration,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if overrides.syntax() == LayerSyntax::Directive {
        diagnostics.extend(redefinitions(catalog, overrides));
    }
    diagnostics.extend(flash_held(catalog, config));
    diagnostics.extend(redundant(overrides, config));

    for d in &diagnostics {
        warn!(code = %d.code, setting = d.setting.as_deref(), "{}", d.message);
    }
    diagnostics
}

fn redefinitions(catalog: &Catalog, overrides: &SourceLayer) -> Vec<Diagnostic> {
    let mut previous: HashMap<&str, &Assignment> = HashMap::new();
    let mut diagnostics = Vec::new();

    for entry in overrides.entries() {
        let is_value_setting = catalog
            .setting(&entry.setting)
            .is_some_and(|s| !s.is_flag());

        if is_value_setting
            && matches!(entry.assignment, Assignment::Set(_))
            && !matches!(previous.get(entry.setting.as_str()), Some(Assignment::Undefine))
        {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::RedefinedWithoutUndef,
                    format!(
                        "'{}' is redefined without a preceding #undef; expect a macro redefinition warning",
                        entry.setting
                    ),
                )
                .for_setting(&entry.setting)
                .at_line(entry.line),
            );
        }
        previous.insert(&entry.setting, &entry.assignment);
    }
    diagnostics
}

fn flash_held(catalog: &Catalog, config: &ResolvedConfiguration) -> Option<Diagnostic> {
    let holder = catalog.holder()?;
    if config.get(holder).is_none_or(|h| h.is_changed()) {
        return None;
    }

    let changed: Vec<&str> = catalog
        .settings()
        .iter()
        .filter(|s| s.flash)
        .filter_map(|s| config.get(&s.id))
        .filter(|r| r.is_changed())
        .map(|r| r.id.as_str())
        .collect();

    if changed.is_empty() {
        return None;
    }

    Some(
        Diagnostic::new(
            DiagnosticCode::FlashHeldUnchanged,
            format!(
                "{} changed but '{}' keeps its default; devices keep their stored values",
                changed.join(", "),
                holder
            ),
        )
        .for_setting(holder),
    )
}

fn redundant(overrides: &SourceLayer, config: &ResolvedConfiguration) -> Vec<Diagnostic> {
    config
        .iter()
        .filter(|r| r.source == Source::Override && !r.is_changed())
        .map(|r| {
            let line = overrides
                .entries_for(&r.id)
                .filter_map(|e| e.line)
                .last();
            Diagnostic::new(
                DiagnosticCode::RedundantOverride,
                format!("'{}' is overridden with its default value {}", r.id, r.value),
            )
            .for_setting(&r.id)
            .at_line(line)
        })
        .collect()
}
