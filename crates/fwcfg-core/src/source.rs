//! Configuration sources and the layers they contribute
//!
//! A [`SourceLayer`] is an ordered list of assignments from one [`Source`].
//! Within a layer, order matters only per identifier: the last assignment to
//! an identifier is the one that counts. Across layers, precedence is fixed
//! by [`Source`] ordering and independent of file order.

use fwcfg_meta::RawValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin of a value, in ascending precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Compiled-in catalog default
    Default,
    /// Integrator's overlay
    Override,
    /// Allow-listed build-time input
    Environment,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Override => write!(f, "override"),
            Self::Environment => write!(f, "environment"),
        }
    }
}

/// What a layer entry does to its setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "action", content = "value")]
pub enum Assignment {
    /// `#define NAME value` or `NAME = value`
    Set(RawValue),
    /// `#undef NAME`
    Undefine,
}

/// Conditional guard on an entry (`#ifdef NAME` / `#ifndef NAME`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Guard {
    pub name: String,
    /// `true` for `#ifdef`, `false` for `#ifndef`
    pub defined: bool,
    pub line: usize,
}

impl Guard {
    pub fn holds(&self, is_defined: bool) -> bool {
        self.defined == is_defined
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let directive = if self.defined { "#ifdef" } else { "#ifndef" };
        write!(f, "{} {} (line {})", directive, self.name, self.line)
    }
}

/// One assignment in a layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerEntry {
    pub setting: String,
    pub assignment: Assignment,
    /// Source line, when the layer came from a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Enclosing guards, outermost first; all must hold for the entry to apply
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<Guard>,
}

impl LayerEntry {
    pub fn set(setting: impl Into<String>, value: RawValue) -> Self {
        Self {
            setting: setting.into(),
            assignment: Assignment::Set(value),
            line: None,
            guards: Vec::new(),
        }
    }

    pub fn undefine(setting: impl Into<String>) -> Self {
        Self {
            setting: setting.into(),
            assignment: Assignment::Undefine,
            line: None,
            guards: Vec::new(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn guarded_by(mut self, guards: Vec<Guard>) -> Self {
        self.guards = guards;
        self
    }
}

/// How a layer was written, which decides which lint checks apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerSyntax {
    /// Built in code
    #[default]
    Programmatic,
    /// `#define` / `#undef` overlay text
    Directive,
    /// `[overrides]` TOML table
    Table,
    /// Environment key/value inputs
    KeyValue,
}

/// Ordered assignments contributed by one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLayer {
    source: Source,
    syntax: LayerSyntax,
    /// File or variable the layer came from
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<String>,
    entries: Vec<LayerEntry>,
}

impl SourceLayer {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            syntax: LayerSyntax::Programmatic,
            origin: None,
            entries: Vec::new(),
        }
    }

    /// Empty Override layer
    pub fn overrides() -> Self {
        Self::new(Source::Override)
    }

    /// Empty Environment layer
    pub fn environment() -> Self {
        Self::new(Source::Environment)
    }

    pub fn with_syntax(mut self, syntax: LayerSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Append an assignment of `value` to `setting`
    pub fn set(mut self, setting: &str, value: RawValue) -> Self {
        self.push(LayerEntry::set(setting, value));
        self
    }

    /// Append an `#undef` of `setting`
    pub fn undefine(mut self, setting: &str) -> Self {
        self.push(LayerEntry::undefine(setting));
        self
    }

    pub fn push(&mut self, entry: LayerEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn retag(&mut self, source: Source) {
        self.source = source;
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn syntax(&self) -> LayerSyntax {
        self.syntax
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn entries(&self) -> &[LayerEntry] {
        &self.entries
    }

    /// Entries targeting one setting, in order
    pub fn entries_for<'a>(&'a self, setting: &'a str) -> impl Iterator<Item = &'a LayerEntry> {
        self.entries.iter().filter(move |e| e.setting == setting)
    }

    /// Whether any entry targets `setting`
    pub fn mentions(&self, setting: &str) -> bool {
        self.entries.iter().any(|e| e.setting == setting)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_order_by_precedence() {
        assert!(Source::Default < Source::Override);
        assert!(Source::Override < Source::Environment);
    }

    #[test]
    fn entries_for_keeps_order() {
        let layer = SourceLayer::overrides()
            .undefine("CFG_HOLDER")
            .set("USE_SPI", RawValue::Bool(true))
            .set("CFG_HOLDER", RawValue::Text("4618".into()));

        let entries: Vec<_> = layer.entries_for("CFG_HOLDER").collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].assignment, Assignment::Undefine);
        assert_eq!(
            entries[1].assignment,
            Assignment::Set(RawValue::Text("4618".into()))
        );
    }

    #[test]
    fn guard_display() {
        let guard = Guard {
            name: "USE_VEML6070".into(),
            defined: true,
            line: 12,
        };
        assert_eq!(guard.to_string(), "#ifdef USE_VEML6070 (line 12)");
        assert!(guard.holds(true));
        assert!(!guard.holds(false));
    }
}
