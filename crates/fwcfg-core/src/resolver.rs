//! Override-precedence engine
//!
//! The `ConfigResolver` merges the three configuration sources in ascending
//! precedence: catalog defaults, then the override layer, then the
//! environment layer. Each source unconditionally replaces the candidate
//! value of every setting it defines, so within a layer the last entry for
//! an identifier wins and across layers the highest source wins.
//!
//! Resolution is total: every declared setting ends with exactly one value.
//! Problems found on the way (unknown identifiers, values that do not fit
//! the declared type) are all collected before resolution fails.

use fwcfg_meta::{Catalog, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::constraints;
use crate::explain::{Explanation, Step};
use crate::report::{self, DiagnosticSummary};
use crate::source::{Assignment, Guard, LayerEntry, Source, SourceLayer};
use crate::violation::{Validation, Violation};

/// One setting of a resolved configuration
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResolvedSetting {
    #[serde(skip)]
    pub id: String,
    pub value: Value,
    /// Highest-precedence source that supplied the value
    pub source: Source,
    #[serde(skip)]
    pub default: Value,
}

impl ResolvedSetting {
    /// Whether the final value differs from the compiled-in default
    pub fn is_changed(&self) -> bool {
        self.value != self.default
    }
}

/// The final value and winning source of every declared setting
///
/// Iterates in catalog declaration order. Serializes as a map of
/// `NAME -> { value, source }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    settings: Vec<ResolvedSetting>,
    index: HashMap<String, usize>,
}

impl ResolvedConfiguration {
    pub(crate) fn new(settings: Vec<ResolvedSetting>) -> Self {
        let index = settings
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Self { settings, index }
    }

    pub fn get(&self, id: &str) -> Option<&ResolvedSetting> {
        self.index.get(id).map(|&i| &self.settings[i])
    }

    pub fn value(&self, id: &str) -> Option<&Value> {
        self.get(id).map(|s| &s.value)
    }

    pub fn source(&self, id: &str) -> Option<Source> {
        self.get(id).map(|s| s.source)
    }

    /// Whether `id` is defined for a downstream `#ifdef`; unknown ids are not
    pub fn is_enabled(&self, id: &str) -> bool {
        self.value(id).is_some_and(Value::is_enabled)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedSetting> {
        self.settings.iter()
    }

    /// Settings whose final value differs from the default
    pub fn changed(&self) -> impl Iterator<Item = &ResolvedSetting> {
        self.settings.iter().filter(|s| s.is_changed())
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// SHA-256 over the resolved values, formatted `sha256:<hex>`
    ///
    /// Two builds with the same fingerprint were configured identically;
    /// the winning source does not contribute.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for setting in &self.settings {
            hasher.update(setting.id.as_bytes());
            hasher.update(b"=");
            match setting.value.to_c_literal() {
                Some(literal) => hasher.update(literal.as_bytes()),
                None => hasher.update(if setting.value.is_enabled() { b"1" } else { b"0" }),
            }
            hasher.update(b"\n");
        }
        format!("sha256:{:x}", hasher.finalize())
    }
}

impl Serialize for ResolvedConfiguration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.settings.len()))?;
        for setting in &self.settings {
            map.serialize_entry(&setting.id, setting)?;
        }
        map.end()
    }
}

/// Resolution failed; carries every problem found in the pass
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Configuration could not be resolved: {}", join(.violations))]
pub struct ResolveError {
    violations: Vec<Violation>,
}

impl From<Vec<Violation>> for ResolveError {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl ResolveError {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Merges defaults, overrides and environment into a configuration
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    catalog: Catalog,
    overrides: SourceLayer,
    environment: SourceLayer,
}

impl ConfigResolver {
    /// Resolver with empty override and environment layers
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            overrides: SourceLayer::overrides(),
            environment: SourceLayer::environment(),
        }
    }

    /// Use `layer` as the override source, whatever it was tagged with
    pub fn with_overrides(mut self, mut layer: SourceLayer) -> Self {
        layer.retag(Source::Override);
        self.overrides = layer;
        self
    }

    /// Use `layer` as the environment source, whatever it was tagged with
    pub fn with_environment(mut self, mut layer: SourceLayer) -> Self {
        layer.retag(Source::Environment);
        self.environment = layer;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn overrides(&self) -> &SourceLayer {
        &self.overrides
    }

    pub fn environment(&self) -> &SourceLayer {
        &self.environment
    }

    /// Compute the final value and winning source of every setting
    pub fn resolve(&self) -> std::result::Result<ResolvedConfiguration, ResolveError> {
        self.trace().into_configuration(&self.catalog)
    }

    /// Resolve, then check exclusion groups and dependency rules
    ///
    /// If resolution itself fails its violations are returned and the
    /// constraint check is not run.
    pub fn validate(&self) -> Validation {
        match self.resolve() {
            Ok(config) => constraints::check(&self.catalog, &config),
            Err(err) => Validation::Invalid(err.into_violations()),
        }
    }

    /// Changed settings, fatal violations and advisory warnings
    pub fn report(&self) -> DiagnosticSummary {
        report::build(self)
    }

    /// How each source contributed to one setting, or `None` if undeclared
    pub fn explain(&self, id: &str) -> Option<Explanation> {
        let index = self.catalog.index_of(id)?;
        let trace = self.trace();
        let steps = trace.steps[index].clone();
        let (resolved, violations) = match trace.into_configuration(&self.catalog) {
            Ok(config) => (
                config.get(id).cloned(),
                constraints::check(&self.catalog, &config).into_violations(),
            ),
            Err(err) => (None, err.into_violations()),
        };
        Some(Explanation {
            setting: self.catalog.settings()[index].clone(),
            steps,
            resolved,
            violations: violations.into_iter().filter(|v| v.involves(id)).collect(),
        })
    }

    fn trace(&self) -> Trace {
        let mut trace = Trace::seed(&self.catalog);
        for layer in [&self.overrides, &self.environment] {
            debug!(
                source = %layer.source(),
                origin = layer.origin().unwrap_or("<inline>"),
                entries = layer.len(),
                "Applying layer"
            );
            trace.apply(&self.catalog, layer);
        }
        trace.finish(&self.catalog);
        trace
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    /// `None` while a value setting is undefined
    value: Option<Value>,
    source: Source,
}

impl Candidate {
    fn is_defined(&self) -> bool {
        self.value.as_ref().is_some_and(Value::is_enabled)
    }
}

/// Working state of one resolution pass
#[derive(Debug)]
struct Trace {
    candidates: Vec<Candidate>,
    steps: Vec<Vec<Step>>,
    violations: Vec<Violation>,
    unknown_seen: HashSet<(String, Source)>,
}

impl Trace {
    fn seed(catalog: &Catalog) -> Self {
        let candidates = catalog
            .settings()
            .iter()
            .map(|s| Candidate {
                value: Some(s.default.clone()),
                source: Source::Default,
            })
            .collect();
        let steps = catalog
            .settings()
            .iter()
            .map(|s| vec![Step::default_value(&s.default)])
            .collect();
        Self {
            candidates,
            steps,
            violations: Vec::new(),
            unknown_seen: HashSet::new(),
        }
    }

    fn apply(&mut self, catalog: &Catalog, layer: &SourceLayer) {
        let source = layer.source();
        for entry in layer.entries() {
            let failing = self.failing_guard(catalog, entry, source);

            let Some(index) = catalog.index_of(&entry.setting) else {
                self.unknown(&entry.setting, source);
                continue;
            };

            let step = Step::from_entry(layer, entry);
            if let Some(guard) = failing {
                debug!(setting = %entry.setting, %guard, "Guard does not hold, entry skipped");
                self.steps[index].push(step.skipped(guard));
                continue;
            }

            let setting = &catalog.settings()[index];
            let value = match &entry.assignment {
                Assignment::Set(raw) => match setting.setting_type.coerce(raw) {
                    Ok(value) => Some(value),
                    Err(reason) => {
                        self.violations.push(Violation::MalformedValue {
                            setting: setting.id.clone(),
                            source,
                            expected: setting.setting_type,
                            reason: reason.to_string(),
                        });
                        self.steps[index].push(step.rejected(reason.to_string()));
                        continue;
                    }
                },
                Assignment::Undefine if setting.is_flag() => Some(Value::Bool(false)),
                Assignment::Undefine => None,
            };

            debug!(setting = %setting.id, %source, "Candidate replaced");
            self.candidates[index] = Candidate { value, source };
            self.steps[index].push(step.applied());
        }
    }

    /// First guard of `entry` that does not hold against current candidates
    fn failing_guard<'e>(
        &mut self,
        catalog: &Catalog,
        entry: &'e LayerEntry,
        source: Source,
    ) -> Option<&'e Guard> {
        for guard in &entry.guards {
            let defined = match catalog.index_of(&guard.name) {
                Some(index) => self.candidates[index].is_defined(),
                None => {
                    self.unknown(&guard.name, source);
                    false
                }
            };
            if !guard.holds(defined) {
                return Some(guard);
            }
        }
        None
    }

    fn unknown(&mut self, setting: &str, source: Source) {
        if self.unknown_seen.insert((setting.to_string(), source)) {
            debug!(setting, %source, "Unknown setting");
            self.violations.push(Violation::UnknownSetting {
                setting: setting.to_string(),
                source,
            });
        }
    }

    /// Flag value settings left undefined by the last entry touching them
    fn finish(&mut self, catalog: &Catalog) {
        for (setting, candidate) in catalog.settings().iter().zip(&self.candidates) {
            if candidate.value.is_none() {
                self.violations.push(Violation::MalformedValue {
                    setting: setting.id.clone(),
                    source: candidate.source,
                    expected: setting.setting_type,
                    reason: "undefined with no replacement value".to_string(),
                });
            }
        }
    }

    fn into_configuration(
        self,
        catalog: &Catalog,
    ) -> std::result::Result<ResolvedConfiguration, ResolveError> {
        if !self.violations.is_empty() {
            return Err(ResolveError {
                violations: self.violations,
            });
        }

        let settings = catalog
            .settings()
            .iter()
            .zip(self.candidates)
            .filter_map(|(setting, candidate)| {
                candidate.value.map(|value| ResolvedSetting {
                    id: setting.id.clone(),
                    value,
                    source: candidate.source,
                    default: setting.default.clone(),
                })
            })
            .collect();
        Ok(ResolvedConfiguration::new(settings))
    }
}
