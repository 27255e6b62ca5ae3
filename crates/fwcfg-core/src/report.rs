//! Diagnostic summary
//!
//! Collects what a resolution changed relative to the defaults, every fatal
//! violation, and the advisory warnings from [`crate::lint`] into one
//! serializable [`DiagnosticSummary`].

use fwcfg_meta::Value;
use serde::Serialize;
use std::fmt;

use crate::constraints;
use crate::lint;
use crate::resolver::ConfigResolver;
use crate::source::Source;
use crate::violation::Violation;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Potential problem, never blocks the build
    Warning,
    /// Blocks the build
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCode {
    UnknownSetting,
    MalformedValue,
    ConflictingFeatures,
    MissingDependency,
    RedefinedWithoutUndef,
    FlashHeldUnchanged,
    RedundantOverride,
}

impl DiagnosticCode {
    pub fn severity(self) -> Severity {
        match self {
            Self::UnknownSetting
            | Self::MalformedValue
            | Self::ConflictingFeatures
            | Self::MissingDependency => Severity::Fatal,
            Self::RedefinedWithoutUndef | Self::FlashHeldUnchanged | Self::RedundantOverride => {
                Severity::Warning
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownSetting => "unknown_setting",
            Self::MalformedValue => "malformed_value",
            Self::ConflictingFeatures => "conflicting_features",
            Self::MissingDependency => "missing_dependency",
            Self::RedefinedWithoutUndef => "redefined_without_undef",
            Self::FlashHeldUnchanged => "flash_held_unchanged",
            Self::RedundantOverride => "redundant_override",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding about the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    /// Human-readable description
    pub message: String,
    /// Setting this relates to, if applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setting: Option<String>,
    /// Overlay line, if applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: message.into(),
            setting: None,
            line: None,
        }
    }

    pub fn for_setting(mut self, setting: impl Into<String>) -> Self {
        self.setting = Some(setting.into());
        self
    }

    pub fn at_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl From<&Violation> for Diagnostic {
    fn from(violation: &Violation) -> Self {
        let (code, setting) = match violation {
            Violation::UnknownSetting { setting, .. } => {
                (DiagnosticCode::UnknownSetting, Some(setting.clone()))
            }
            Violation::MalformedValue { setting, .. } => {
                (DiagnosticCode::MalformedValue, Some(setting.clone()))
            }
            Violation::ConflictingFeatures { .. } => (DiagnosticCode::ConflictingFeatures, None),
            Violation::MissingDependency { setting, .. } => {
                (DiagnosticCode::MissingDependency, Some(setting.clone()))
            }
        };
        Self {
            severity: code.severity(),
            code,
            message: violation.to_string(),
            setting,
            line: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        Ok(())
    }
}

/// A setting whose final value differs from its default
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub setting: String,
    pub default: Value,
    pub value: Value,
    pub source: Source,
}

/// Everything a build needs to know about one resolution
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticSummary {
    pub changes: Vec<Change>,
    pub diagnostics: Vec<Diagnostic>,
    /// Present only when resolution succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl DiagnosticSummary {
    /// Whether any diagnostic must stop the build
    pub fn is_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    pub fn fatal(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_fatal())
    }

    /// Non-fatal diagnostics
    pub fn advisories(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_fatal())
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

impl fmt::Display for DiagnosticSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.changes.is_empty() {
            writeln!(f, "No settings differ from their defaults")?;
        } else {
            writeln!(f, "Changed settings ({}):", self.changes.len())?;
            for change in &self.changes {
                writeln!(
                    f,
                    "  {:<32} {} -> {} ({})",
                    change.setting, change.default, change.value, change.source
                )?;
            }
        }

        if !self.diagnostics.is_empty() {
            writeln!(f)?;
            writeln!(f, "Diagnostics:")?;
            for diagnostic in &self.diagnostics {
                writeln!(f, "  {}", diagnostic)?;
            }
        }

        writeln!(f)?;
        write!(
            f,
            "{} changed, {} fatal, {} warning(s)",
            self.changes.len(),
            self.count(Severity::Fatal),
            self.count(Severity::Warning)
        )?;
        if let Some(fingerprint) = &self.fingerprint {
            write!(f, "\nFingerprint: {}", fingerprint)?;
        }
        Ok(())
    }
}

pub(crate) fn build(resolver: &ConfigResolver) -> DiagnosticSummary {
    let config = match resolver.resolve() {
        Ok(config) => config,
        Err(err) => {
            return DiagnosticSummary {
                changes: Vec::new(),
                diagnostics: err.violations().iter().map(Diagnostic::from).collect(),
                fingerprint: None,
            };
        }
    };

    let changes = config
        .changed()
        .map(|s| Change {
            setting: s.id.clone(),
            default: s.default.clone(),
            value: s.value.clone(),
            source: s.source,
        })
        .collect();

    let validation = constraints::check(resolver.catalog(), &config);
    let mut diagnostics: Vec<Diagnostic> =
        validation.violations().iter().map(Diagnostic::from).collect();
    diagnostics.extend(lint::lint(
        resolver.catalog(),
        resolver.overrides(),
        &config,
    ));

    DiagnosticSummary {
        changes,
        diagnostics,
        fingerprint: Some(config.fingerprint()),
    }
}
