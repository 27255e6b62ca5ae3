//! Per-setting provenance
//!
//! An [`Explanation`] lists every value each source offered for one setting,
//! in the order the resolver considered them, and what became of each.

use fwcfg_meta::{Setting, Value};
use serde::Serialize;
use std::fmt;

use crate::resolver::ResolvedSetting;
use crate::source::{Assignment, Guard, LayerEntry, Source, SourceLayer};
use crate::violation::Violation;

/// What happened to one offered value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Became the candidate value
    Applied,
    /// An enclosing guard did not hold
    Skipped { guard: String },
    /// Did not coerce to the declared type
    Rejected { reason: String },
}

/// One value offered by one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// The value as supplied, or `#undef`
    pub input: String,
    pub outcome: StepOutcome,
}

impl Step {
    pub(crate) fn default_value(value: &Value) -> Self {
        Self {
            source: Source::Default,
            origin: None,
            line: None,
            input: value.to_string(),
            outcome: StepOutcome::Applied,
        }
    }

    pub(crate) fn from_entry(layer: &SourceLayer, entry: &LayerEntry) -> Self {
        let input = match &entry.assignment {
            Assignment::Set(raw) => raw.to_string(),
            Assignment::Undefine => "#undef".to_string(),
        };
        Self {
            source: layer.source(),
            origin: layer.origin().map(str::to_string),
            line: entry.line,
            input,
            outcome: StepOutcome::Applied,
        }
    }

    pub(crate) fn applied(self) -> Self {
        Self {
            outcome: StepOutcome::Applied,
            ..self
        }
    }

    pub(crate) fn skipped(self, guard: &Guard) -> Self {
        Self {
            outcome: StepOutcome::Skipped {
                guard: guard.to_string(),
            },
            ..self
        }
    }

    pub(crate) fn rejected(self, reason: String) -> Self {
        Self {
            outcome: StepOutcome::Rejected { reason },
            ..self
        }
    }

    fn location(&self) -> String {
        match (&self.origin, self.line) {
            (Some(origin), Some(line)) => format!("{}:{}", origin, line),
            (Some(origin), None) => origin.clone(),
            (None, Some(line)) => format!("line {}", line),
            (None, None) => String::new(),
        }
    }
}

/// How resolution arrived at one setting's value
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub setting: Setting,
    pub steps: Vec<Step>,
    /// `None` when resolution failed
    pub resolved: Option<ResolvedSetting>,
    /// Violations naming this setting
    pub violations: Vec<Violation>,
}

impl Explanation {
    pub fn winner(&self) -> Option<Source> {
        self.resolved.as_ref().map(|r| r.source)
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}", self.setting.id, self.setting.setting_type)?;
        if let Some(group) = &self.setting.group {
            write!(f, ", group {}", group)?;
        }
        writeln!(f, ")")?;

        for step in &self.steps {
            write!(f, "  {:<12} {:<24}", step.source.to_string(), step.input)?;
            let location = step.location();
            if !location.is_empty() {
                write!(f, " {}", location)?;
            }
            match &step.outcome {
                StepOutcome::Applied => {}
                StepOutcome::Skipped { guard } => write!(f, " (skipped: {})", guard)?,
                StepOutcome::Rejected { reason } => write!(f, " (rejected: {})", reason)?,
            }
            writeln!(f)?;
        }

        match &self.resolved {
            Some(resolved) => write!(f, "  => {} from {}", resolved.value, resolved.source)?,
            None => write!(f, "  => unresolved")?,
        }
        for violation in &self.violations {
            write!(f, "\n  ! {}", violation)?;
        }
        Ok(())
    }
}
