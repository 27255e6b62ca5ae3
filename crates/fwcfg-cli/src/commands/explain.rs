//! Explain command: per-setting provenance

use colored::Colorize;
use fwcfg_core::{Project, StepOutcome};

use crate::error::{CliError, Result};

/// Run the explain command
pub fn run_explain(project: &Project, setting: &str, json: bool) -> Result<()> {
    let resolver = project.resolver()?;
    let explanation = resolver
        .explain(setting)
        .ok_or_else(|| CliError::user(format!("Unknown setting '{}'", setting)))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&explanation)?);
        return Ok(());
    }

    let declared = &explanation.setting;
    print!("{} {}", declared.id.bold(), format!("({})", declared.setting_type).dimmed());
    if let Some(group) = &declared.group {
        print!(" {}", format!("group {}", group).cyan());
    }
    println!();
    if let Some(description) = &declared.description {
        println!("  {}", description.dimmed());
    }

    for step in &explanation.steps {
        let mut location = step.origin.clone().unwrap_or_default();
        if let Some(line) = step.line {
            location.push_str(&format!(":{}", line));
        }
        let outcome = match &step.outcome {
            StepOutcome::Applied => "applied".green().to_string(),
            StepOutcome::Skipped { guard } => format!("{} {}", "skipped".yellow(), guard),
            StepOutcome::Rejected { reason } => format!("{} {}", "rejected".red(), reason),
        };
        println!(
            "  {:<12} {:<24} {} {}",
            step.source.to_string(),
            step.input,
            outcome,
            location.dimmed()
        );
    }

    match &explanation.resolved {
        Some(resolved) => println!(
            "{} {} from {}",
            "=>".blue().bold(),
            resolved.value.to_string().green(),
            resolved.source
        ),
        None => println!("{} {}", "=>".blue().bold(), "unresolved".red()),
    }
    for violation in &explanation.violations {
        println!("  [{}] {}", "error".red(), violation);
    }
    Ok(())
}
