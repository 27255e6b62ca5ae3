//! Report command: changed settings and all diagnostics

use colored::Colorize;
use fwcfg_core::{Project, Severity};

use super::format_diagnostic;
use crate::error::{CliError, Result};

/// Run the report command
pub fn run_report(project: &Project, json: bool) -> Result<()> {
    let summary = project.resolver()?.report();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        if summary.changes.is_empty() {
            println!("{} No settings differ from their defaults.", "=>".blue().bold());
        } else {
            println!(
                "{} {} setting(s) differ from their defaults:",
                "=>".blue().bold(),
                summary.changes.len()
            );
            for change in &summary.changes {
                println!(
                    "  {:<32} {} -> {} {}",
                    change.setting.bold(),
                    change.default.to_string().dimmed(),
                    change.value.to_string().green(),
                    format!("({})", change.source).dimmed()
                );
            }
        }

        if !summary.diagnostics.is_empty() {
            println!();
            println!("{}", "Diagnostics".bold());
            for diagnostic in &summary.diagnostics {
                println!("{}", format_diagnostic(diagnostic));
            }
        }

        println!();
        println!(
            "{} changed, {} fatal, {} warning(s)",
            summary.changes.len(),
            summary.count(Severity::Fatal),
            summary.count(Severity::Warning)
        );
        if let Some(fingerprint) = &summary.fingerprint {
            println!("{} {}", "Fingerprint:".dimmed(), fingerprint);
        }
    }

    if summary.is_fatal() {
        return Err(CliError::user(format!(
            "Configuration has {} fatal problem(s)",
            summary.count(Severity::Fatal)
        )));
    }
    Ok(())
}
