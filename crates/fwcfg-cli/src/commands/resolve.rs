//! Resolve command: emit the final configuration

use std::path::Path;

use colored::Colorize;
use fwcfg_core::{OutputFormat, Project, Severity, emit};

use super::format_diagnostic;
use crate::error::{CliError, Result};

/// Run the resolve command
///
/// Nothing is written when any fatal diagnostic is present. Advisories go
/// to stderr so that stdout carries only the emitted configuration.
pub fn run_resolve(
    project: &Project,
    format: Option<OutputFormat>,
    output: Option<&Path>,
) -> Result<()> {
    let resolver = project.resolver()?;
    let summary = resolver.report();

    for diagnostic in &summary.diagnostics {
        eprintln!("{}", format_diagnostic(diagnostic));
    }
    if summary.is_fatal() {
        return Err(CliError::user(format!(
            "Configuration has {} fatal problem(s); nothing emitted",
            summary.count(Severity::Fatal)
        )));
    }

    let config = resolver.resolve().map_err(fwcfg_core::Error::from)?;
    let format = format.unwrap_or(project.manifest().output.format);
    let rendered = emit::render(&config, format)?;

    let target = output
        .map(Path::to_path_buf)
        .or_else(|| project.output_path());
    match target {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| fwcfg_core::Error::io(parent, e))?;
            }
            std::fs::write(&path, rendered).map_err(|e| fwcfg_core::Error::io(&path, e))?;
            eprintln!(
                "{} Wrote {} ({} settings, {} changed) to {}",
                "OK".green().bold(),
                format,
                config.len(),
                summary.changes.len(),
                path.display()
            );
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
