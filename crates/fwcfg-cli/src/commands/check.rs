//! Check command: exclusion groups and dependency rules

use colored::Colorize;
use fwcfg_core::{Project, Validation};

use crate::error::{CliError, Result};

/// Run the check command
pub fn run_check(project: &Project) -> Result<()> {
    let resolver = project.resolver()?;

    match resolver.validate() {
        Validation::Valid => {
            println!(
                "{} {} settings resolved, no conflicts.",
                "OK".green().bold(),
                resolver.catalog().len()
            );
            Ok(())
        }
        Validation::Invalid(violations) => {
            println!(
                "{} Found {} problem(s):",
                "=>".blue().bold(),
                violations.len()
            );
            for violation in &violations {
                println!("  [{}] {}", "error".red(), violation);
            }
            Err(CliError::user("Configuration is invalid"))
        }
    }
}
