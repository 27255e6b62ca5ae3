//! Init command: write a starter manifest

use std::path::Path;

use colored::Colorize;
use fwcfg_core::Project;
use fwcfg_core::project::{DEFAULT_CATALOG, DEFAULT_OVERLAY};

use crate::error::Result;

/// Run the init command
pub fn run_init(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root)?;
    let path = Project::init(root)?;

    println!("{} Created {}", "OK".green().bold(), path.display());
    for (file, what) in [(DEFAULT_CATALOG, "defaults catalog"), (DEFAULT_OVERLAY, "overlay")] {
        if !root.join(file).exists() {
            println!("  {} no {} yet ({})", "=>".blue().bold(), what, file.cyan());
        }
    }
    Ok(())
}
