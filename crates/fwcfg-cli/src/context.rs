//! Project context from global CLI arguments
//!
//! Paths given on the command line are taken relative to the working
//! directory; paths in `fwcfg.toml` are relative to the project root.

use std::path::{Path, PathBuf};

use fwcfg_core::Project;

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// The project directory, made absolute against the working directory
pub fn project_root(cli: &Cli) -> Result<PathBuf> {
    absolute(&cli.project)
}

/// Open the project and apply command-line adjustments
pub fn open_project(cli: &Cli) -> Result<Project> {
    let root = project_root(cli)?;
    if !root.is_dir() {
        return Err(CliError::user(format!(
            "Project directory {} does not exist",
            root.display()
        )));
    }

    let mut project = Project::open(&root)?;
    if let Some(defaults) = &cli.defaults {
        project.set_catalog_path(absolute(defaults)?);
    }
    if let Some(overlay) = &cli.overlay {
        project.set_overlay_path(absolute(overlay)?);
    }
    if cli.no_env {
        project.set_read_process_env(false);
    }
    for definition in &cli.defines {
        project.define(definition)?;
    }

    let catalog = project.catalog_path();
    if !catalog.exists() {
        return Err(CliError::user(format!(
            "No defaults catalog at {}. Pass --defaults or set project.defaults in fwcfg.toml.",
            catalog.display()
        )));
    }
    tracing::debug!(root = ?project.root(), ?catalog, "Opened project");
    Ok(project)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
