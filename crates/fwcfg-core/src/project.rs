//! Project manifest (`fwcfg.toml`) and project loading
//!
//! A project directory holds the defaults catalog, the overlay and an
//! optional manifest naming them. Without a manifest the conventional file
//! names are used. Paths in the manifest are relative to the project root.

use fwcfg_meta::{Catalog, load_catalog};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::emit::OutputFormat;
use crate::environment::{DEFAULT_BUILD_FLAGS_VAR, EnvironmentInput};
use crate::error::{Error, Result};
use crate::overlay::load_overlay;
use crate::resolver::{ConfigResolver, ResolveError};
use crate::source::{Source, SourceLayer};
use crate::violation::Violation;

pub const MANIFEST_FILE: &str = "fwcfg.toml";
pub const DEFAULT_CATALOG: &str = "defaults.toml";
pub const DEFAULT_OVERLAY: &str = "user_config_override.h";

fn default_catalog() -> PathBuf {
    PathBuf::from(DEFAULT_CATALOG)
}

fn default_overlay() -> PathBuf {
    PathBuf::from(DEFAULT_OVERLAY)
}

fn default_build_flags_var() -> String {
    DEFAULT_BUILD_FLAGS_VAR.to_string()
}

fn default_true() -> bool {
    true
}

/// `[project]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    /// Defaults catalog
    #[serde(default = "default_catalog")]
    pub defaults: PathBuf,
    /// Override overlay (`.h` or `.toml`)
    #[serde(default = "default_overlay")]
    pub overlay: PathBuf,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            defaults: default_catalog(),
            overlay: default_overlay(),
        }
    }
}

/// `[environment]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentSection {
    /// Variable holding compiler flags with `-DNAME=value` tokens
    #[serde(default = "default_build_flags_var")]
    pub build_flags_var: String,
    /// Whether process environment variables are consulted at all
    #[serde(default = "default_true")]
    pub read_process_env: bool,
}

impl Default for EnvironmentSection {
    fn default() -> Self {
        Self {
            build_flags_var: default_build_flags_var(),
            read_process_env: true,
        }
    }
}

/// `[output]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
    /// Where `fwcfg resolve` writes; stdout when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Parsed `fwcfg.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectManifest {
    #[serde(default)]
    pub project: ProjectSection,
    #[serde(default)]
    pub environment: EnvironmentSection,
    #[serde(default)]
    pub output: OutputSection,
}

impl ProjectManifest {
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: ProjectManifest = toml::from_str(content)?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!(?path, "Loading project manifest");
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|e: toml::de::Error| Error::InvalidManifest {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// A project directory with its manifest and command-line adjustments
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    manifest: ProjectManifest,
    defines: Vec<String>,
}

impl Project {
    /// Open `root`, reading `fwcfg.toml` if present
    pub fn open(root: &Path) -> Result<Self> {
        let manifest_path = root.join(MANIFEST_FILE);
        let manifest = if manifest_path.exists() {
            ProjectManifest::load(&manifest_path)?
        } else {
            debug!(?root, "No project manifest, using conventional file names");
            ProjectManifest::default()
        };
        Ok(Self::with_manifest(root, manifest))
    }

    pub fn with_manifest(root: &Path, manifest: ProjectManifest) -> Self {
        Self {
            root: root.to_path_buf(),
            manifest,
            defines: Vec::new(),
        }
    }

    /// Write a starter manifest into `root`
    pub fn init(root: &Path) -> Result<PathBuf> {
        let path = root.join(MANIFEST_FILE);
        if path.exists() {
            return Err(Error::ManifestExists { path });
        }
        let content = ProjectManifest::default().to_toml_string()?;
        std::fs::write(&path, content).map_err(|e| Error::io(&path, e))?;
        debug!(?path, "Wrote project manifest");
        Ok(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    pub fn set_catalog_path(&mut self, path: PathBuf) {
        self.manifest.project.defaults = path;
    }

    pub fn set_overlay_path(&mut self, path: PathBuf) {
        self.manifest.project.overlay = path;
    }

    pub fn set_read_process_env(&mut self, read: bool) {
        self.manifest.environment.read_process_env = read;
    }

    /// Add a command-line `KEY=VALUE` definition
    pub fn define(&mut self, definition: &str) -> Result<()> {
        if !EnvironmentInput::new().define(definition) {
            return Err(Error::InvalidDefine {
                definition: definition.to_string(),
            });
        }
        self.defines.push(definition.to_string());
        Ok(())
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(&self.manifest.project.defaults)
    }

    pub fn overlay_path(&self) -> PathBuf {
        self.root.join(&self.manifest.project.overlay)
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.manifest.output.path.as_ref().map(|p| self.root.join(p))
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        Ok(load_catalog(&self.catalog_path())?)
    }

    pub fn load_overlay(&self) -> Result<SourceLayer> {
        load_overlay(&self.overlay_path())
    }

    /// Process environment (if enabled), build flags and `-D` definitions
    pub fn environment_input(&self) -> EnvironmentInput {
        let settings = &self.manifest.environment;
        let mut input = if settings.read_process_env {
            EnvironmentInput::from_process_env(&settings.build_flags_var)
        } else {
            EnvironmentInput::new()
        };
        for definition in &self.defines {
            input.define(definition);
        }
        input
    }

    /// Load every source and assemble a resolver
    ///
    /// A `-D` definition whose key the catalog does not allow-list fails
    /// with [`Violation::UnknownSetting`] from the environment source.
    pub fn resolver(&self) -> Result<ConfigResolver> {
        let catalog = self.load_catalog()?;
        debug!(%catalog, "Catalog loaded");
        let overrides = self.load_overlay()?;

        let input = self.environment_input();
        let unlisted: Vec<Violation> = input
            .unlisted_defines(&catalog)
            .into_iter()
            .map(|key| Violation::UnknownSetting {
                setting: key.to_string(),
                source: Source::Environment,
            })
            .collect();
        if !unlisted.is_empty() {
            return Err(ResolveError::from(unlisted).into());
        }

        let environment = input.to_layer(&catalog);
        Ok(ConfigResolver::new(catalog)
            .with_overrides(overrides)
            .with_environment(environment))
    }
}
