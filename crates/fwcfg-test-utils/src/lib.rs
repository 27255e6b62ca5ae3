//! Shared test utilities for the fwcfg workspace.
//!
//! This crate provides project fixtures so that crate test suites do not each
//! hand-roll temp directories with catalogs and overlays. It is a
//! dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`] builder for catalog/overlay/manifest setups

pub mod project;

pub use project::{TestProject, fixtures_dir, sample_project_dir};
