//! Override resolution for firmware feature configuration.
//!
//! Merges the compiled-in defaults of a [`fwcfg_meta::Catalog`] with the
//! integrator's overlay and allow-listed build-time inputs, then checks the
//! result against exclusion groups and dependency rules.
//!
//! ```no_run
//! use fwcfg_core::Project;
//! use std::path::Path;
//!
//! let resolver = Project::open(Path::new("firmware"))?.resolver()?;
//! let summary = resolver.report();
//! if !summary.is_fatal() {
//!     let config = resolver.resolve()?;
//!     println!("{}", fwcfg_core::emit::render_header(&config));
//! }
//! # Ok::<(), fwcfg_core::Error>(())
//! ```

pub mod constraints;
pub mod emit;
pub mod environment;
pub mod error;
pub mod explain;
pub mod lint;
pub mod overlay;
pub mod project;
pub mod report;
pub mod resolver;
pub mod source;
pub mod violation;

pub use emit::OutputFormat;
pub use environment::{EnvironmentInput, InputOrigin};
pub use error::{Error, Result};
pub use explain::{Explanation, Step, StepOutcome};
pub use overlay::{OverlayFormat, load_overlay, parse_overlay};
pub use project::{Project, ProjectManifest};
pub use report::{Change, Diagnostic, DiagnosticCode, DiagnosticSummary, Severity};
pub use resolver::{ConfigResolver, ResolveError, ResolvedConfiguration, ResolvedSetting};
pub use source::{Assignment, Guard, LayerEntry, LayerSyntax, Source, SourceLayer};
pub use violation::{Validation, Violation};
