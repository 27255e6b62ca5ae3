//! Setting catalog schema for the firmware configuration overlay resolver.
//!
//! This crate defines what a firmware build can be configured with: the
//! settings and their types, the compiled-in defaults, exclusion groups,
//! dependency rules and the environment allow-list. It knows nothing about
//! overlays or precedence; see `fwcfg-core` for that.

pub mod catalog;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod value;

pub use catalog::{Catalog, CatalogBuilder, CatalogProblem};
pub use error::{Error, Result};
pub use loader::load_catalog;
pub use schema::{DependencyRule, ExclusionGroup, FlagState, Setting};
pub use validation::is_valid_identifier;
pub use value::{RawValue, SettingType, Value, ValueError, unquote};
