//! lgfallback - locale fallback for multi-locale template collections
//!
//! Resources are template files named `<prefix>.<locale>.lg` (or `<prefix>.lg`
//! for the neutral locale). A [`LocalePolicy`] gives every locale an ordered
//! fallback chain ending in the neutral tag `""`, and everything else follows
//! from it:
//!
//! - [`policy`] - Locale tags and their fallback chains
//! - [`resource`] - Resource naming and resource sources (filesystem, memory)
//! - [`grouper`] - Bucketing resources per locale and collapsing identical buckets
//! - [`resolver`] - Resolving a requested locale against available locales
//! - [`engine`] - Template engine traits and the shared engine registry
//! - [`import`] - Locale-aware resolution of imports between resources
//! - [`hbs`] - Handlebars-backed engine and loader
//! - [`dispatcher`] - Rendering through entry or candidate dispatch
//! - [`catalog`] - Discovery, grouping and eager loading in one place
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod catalog;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod grouper;
pub mod hbs;
pub mod import;
pub mod policy;
pub mod resolver;
pub mod resource;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogOptions};
pub use config::{Config, Strategy};
pub use dispatcher::{CandidateDispatcher, EntryDispatcher, EntryMap, Render, Rendered};
pub use engine::{EngineHandle, EngineLoader, EngineRegistry, TemplateEngine};
pub use error::{Diagnostic, LgError, Result};
pub use grouper::{LocaleBuckets, ResourceGrouper, group_by_locale};
pub use hbs::{HandlebarsEngine, HandlebarsLoader, TemplateDocument};
pub use import::{BucketImportResolver, FallbackImportResolver, ImportResolve, ResolvedImport};
pub use policy::{LocalePolicy, NEUTRAL, normalize_tag};
pub use resolver::{FallbackResolver, LocaleKeys, resolve};
pub use resource::{FsSource, MemorySource, NameParser, ParsedName, ResourceSource, parse_resource_name};
