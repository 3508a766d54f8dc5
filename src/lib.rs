//! pip-remove - uninstall a Python package together with its orphaned dependencies
//!
//! This library decides which dependencies of a package can go when the
//! package is uninstalled, and which must stay because something else
//! still needs them.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! 1. **Discovery** - Find `.dist-info` / `.egg-info` metadata on the interpreter's path
//! 2. **Indexing** - Parse metadata into a [`PackageIndex`] keyed by canonical name
//! 3. **Graph Building** - Build the [`DependencyGraph`] of the whole environment once
//! 4. **Resolution** - Classify the target's dependencies with a [`Resolver`]
//! 5. **Reporting** - Output results as colored text or JSON
//! 6. **Removal** - Confirm and run a batch `pip uninstall`

pub mod config;
pub mod discovery;
pub mod graph;
pub mod index;
pub mod remove;
pub mod report;
pub mod resolver;

pub use config::Config;
pub use discovery::DistFinder;
pub use graph::DependencyGraph;
pub use index::{InstalledPackage, PackageIndex, Snapshot};
pub use remove::{PipUninstaller, RemovalOutcome, RemovalPlan, SafeRemover, Uninstaller};
pub use report::{ReportFormat, Reporter};
pub use resolver::{ResolutionState, ResolveError, Resolver};
