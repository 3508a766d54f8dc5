//! Installed-package index
//!
//! The index is an immutable snapshot of every distribution visible to the
//! interpreter, keyed by canonical name. It is built once per process (from
//! site-packages via [`crate::discovery`], or from a snapshot file) and shared
//! by reference with every resolution.

mod metadata;
mod snapshot;

pub use metadata::{parse_metadata, parse_requires_txt, DistMetadata, Requirement};
pub use snapshot::{Snapshot, SnapshotPackage};

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, trace};

/// Index errors
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid metadata in {}: {reason}", .path.display())]
    Metadata { path: PathBuf, reason: String },
    #[error("Failed to parse snapshot {}: {reason}", .path.display())]
    Snapshot { path: PathBuf, reason: String },
}

/// One installed distribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    /// Canonical name as declared by the distribution's metadata
    pub name: String,

    /// Installed version, when known
    pub version: Option<String>,

    /// Metadata directory the record was read from
    pub location: Option<PathBuf>,

    /// Declared dependency names, in declaration order, without duplicates.
    /// Names may be aliases of canonical names or refer to packages that
    /// are not installed.
    pub dependencies: Vec<String>,
}

impl InstalledPackage {
    pub fn new(name: impl Into<String>, dependencies: Vec<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            location: None,
            dependencies: dedup(dependencies),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_location(mut self, location: PathBuf) -> Self {
        self.location = Some(location);
        self
    }

    /// Build a record from parsed metadata, dropping extra-only requirements
    /// unless `include_extras` is set
    pub fn from_metadata(meta: DistMetadata, include_extras: bool) -> Self {
        let dependencies = meta
            .requirements
            .into_iter()
            .filter(|req| include_extras || !req.is_extra())
            .map(|req| req.name)
            .collect();

        Self {
            name: meta.name,
            version: meta.version,
            location: None,
            dependencies: dedup(dependencies),
        }
    }
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Normalize a distribution name: lowercase, with runs of `-`, `_` and `.`
/// collapsed into a single `-`
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;

    for ch in name.trim().chars() {
        if matches!(ch, '-' | '_' | '.') {
            in_separator = true;
            continue;
        }
        if in_separator && !out.is_empty() {
            out.push('-');
        }
        in_separator = false;
        out.extend(ch.to_lowercase());
    }

    out
}

/// Mapping from canonical name to installed package, plus an alias map for
/// lookups by any spelling of a name
#[derive(Debug, Default, Clone)]
pub struct PackageIndex {
    packages: BTreeMap<String, InstalledPackage>,

    /// Normalized name -> canonical name
    aliases: HashMap<String, String>,
}

impl PackageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from records; the first record of a given name wins
    pub fn from_packages(packages: impl IntoIterator<Item = InstalledPackage>) -> Self {
        let mut index = Self::new();
        for package in packages {
            index.insert(package);
        }
        index
    }

    /// Add a record. Returns false if a package with the same normalized
    /// name is already present, in which case the index is unchanged.
    pub fn insert(&mut self, package: InstalledPackage) -> bool {
        let normalized = normalize_name(&package.name);
        if let Some(existing) = self.aliases.get(&normalized) {
            debug!(
                "Ignoring duplicate distribution {} (already have {})",
                package.name, existing
            );
            return false;
        }

        self.aliases.insert(normalized, package.name.clone());
        self.packages.insert(package.name.clone(), package);
        true
    }

    /// Look a package up by canonical name or any alias of it
    pub fn lookup(&self, name: &str) -> Option<&InstalledPackage> {
        if let Some(package) = self.packages.get(name) {
            return Some(package);
        }

        let canonical = self.aliases.get(&normalize_name(name))?;
        trace!("Resolved alias {} -> {}", name, canonical);
        self.packages.get(canonical)
    }

    /// Resolve any spelling of a name to the canonical name
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|p| p.name.as_str())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// All installed packages, ordered by canonical name
    pub fn packages(&self) -> impl Iterator<Item = &InstalledPackage> {
        self.packages.values()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
