//! Index snapshot files
//!
//! A snapshot lists installed packages without touching an interpreter, for
//! offline analysis of another environment:
//!
//! ```json
//! { "packages": [ { "name": "flask", "version": "3.0.2", "dependencies": ["click>=8.1.3", "jinja2"] } ] }
//! ```
//!
//! Dependency entries are full requirement strings, so markers are honoured
//! the same way as in distribution metadata.

use super::{IndexError, InstalledPackage, PackageIndex, Requirement};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub packages: Vec<SnapshotPackage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPackage {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Snapshot {
    /// Load a snapshot from a JSON, YAML or TOML file (chosen by extension)
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let contents = std::fs::read_to_string(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let snapshot_err = |reason: String| IndexError::Snapshot {
            path: path.to_path_buf(),
            reason,
        };

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let snapshot: Snapshot = match extension {
            "yml" | "yaml" => {
                serde_yaml::from_str(&contents).map_err(|e| snapshot_err(e.to_string()))?
            }
            "toml" => toml::from_str(&contents).map_err(|e| snapshot_err(e.to_string()))?,
            _ => serde_json::from_str(&contents).map_err(|e| snapshot_err(e.to_string()))?,
        };

        debug!(
            "Loaded snapshot {} with {} packages",
            path.display(),
            snapshot.packages.len()
        );
        Ok(snapshot)
    }

    /// Convert into an index, dropping extra-only requirements unless
    /// `include_extras` is set
    pub fn into_index(self, include_extras: bool) -> PackageIndex {
        PackageIndex::from_packages(self.packages.into_iter().map(|package| {
            let dependencies = package
                .dependencies
                .iter()
                .filter_map(|line| Requirement::parse(line))
                .filter(|req| include_extras || !req.is_extra())
                .map(|req| req.name)
                .collect();

            let installed = InstalledPackage::new(package.name, dependencies);
            match package.version {
                Some(version) => installed.with_version(version),
                None => installed,
            }
        }))
    }
}
