use std::collections::{BTreeMap, BTreeSet};

/// Classification of a target's dependencies, populated by the
/// [`Resolver`](super::Resolver) and discarded after reporting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionState {
    /// Canonical name of the package whose removal is evaluated
    pub target: String,

    /// Packages already classified
    pub analyzed_packages: BTreeSet<String>,

    /// (owner, dependency) pairs where the dependency is protected
    pub whitelisted: BTreeSet<(String, String)>,

    /// (owner, dependency) pairs where the dependency is declared but not installed
    pub never_installed: BTreeSet<(String, String)>,

    /// Analyzed package -> dependencies nothing else needs
    pub safe_to_remove: BTreeMap<String, BTreeSet<String>>,

    /// Analyzed package -> dependency -> other packages that also require it
    pub dependency_required_by: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,

    /// Packages that declare the target and would break without it
    pub this_required_by: BTreeSet<String>,
}

impl ResolutionState {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Every removable dependency across all analyzed packages
    pub fn removable(&self) -> BTreeSet<&str> {
        self.safe_to_remove
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    pub fn has_removable(&self) -> bool {
        self.safe_to_remove.values().any(|deps| !deps.is_empty())
    }

    pub fn has_required_elsewhere(&self) -> bool {
        self.dependency_required_by
            .values()
            .any(|deps| !deps.is_empty())
    }

    /// First analyzed package listing `dependency` as removable
    pub fn removable_owner(&self, dependency: &str) -> Option<&str> {
        self.safe_to_remove
            .iter()
            .find(|(_, deps)| deps.contains(dependency))
            .map(|(owner, _)| owner.as_str())
    }
}
