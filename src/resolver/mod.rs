//! Dependency graph resolver
//!
//! Classifies every declared dependency of a target package as safe to
//! remove, required elsewhere, protected, or never installed, and finds the
//! installed packages that would break if the target went away.
//!
//! Classification is a one-hop check: a dependency `d` of `p` is removable
//! when no other installed package outside the current candidate set
//! declares it. [`Resolver::resolve`] applies it to the target and then,
//! exactly one level deeper, to each of the target's removable dependencies.

mod error;
mod state;

pub use error::ResolveError;
pub use state::ResolutionState;

use crate::config::Config;
use crate::graph::DependencyGraph;
use crate::index::PackageIndex;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

pub struct Resolver<'a> {
    index: &'a PackageIndex,
    graph: &'a DependencyGraph,
    config: &'a Config,
    state: ResolutionState,
}

impl<'a> Resolver<'a> {
    /// Create a resolver for `target`. Fails with `PackageNotFound` if the
    /// target is not installed under any alias.
    pub fn new(
        target: &str,
        index: &'a PackageIndex,
        graph: &'a DependencyGraph,
        config: &'a Config,
    ) -> Result<Self, ResolveError> {
        let canonical = index
            .canonical_name(target)
            .ok_or_else(|| ResolveError::PackageNotFound {
                name: target.to_string(),
            })?;

        Ok(Self {
            index,
            graph,
            config,
            state: ResolutionState::new(canonical),
        })
    }

    pub fn target(&self) -> &str {
        &self.state.target
    }

    pub fn state(&self) -> &ResolutionState {
        &self.state
    }

    pub fn into_state(self) -> ResolutionState {
        self.state
    }

    fn is_protected(&self, name: &str) -> bool {
        self.config.is_protected(name)
    }

    /// Classify the declared dependencies of a single package.
    ///
    /// Protected and already analyzed packages are skipped without touching
    /// the state.
    pub fn classify(&mut self, package: &str) -> Result<(), ResolveError> {
        if self.is_protected(package) || self.state.analyzed_packages.contains(package) {
            debug!("{} already analyzed or protected, skipping...", package);
            return Ok(());
        }

        let graph = self.graph;
        let package = if graph.contains(package) {
            package.to_string()
        } else {
            let canonical = self.index.canonical_name(package).ok_or_else(|| {
                ResolveError::PackageNotFound {
                    name: package.to_string(),
                }
            })?;
            debug!("True package name is {}", canonical);
            canonical.to_string()
        };

        if self.is_protected(&package) || self.state.analyzed_packages.contains(&package) {
            debug!("{} already analyzed or protected, skipping...", package);
            return Ok(());
        }

        let requirements =
            graph
                .requirements_of(&package)
                .ok_or_else(|| ResolveError::Internal {
                    name: package.clone(),
                })?;
        debug!("{} declares {} dependencies", package, requirements.len());

        let mut valid_requirements: BTreeSet<&str> = BTreeSet::new();
        for dep in requirements {
            if !self.index.exists(dep) {
                self.state
                    .never_installed
                    .insert((package.clone(), dep.clone()));
            } else if self.is_protected(dep) {
                self.state
                    .whitelisted
                    .insert((package.clone(), dep.clone()));
            } else {
                valid_requirements.insert(dep.as_str());
            }
        }

        if package == self.state.target {
            for dependent in graph.dependents_of(&package) {
                if dependent != package && !self.is_protected(dependent) {
                    self.state.this_required_by.insert(dependent.to_string());
                }
            }
        }

        let required_by = self
            .state
            .dependency_required_by
            .entry(package.clone())
            .or_default();

        for &dep in &valid_requirements {
            for dependent in graph.dependents_of(dep) {
                if dependent != package
                    && !valid_requirements.contains(dependent)
                    && !self.config.is_protected(dependent)
                    && dependent != self.state.target
                {
                    required_by
                        .entry(dep.to_string())
                        .or_default()
                        .insert(dependent.to_string());
                }
            }
        }

        let safe: BTreeSet<String> = valid_requirements
            .iter()
            .filter(|dep| !required_by.contains_key(**dep))
            .map(|dep| dep.to_string())
            .collect();

        self.state.safe_to_remove.insert(package.clone(), safe);
        self.state.analyzed_packages.insert(package.clone());
        debug!("analyzed {}", package);

        Ok(())
    }

    /// Classify the target and its removable dependencies.
    ///
    /// Returns false when nothing besides the target could be removed.
    pub fn resolve(&mut self) -> Result<bool, ResolveError> {
        let target = self.state.target.clone();
        self.classify(&target)?;

        let removable = self
            .state
            .safe_to_remove
            .get(&target)
            .cloned()
            .unwrap_or_default();

        if removable.is_empty() {
            info!("No package could be found to be removed for {}", target);
            return Ok(false);
        }

        for dep in &removable {
            self.classify(dep)?;
        }

        self.drop_dependents_being_removed();
        Ok(true)
    }

    /// A package requiring the target does not break if it is itself being
    /// removed as a dependency of something else in the same run
    fn drop_dependents_being_removed(&mut self) {
        let dependents: Vec<String> = self.state.this_required_by.iter().cloned().collect();

        for dependent in dependents {
            let Some(owner) = self.state.removable_owner(&dependent).map(str::to_string) else {
                continue;
            };

            warn!("{}", removal_notice(&dependent, &self.state.target, &owner));
            self.state.this_required_by.remove(&dependent);
        }
    }
}

fn removal_notice(dependent: &str, target: &str, owner: &str) -> String {
    if owner == target {
        format!(
            "NOTICE: {} uses {} but is also a dependency of {}",
            dependent, target, owner
        )
    } else {
        format!(
            "NOTICE: {} uses {} but is also a dependency of {} (which is a dependency of {})",
            dependent, target, owner, target
        )
    }
}
