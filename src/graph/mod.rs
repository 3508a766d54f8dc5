//! Universe dependency graph
//!
//! Adjacency list of every installed package (name -> declared dependency
//! names) with reverse edges for "who requires X" queries. Built once per
//! process from the [`PackageIndex`] and shared by every resolution.

use crate::index::PackageIndex;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Nodes are canonical names of installed packages; an edge `a -> b`
    /// means `a` declares `b`
    inner: DiGraph<String, ()>,

    /// Map from canonical name to node index
    node_map: HashMap<String, NodeIndex>,

    /// Declared dependencies per installed package. Names that resolve to an
    /// installed package are canonical; the rest are kept verbatim.
    requirements: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph for every package in the index
    pub fn from_index(index: &PackageIndex) -> Self {
        let mut graph = Self::new();

        for package in index.packages() {
            let idx = graph.inner.add_node(package.name.clone());
            graph.node_map.insert(package.name.clone(), idx);
        }

        for package in index.packages() {
            let mut declared: Vec<String> = Vec::with_capacity(package.dependencies.len());

            for dep in &package.dependencies {
                let name = index.canonical_name(dep).unwrap_or(dep).to_string();
                if declared.contains(&name) {
                    continue;
                }

                if let (Some(&from), Some(&to)) =
                    (graph.node_map.get(&package.name), graph.node_map.get(&name))
                {
                    graph.inner.update_edge(from, to, ());
                }
                declared.push(name);
            }

            graph.requirements.insert(package.name.clone(), declared);
        }

        debug!(
            "Dependency graph: {} packages, {} edges",
            graph.inner.node_count(),
            graph.inner.edge_count()
        );
        graph
    }

    /// Declared dependencies of an installed package
    pub fn requirements_of(&self, name: &str) -> Option<&[String]> {
        self.requirements.get(name).map(Vec::as_slice)
    }

    /// Installed packages that declare `name`, sorted by name
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.node_map.get(name) else {
            return Vec::new();
        };

        let mut dependents: Vec<&str> = self
            .inner
            .neighbors_directed(idx, Direction::Incoming)
            .filter_map(|n| self.inner.node_weight(n))
            .map(String::as_str)
            .collect();
        dependents.sort_unstable();
        dependents.dedup();
        dependents
    }

    /// True if `name` is the canonical name of an installed package
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    pub fn package_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }
}
