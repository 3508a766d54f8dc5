use crate::remove::RemovalPlan;
use crate::resolver::ResolutionState;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output.
///
/// Collects one result per target and emits a single document.
pub struct JsonReporter {
    output_path: Option<PathBuf>,
    results: Vec<JsonResult>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self {
            output_path,
            results: Vec::new(),
        }
    }

    pub fn add(&mut self, state: &ResolutionState, resolved: bool) {
        self.results.push(JsonResult::from_state(state, resolved));
    }

    pub fn render(&self) -> Result<String> {
        let report = JsonReport {
            version: env!("CARGO_PKG_VERSION"),
            results: &self.results,
        };
        serde_json::to_string_pretty(&report).into_diagnostic()
    }

    pub fn finish(&self) -> Result<()> {
        let json = self.render()?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    results: &'a [JsonResult],
}

#[derive(Serialize)]
struct JsonResult {
    target: String,
    removable: bool,
    required_by: Vec<String>,
    never_installed: Vec<JsonEdge>,
    required_elsewhere: Vec<JsonShared>,
    whitelisted: Vec<JsonEdge>,
    safe_to_remove: Vec<JsonEdge>,
    uninstall: Vec<String>,
}

#[derive(Serialize)]
struct JsonEdge {
    package: String,
    dependency: String,
}

#[derive(Serialize)]
struct JsonShared {
    package: String,
    dependency: String,
    used_by: Vec<String>,
}

fn edges(pairs: &std::collections::BTreeSet<(String, String)>) -> Vec<JsonEdge> {
    pairs
        .iter()
        .map(|(package, dependency)| JsonEdge {
            package: package.clone(),
            dependency: dependency.clone(),
        })
        .collect()
}

impl JsonResult {
    fn from_state(state: &ResolutionState, resolved: bool) -> Self {
        let required_elsewhere = state
            .dependency_required_by
            .iter()
            .flat_map(|(package, deps)| {
                deps.iter().map(move |(dependency, users)| JsonShared {
                    package: package.clone(),
                    dependency: dependency.clone(),
                    used_by: users.iter().cloned().collect(),
                })
            })
            .collect();

        let safe_to_remove = state
            .safe_to_remove
            .iter()
            .flat_map(|(package, deps)| {
                deps.iter().map(move |dependency| JsonEdge {
                    package: package.clone(),
                    dependency: dependency.clone(),
                })
            })
            .collect();

        let uninstall = if resolved {
            RemovalPlan::from_state(state).names()
        } else {
            Vec::new()
        };

        Self {
            target: state.target.clone(),
            removable: resolved,
            required_by: state.this_required_by.iter().cloned().collect(),
            never_installed: edges(&state.never_installed),
            required_elsewhere,
            whitelisted: edges(&state.whitelisted),
            safe_to_remove,
            uninstall,
        }
    }
}
