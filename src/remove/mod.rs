//! Package removal
//!
//! Turns a resolved [`ResolutionState`] into a batch uninstall, with
//! confirmation, dry-run and undo script support.

mod confirm;
mod executor;
mod undo;

pub use confirm::{confirm, confirm_from, parse_answer};
pub use executor::{RemovalOutcome, SafeRemover};
pub use undo::UndoScript;

use crate::resolver::ResolutionState;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::collections::BTreeSet;
use std::process::Command;
use tracing::debug;

/// The set of packages handed to the uninstaller for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalPlan {
    pub target: String,
    /// The target plus every removable dependency, sorted
    pub packages: BTreeSet<String>,
}

impl RemovalPlan {
    pub fn from_state(state: &ResolutionState) -> Self {
        let mut packages: BTreeSet<String> =
            state.removable().into_iter().map(str::to_string).collect();
        packages.insert(state.target.clone());

        Self {
            target: state.target.clone(),
            packages,
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.packages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Overall result of a batch uninstall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UninstallStatus {
    /// Exit code, `None` if the process was terminated by a signal
    pub code: Option<i32>,
}

impl UninstallStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Batch uninstall backend
pub trait Uninstaller {
    fn uninstall(&self, packages: &[String]) -> Result<UninstallStatus>;
}

/// Runs `<python> -m pip uninstall --yes [--quiet] <packages...>`
pub struct PipUninstaller {
    python: String,
    quiet: bool,
}

impl PipUninstaller {
    pub fn new(python: impl Into<String>, quiet: bool) -> Self {
        Self {
            python: python.into(),
            quiet,
        }
    }

    fn args<'p>(&self, packages: &'p [String]) -> Vec<&'p str> {
        let mut args = vec!["-m", "pip", "uninstall", "--yes"];
        if self.quiet {
            args.push("--quiet");
        }
        args.extend(packages.iter().map(String::as_str));
        args
    }
}

impl Uninstaller for PipUninstaller {
    fn uninstall(&self, packages: &[String]) -> Result<UninstallStatus> {
        let args = self.args(packages);
        debug!("Running {} {}", self.python, args.join(" "));

        let status = Command::new(&self.python)
            .args(&args)
            .status()
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to run '{} -m pip'", self.python))?;

        debug!("exit code is {:?}", status.code());
        Ok(UninstallStatus {
            code: status.code(),
        })
    }
}
