use super::{confirm, RemovalPlan, UndoScript, UninstallStatus, Uninstaller};
use crate::index::PackageIndex;
use colored::Colorize;
use miette::Result;
use std::path::PathBuf;
use tracing::{info, warn};

/// What happened to a removal plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Nothing was uninstalled, the plan was only printed
    DryRun,
    /// The user answered no
    Declined,
    /// The uninstaller ran
    Uninstalled(UninstallStatus),
}

/// Uninstalls removal plans with user confirmation
pub struct SafeRemover {
    assume_yes: bool,
    dry_run: bool,
    quiet: bool,
    undo_script_path: Option<PathBuf>,
    undo_script: Option<UndoScript>,
}

impl SafeRemover {
    pub fn new(assume_yes: bool, dry_run: bool, undo_script_path: Option<PathBuf>) -> Self {
        Self {
            assume_yes,
            dry_run,
            quiet: false,
            undo_script_path,
            undo_script: None,
        }
    }

    /// Suppress output; a quiet run never prompts
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Interpreter written into the undo script
    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        if self.undo_script_path.is_some() {
            self.undo_script = Some(UndoScript::new(python));
        }
        self
    }

    /// Uninstall every package in the plan.
    ///
    /// Undo records accumulate across calls, so one script covers every
    /// target of a run.
    pub fn remove(
        &mut self,
        plan: &RemovalPlan,
        index: &PackageIndex,
        uninstaller: &dyn Uninstaller,
    ) -> Result<RemovalOutcome> {
        if self.dry_run {
            if !self.quiet {
                println!();
                println!("{}", "Dry run - would uninstall:".yellow().bold());
                for name in &plan.packages {
                    println!("  - {}", name);
                }
                println!();
                println!(
                    "{}",
                    format!("Total: {} packages would be uninstalled", plan.len()).dimmed()
                );
            }
            return Ok(RemovalOutcome::DryRun);
        }

        let proceed = self.quiet || self.assume_yes || confirm("Continue to uninstall?")?;
        if !proceed {
            if !self.quiet {
                println!("{}", "Aborted.".yellow());
            }
            return Ok(RemovalOutcome::Declined);
        }

        if let (Some(script), Some(path)) = (self.undo_script.as_mut(), &self.undo_script_path) {
            for name in &plan.packages {
                let version = index.lookup(name).and_then(|p| p.version.as_deref());
                script.record_package(name, version);
            }
            script.write(path)?;
            if !self.quiet {
                println!("{} Undo script saved to: {}", "→".dimmed(), path.display());
            }
        }

        info!("uninstalling packages...");
        let status = uninstaller.uninstall(&plan.names())?;

        if status.success() {
            if !self.quiet {
                println!(
                    "  {} Uninstalled {} packages",
                    "✓".green(),
                    plan.len()
                );
            }
        } else {
            warn!("Uninstall of {} exited with {:?}", plan.target, status.code);
            if !self.quiet {
                println!(
                    "  {} Uninstall failed (exit code {})",
                    "✗".red(),
                    status
                        .code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "none".to_string())
                );
            }
        }

        Ok(RemovalOutcome::Uninstalled(status))
    }
}
