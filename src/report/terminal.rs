use crate::remove::RemovalPlan;
use crate::resolver::ResolutionState;
use colored::Colorize;
use std::fmt::Write;

/// Terminal reporter with colored output
pub struct TerminalReporter;

impl TerminalReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, state: &ResolutionState, resolved: bool) {
        print!("{}", self.render(state, resolved));
    }

    /// Render the sections of a resolution, skipping empty ones
    pub fn render(&self, state: &ResolutionState, resolved: bool) -> String {
        let mut out = String::new();

        if !resolved {
            let _ = writeln!(
                out,
                "{}",
                format!("Nothing to remove for {}.", state.target).yellow()
            );
            return out;
        }

        self.render_required_by(&mut out, state);
        self.render_never_installed(&mut out, state);
        self.render_required_elsewhere(&mut out, state);
        self.render_whitelisted(&mut out, state);
        self.render_removable(&mut out, state);

        out
    }

    fn heading(&self, out: &mut String, text: &str) {
        let _ = writeln!(out, "{}", text.bold());
    }

    fn render_required_by(&self, out: &mut String, state: &ResolutionState) {
        if state.this_required_by.is_empty() {
            return;
        }

        self.heading(
            out,
            &format!("The following packages use {} as a dependency:", state.target),
        );
        for name in &state.this_required_by {
            let _ = writeln!(out, "  - {}", name.red());
        }
    }

    fn render_never_installed(&self, out: &mut String, state: &ResolutionState) {
        if state.never_installed.is_empty() {
            return;
        }

        self.heading(out, "The following dependencies are not installed:");
        for (owner, dep) in &state.never_installed {
            let _ = writeln!(out, "  - {} --> a dependency of {}", dep.dimmed(), owner);
        }
    }

    fn render_required_elsewhere(&self, out: &mut String, state: &ResolutionState) {
        if !state.has_required_elsewhere() {
            return;
        }

        self.heading(out, "The following dependencies are used by other packages:");
        for (owner, deps) in &state.dependency_required_by {
            for (dep, users) in deps {
                let users: Vec<&str> = users.iter().map(String::as_str).collect();
                let _ = writeln!(
                    out,
                    "  - {} (a dependency of {}) --> used by {}",
                    dep.cyan(),
                    owner,
                    users.join(", ")
                );
            }
        }
    }

    fn render_whitelisted(&self, out: &mut String, state: &ResolutionState) {
        if state.whitelisted.is_empty() {
            return;
        }

        self.heading(out, "The following dependencies are whitelisted:");
        for (owner, dep) in &state.whitelisted {
            let _ = writeln!(out, "  - {} (a dependency of {})", dep.blue(), owner);
        }
    }

    fn render_removable(&self, out: &mut String, state: &ResolutionState) {
        if !state.has_removable() {
            return;
        }

        self.heading(out, "The following dependencies will be REMOVED:");
        for (owner, deps) in &state.safe_to_remove {
            for dep in deps {
                let _ = writeln!(out, "  - {} (a dependency of {})", dep.green(), owner);
            }
        }

        let plan = RemovalPlan::from_state(state);
        let _ = writeln!(
            out,
            "{}",
            format!(
                "{} packages will be uninstalled, including {}",
                plan.len(),
                state.target
            )
            .dimmed()
        );
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
