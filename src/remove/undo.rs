use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Generates a shell script that reinstalls uninstalled packages
pub struct UndoScript {
    python: String,
    /// Package name -> version at removal time
    packages: BTreeMap<String, Option<String>>,
}

impl UndoScript {
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            packages: BTreeMap::new(),
        }
    }

    /// Record a package before it is removed
    pub fn record_package(&mut self, name: &str, version: Option<&str>) {
        self.packages
            .entry(name.to_string())
            .or_insert_with(|| version.map(str::to_string));
    }

    /// Render the script text
    pub fn render(&self) -> String {
        let mut script = String::new();

        script.push_str("#!/bin/sh\n");
        script.push_str("# pip-remove undo script\n");
        script.push_str("# Generated automatically - run to reinstall removed packages\n");
        script.push('\n');
        script.push_str("set -e\n");
        script.push('\n');

        let requirements: Vec<String> = self
            .packages
            .iter()
            .map(|(name, version)| match version {
                Some(version) => shell_quote(&format!("{}=={}", name, version)),
                None => shell_quote(name),
            })
            .collect();

        if !requirements.is_empty() {
            script.push_str(&format!(
                "{} -m pip install {}\n",
                shell_quote(&self.python),
                requirements.join(" ")
            ));
        }

        script
    }

    /// Write the undo script to a file
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render()).into_diagnostic()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path).into_diagnostic()?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(path, perms).into_diagnostic()?;
        }

        Ok(())
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}
