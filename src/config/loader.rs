use crate::index::normalize_name;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a pip-remove run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Packages that are never proposed for removal.
    /// Entries may use a leading or trailing `*` wildcard.
    pub protected: Vec<String>,

    /// Python interpreter used for discovery and for running pip
    pub python: String,

    /// Site-packages directories to scan instead of asking the interpreter
    pub site_packages: Vec<PathBuf>,

    /// Treat requirements guarded by an `extra == "..."` marker as dependencies
    pub include_extras: bool,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protected: vec![
                "pip".to_string(),
                "setuptools".to_string(),
                "wheel".to_string(),
            ],
            python: default_python().to_string(),
            site_packages: vec![],
            include_extras: true,
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
        }
    }
}

fn default_python() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(dir: &Path) -> Result<Self> {
        let default_names = [
            ".pip-remove.yml",
            ".pip-remove.yaml",
            ".pip-remove.toml",
            "pip-remove.yml",
            "pip-remove.yaml",
            "pip-remove.toml",
        ];

        for name in &default_names {
            let path = dir.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Check if a package must never be proposed for removal
    pub fn is_protected(&self, name: &str) -> bool {
        let name = normalize_name(name);
        self.protected
            .iter()
            .any(|pattern| name_match(&normalize_name(pattern), &name))
    }
}

/// Wildcard matching for patterns like "types-*" or "*-stubs"
fn name_match(pattern: &str, name: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    if let Some(suffix) = pattern.strip_prefix('*') {
        return name.ends_with(suffix);
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        return name.starts_with(prefix);
    }

    name == pattern
}
