use crate::config::Config;
use crate::index::{parse_metadata, parse_requires_txt, IndexError, InstalledPackage, PackageIndex};
use indicatif::{ProgressBar, ProgressStyle};
use miette::{IntoDiagnostic, Result, WrapErr};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

/// Kind of distribution metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistKind {
    /// `name-version.dist-info/` directory (wheels)
    DistInfo,
    /// `name-version.egg-info/` directory (setuptools develop / legacy installs)
    EggInfo,
    /// `name-version.egg-info` single PKG-INFO file (distutils)
    EggInfoFile,
}

impl DistKind {
    /// Determine the metadata kind from a search-path entry
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;

        if file_name.ends_with(".dist-info") && path.is_dir() {
            Some(DistKind::DistInfo)
        } else if file_name.ends_with(".egg-info") {
            if path.is_dir() {
                Some(DistKind::EggInfo)
            } else {
                Some(DistKind::EggInfoFile)
            }
        } else {
            None
        }
    }
}

/// A discovered distribution metadata location
#[derive(Debug, Clone)]
pub struct DistLocation {
    pub path: PathBuf,
    pub kind: DistKind,
}

impl DistLocation {
    pub fn new(path: PathBuf, kind: DistKind) -> Self {
        Self { path, kind }
    }

    /// Read and parse the metadata into an index record
    pub fn load(&self, include_extras: bool) -> Result<InstalledPackage, IndexError> {
        let metadata_path = match self.kind {
            DistKind::DistInfo => self.path.join("METADATA"),
            DistKind::EggInfo => self.path.join("PKG-INFO"),
            DistKind::EggInfoFile => self.path.clone(),
        };

        let contents = read(&metadata_path)?;
        let mut meta = parse_metadata(&contents).ok_or_else(|| IndexError::Metadata {
            path: metadata_path.clone(),
            reason: "missing Name header".to_string(),
        })?;

        if self.kind == DistKind::EggInfo {
            let requires = self.path.join("requires.txt");
            if requires.is_file() {
                meta.requirements.extend(parse_requires_txt(&read(&requires)?));
            }
        }

        Ok(InstalledPackage::from_metadata(meta, include_extras).with_location(self.path.clone()))
    }
}

fn read(path: &Path) -> Result<String, IndexError> {
    std::fs::read_to_string(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Finds installed distributions on the interpreter's search path
pub struct DistFinder<'a> {
    config: &'a Config,
    show_progress: bool,
}

impl<'a> DistFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Directories to scan: the configured site-packages, or the
    /// interpreter's `sys.path`
    pub fn search_paths(&self) -> Result<Vec<PathBuf>> {
        if !self.config.site_packages.is_empty() {
            return Ok(self.config.site_packages.clone());
        }
        interpreter_paths(&self.config.python)
    }

    /// Find distribution metadata in the given directories, in search order
    pub fn find_distributions(&self, roots: &[PathBuf]) -> Vec<DistLocation> {
        roots
            .iter()
            .flat_map(|root| self.scan_directory(root))
            .collect()
    }

    fn scan_directory(&self, dir: &Path) -> Vec<DistLocation> {
        if !dir.is_dir() {
            trace!("Directory does not exist: {}", dir.display());
            return Vec::new();
        }

        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                let kind = DistKind::from_path(path)?;
                trace!("Found {:?}: {}", kind, path.display());
                Some(DistLocation::new(path.to_path_buf(), kind))
            })
            .collect()
    }

    /// Discover and parse every distribution into an index.
    /// Unreadable or malformed metadata is skipped with a warning.
    pub fn build_index(&self) -> Result<PackageIndex> {
        let roots = self.search_paths()?;
        debug!("Scanning {} search paths", roots.len());

        let locations = self.find_distributions(&roots);
        debug!("Found {} distributions", locations.len());

        let pb = if self.show_progress {
            let pb = ProgressBar::new(locations.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} reading metadata")
                    .into_diagnostic()?
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        let include_extras = self.config.include_extras;
        let loaded: Vec<_> = locations
            .par_iter()
            .map(|location| {
                let result = location.load(include_extras);
                pb.inc(1);
                result
            })
            .collect();
        pb.finish_and_clear();

        let mut index = PackageIndex::new();
        for result in loaded {
            match result {
                Ok(package) => {
                    index.insert(package);
                }
                Err(e) => warn!("Skipping distribution: {}", e),
            }
        }

        debug!("{} packages found", index.len());
        Ok(index)
    }
}

/// Ask `python` for its `sys.path`, keeping existing directories only
pub fn interpreter_paths(python: &str) -> Result<Vec<PathBuf>> {
    let output = Command::new(python)
        .args(["-c", "import sys\nfor p in sys.path:\n    print(p)"])
        .output()
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to run Python interpreter '{}'", python))?;

    if !output.status.success() {
        return Err(miette::miette!(
            "Python interpreter '{}' exited with {}: {}",
            python,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let paths = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .filter(|path| path.is_dir())
        .collect();

    Ok(paths)
}
