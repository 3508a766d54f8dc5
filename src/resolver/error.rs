use miette::Diagnostic;
use thiserror::Error;

/// Resolution errors. Both are fatal for the target being resolved only.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Package '{name}' not found")]
    #[diagnostic(
        code(pip_remove::package_not_found),
        help("check the spelling, or that the right interpreter or --site-packages is used")
    )]
    PackageNotFound { name: String },

    #[error("Package '{name}' is in the index but missing from the dependency graph")]
    #[diagnostic(code(pip_remove::internal))]
    Internal { name: String },
}
