mod dist_finder;

pub use dist_finder::{interpreter_paths, DistFinder, DistKind, DistLocation};
