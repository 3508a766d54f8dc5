mod json;
mod terminal;

pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::resolver::ResolutionState;
use miette::Result;
use std::path::PathBuf;

/// Output format for reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

impl ReportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "terminal" => Some(ReportFormat::Terminal),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Reporter for resolution results.
///
/// Terminal output is printed per target as soon as it is resolved; JSON
/// output is collected and written by [`Reporter::finish`].
pub struct Reporter {
    format: ReportFormat,
    quiet: bool,
    json: JsonReporter,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            quiet: false,
            json: JsonReporter::new(output_path),
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Report one resolved target
    pub fn report(&mut self, state: &ResolutionState, resolved: bool) {
        match self.format {
            ReportFormat::Terminal => {
                if !self.quiet {
                    TerminalReporter::new().report(state, resolved);
                }
            }
            ReportFormat::Json => self.json.add(state, resolved),
        }
    }

    pub fn finish(&self) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => Ok(()),
            ReportFormat::Json => self.json.finish(),
        }
    }
}
