mod colors;
mod compact;
mod json;
mod terminal;

pub use compact::CompactReporter;
pub use json::JsonReporter;
pub use terminal::TerminalReporter;

use crate::analysis::AnalysisResult;
use crate::error::{LintError, Result};
use std::path::{Path, PathBuf};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Colored output grouped by file
    #[default]
    Terminal,
    /// One line per diagnostic
    Compact,
    /// JSON machine-readable format
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" | "text" => Ok(ReportFormat::Terminal),
            "compact" => Ok(ReportFormat::Compact),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

/// Options for report generation
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Write the report here instead of stdout
    pub output_path: Option<PathBuf>,
    /// Base path to strip from file paths for shorter display
    pub base_path: Option<PathBuf>,
}

/// Reporter for analysis results
pub struct Reporter {
    format: ReportFormat,
    options: ReportOptions,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            options: ReportOptions {
                output_path,
                ..Default::default()
            },
        }
    }

    pub fn with_options(format: ReportFormat, options: ReportOptions) -> Self {
        Self { format, options }
    }

    /// Render the result in the configured format
    pub fn render(&self, result: &AnalysisResult) -> Result<String> {
        let base = self.options.base_path.clone();
        match self.format {
            ReportFormat::Terminal => {
                let mut reporter = TerminalReporter::new();
                if let Some(base) = base {
                    reporter = reporter.with_base_path(base);
                }
                Ok(reporter.render(result))
            }
            ReportFormat::Compact => {
                let mut reporter = CompactReporter::new();
                if let Some(base) = base {
                    reporter = reporter.with_base_path(base);
                }
                Ok(reporter.render(result))
            }
            ReportFormat::Json => {
                let mut reporter = JsonReporter::new();
                if let Some(base) = base {
                    reporter = reporter.with_base_path(base);
                }
                reporter.render(result)
            }
        }
    }

    /// Print the report, or write it to the output file
    pub fn report(&self, result: &AnalysisResult) -> Result<()> {
        let rendered = self.render(result)?;
        match &self.options.output_path {
            Some(path) => std::fs::write(path, rendered).map_err(|e| LintError::io(path, e)),
            None => {
                print!("{}", rendered);
                Ok(())
            }
        }
    }
}

/// Display form of `path`, relative to `base` when possible
pub(crate) fn display_path(path: &Path, base: Option<&Path>) -> String {
    let relative = match base {
        Some(base) => path.strip_prefix(base).unwrap_or(path),
        None => path,
    };
    relative.display().to_string().replace('\\', "/")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("text".parse::<ReportFormat>(), Ok(ReportFormat::Terminal));
        assert!("sarif".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_display_path() {
        let path = Path::new("/project/app/Main.kt");
        assert_eq!(display_path(path, Some(Path::new("/project"))), "app/Main.kt");
        assert_eq!(display_path(path, Some(Path::new("/other"))), "/project/app/Main.kt");
        assert_eq!(display_path(path, None), "/project/app/Main.kt");
    }

    #[test]
    fn test_report_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("report.json");
        let reporter = Reporter::new(ReportFormat::Json, Some(output.clone()));
        reporter.report(&fixtures::result()).unwrap();
        let written = std::fs::read_to_string(output).unwrap();
        assert!(written.contains("\"GlobalScopeUsage\""));
    }
}
