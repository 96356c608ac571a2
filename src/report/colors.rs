//! Centralized color scheme for consistent output formatting
//!
//! Based on Rust compiler diagnostics design (RFC 1644)

use crate::analysis::Severity;
use colored::{ColoredString, Colorize};

/// Marks whether a diagnostic carries an automatic fix
pub struct FixIndicator;

impl FixIndicator {
    pub fn fixable() -> ColoredString {
        "✓ fix".green()
    }

    pub fn manual() -> ColoredString {
        "manual".dimmed()
    }

    pub fn for_diagnostic(has_fix: bool) -> ColoredString {
        if has_fix {
            Self::fixable()
        } else {
            Self::manual()
        }
    }
}

/// Structural element colors
pub struct StructureColors;

impl StructureColors {
    /// File path header
    pub fn file_path(text: &str) -> ColoredString {
        text.cyan().bold()
    }

    /// Line/column numbers
    pub fn location(text: &str) -> ColoredString {
        text.dimmed()
    }

    /// Rule code (e.g., CL001)
    pub fn rule_code(text: &str) -> ColoredString {
        text.magenta()
    }

    /// Rule id or replacement text
    pub fn symbol_name(text: &str) -> ColoredString {
        text.white().bold()
    }

    /// Count/statistics numbers
    pub fn count(text: &str) -> ColoredString {
        text.white().bold()
    }
}

/// Severity symbols for compact display
pub struct SeveritySymbol;

impl SeveritySymbol {
    pub fn error() -> &'static str {
        "✖"
    }

    pub fn warning() -> &'static str {
        "⚠"
    }

    pub fn info() -> &'static str {
        "ℹ"
    }

    pub fn colored(severity: &Severity) -> ColoredString {
        match severity {
            Severity::Error => Self::error().red().bold(),
            Severity::Warning => Self::warning().yellow(),
            Severity::Info => Self::info().blue(),
        }
    }
}

/// Box drawing characters
pub struct BoxChars;

impl BoxChars {
    /// Heavy separator line
    pub fn heavy_line(width: usize) -> String {
        "━".repeat(width)
    }

    /// Light separator line
    pub fn light_line(width: usize) -> String {
        "─".repeat(width)
    }
}
