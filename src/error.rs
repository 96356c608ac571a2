//! Error types for the lint engine
//!
//! Errors only surface for problems with the run itself (unreadable files,
//! bad configuration). Unresolved symbols and malformed entries inside a file
//! are never errors; detectors treat them as "no match".

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum LintError {
    #[diagnostic(code(coroutinelint::io))]
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[diagnostic(code(coroutinelint::parse))]
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[diagnostic(code(coroutinelint::xml))]
    #[error("invalid XML in {}: {message}", .path.display())]
    Xml { path: PathBuf, message: String },

    #[diagnostic(code(coroutinelint::config::yaml))]
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[diagnostic(code(coroutinelint::config::toml))]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[diagnostic(code(coroutinelint::json))]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[diagnostic(code(coroutinelint::config), help("see .coroutinelint.yml for the accepted keys"))]
    #[error("invalid configuration: {0}")]
    Config(String),

    #[diagnostic(code(coroutinelint::fix))]
    #[error("invalid fix pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[diagnostic(code(coroutinelint::walk))]
    #[error("file discovery failed: {0}")]
    Walk(#[from] ignore::Error),
}

impl LintError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LintError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LintError>;
