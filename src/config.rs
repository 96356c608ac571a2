//! Configuration loading
//!
//! Reads `.coroutinelint.yml`, `.coroutinelint.yaml` or `coroutinelint.toml`
//! from the project root. Every field has a default, so an absent file means
//! "all rules on, warnings only".

use crate::analysis::detectors::DEFAULT_COLORS_FILE;
use crate::analysis::{RuleId, Severity};
use crate::error::{LintError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File names probed in the project root, in order
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
    [".coroutinelint.yml", ".coroutinelint.yaml", "coroutinelint.toml"];

/// Per-rule settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub enabled: bool,
    /// Replaces the rule's default severity
    pub severity: Option<Severity>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories to analyse, relative to the project root (empty = whole project)
    pub targets: Vec<PathBuf>,

    /// Glob patterns of files to skip
    pub exclude: Vec<String>,

    /// Rule settings keyed by rule id or code
    pub rules: BTreeMap<String, RuleConfig>,

    /// Artifacts assumed present in addition to the scanned Gradle files
    pub dependencies: Vec<String>,

    /// Path suffix of the canonical colors file
    pub colors_file: String,

    /// Parse and visit files on the rayon pool
    pub parallel: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            exclude: Vec::new(),
            rules: BTreeMap::new(),
            dependencies: Vec::new(),
            colors_file: DEFAULT_COLORS_FILE.to_string(),
            parallel: true,
        }
    }
}

impl Config {
    /// Load from an explicit file; the format follows the extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| LintError::io(path, e))?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&content)?,
            Some("yml") | Some("yaml") => Self::from_yaml(&content)?,
            other => {
                return Err(LintError::Config(format!(
                    "unsupported config format {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                )))
            }
        };
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// First config file found in `root`, or defaults
    pub fn from_default_locations(root: &Path) -> Result<Self> {
        for name in DEFAULT_CONFIG_FILES {
            let candidate = root.join(name);
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
        }
        Ok(Self::default())
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reject rule keys that name no known rule
    pub fn validate(&self) -> Result<()> {
        for key in self.rules.keys() {
            if RuleId::from_id(key).is_none() {
                return Err(LintError::Config(format!("unknown rule '{key}'")));
            }
        }
        Ok(())
    }

    /// Effective settings for one rule
    pub fn rule(&self, rule: RuleId) -> RuleConfig {
        self.rules
            .iter()
            .find(|(key, _)| RuleId::from_id(key) == Some(rule))
            .map(|(_, config)| config.clone())
            .unwrap_or_default()
    }

    pub fn is_enabled(&self, rule: RuleId) -> bool {
        self.rule(rule).enabled
    }

    pub fn severity(&self, rule: RuleId) -> Severity {
        self.rule(rule).severity.unwrap_or_else(|| rule.default_severity())
    }

    /// Turn a rule off, as `--disable` does
    pub fn disable(&mut self, rule: RuleId) {
        self.rules
            .retain(|key, _| RuleId::from_id(key) != Some(rule));
        self.rules.insert(
            rule.id().to_string(),
            RuleConfig {
                enabled: false,
                severity: None,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.parallel);
        assert_eq!(config.colors_file, "res/values/colors.xml");
        for rule in RuleId::ALL {
            assert!(config.is_enabled(rule));
            assert_eq!(config.severity(rule), Severity::Warning);
        }
    }

    #[test]
    fn test_yaml_rules_by_id_or_code() {
        let yaml = r#"
exclude:
  - "**/generated/**"
rules:
  GlobalScopeUsage:
    severity: error
  CL003:
    enabled: false
dependencies:
  - androidx.lifecycle:lifecycle-viewmodel-ktx
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.severity(RuleId::GlobalScopeUsage), Severity::Error);
        assert!(config.is_enabled(RuleId::GlobalScopeUsage));
        assert!(!config.is_enabled(RuleId::RawColorUsage));
        assert!(config.is_enabled(RuleId::JobInBuilderUsage));
        assert_eq!(config.exclude, vec!["**/generated/**".to_string()]);
        assert_eq!(config.dependencies.len(), 1);
    }

    #[test]
    fn test_toml() {
        let toml = r#"
colors_file = "src/main/res/values/colors.xml"
parallel = false

[rules.JobInBuilderUsage]
severity = "info"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert!(!config.parallel);
        assert_eq!(config.colors_file, "src/main/res/values/colors.xml");
        assert_eq!(config.severity(RuleId::JobInBuilderUsage), Severity::Info);
    }

    #[test]
    fn test_unknown_rule_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".coroutinelint.yml");
        std::fs::write(&path, "rules:\n  NoSuchRule:\n    enabled: false\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(LintError::Config(_))));
    }

    #[test]
    fn test_default_locations() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::from_default_locations(dir.path()).unwrap(), Config::default());

        std::fs::write(dir.path().join("coroutinelint.toml"), "exclude = [\"a/**\"]\n").unwrap();
        let config = Config::from_default_locations(dir.path()).unwrap();
        assert_eq!(config.exclude, vec!["a/**".to_string()]);
    }

    #[test]
    fn test_disable_overrides_existing_entry() {
        let mut config = Config::from_yaml("rules:\n  cl001:\n    severity: error\n").unwrap();
        config.disable(RuleId::GlobalScopeUsage);
        assert!(!config.is_enabled(RuleId::GlobalScopeUsage));
        assert_eq!(config.rules.len(), 1);
    }
}
