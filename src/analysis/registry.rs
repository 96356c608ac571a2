//! Rule registry
//!
//! Maps the enabled rules onto detector instances. Call detectors are stateless
//! and built once; resource detectors accumulate project-wide state, so a fresh
//! set is built for every run.

use super::detectors::{
    Detector, GlobalScopeUsageDetector, JobInBuilderUsageDetector, RawColorUsageDetector,
    ResourceDetector, DEFAULT_COLORS_FILE,
};
use super::{RuleId, Severity};
use crate::config::Config;
use std::collections::BTreeMap;

pub struct IssueRegistry {
    call_detectors: Vec<Box<dyn Detector>>,
    raw_color_enabled: bool,
    colors_file: String,
    severities: BTreeMap<RuleId, Severity>,
}

impl IssueRegistry {
    /// Every rule enabled with its default severity
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Self {
        let mut call_detectors: Vec<Box<dyn Detector>> = Vec::new();
        if config.is_enabled(RuleId::GlobalScopeUsage) {
            call_detectors.push(Box::new(GlobalScopeUsageDetector::new()));
        }
        if config.is_enabled(RuleId::JobInBuilderUsage) {
            call_detectors.push(Box::new(JobInBuilderUsageDetector::new()));
        }

        let severities = RuleId::ALL
            .into_iter()
            .map(|rule| (rule, config.severity(rule)))
            .collect();

        let colors_file = if config.colors_file.is_empty() {
            DEFAULT_COLORS_FILE.to_string()
        } else {
            config.colors_file.clone()
        };

        Self {
            call_detectors,
            raw_color_enabled: config.is_enabled(RuleId::RawColorUsage),
            colors_file,
            severities,
        }
    }

    /// All known rules, enabled or not
    pub fn rules() -> &'static [RuleId] {
        &RuleId::ALL
    }

    pub fn enabled_rules(&self) -> Vec<RuleId> {
        let mut rules: Vec<RuleId> = self.call_detectors.iter().map(|d| d.rule()).collect();
        if self.raw_color_enabled {
            rules.push(RuleId::RawColorUsage);
        }
        rules.sort();
        rules
    }

    pub fn is_enabled(&self, rule: RuleId) -> bool {
        self.enabled_rules().contains(&rule)
    }

    pub fn severity(&self, rule: RuleId) -> Severity {
        self.severities
            .get(&rule)
            .copied()
            .unwrap_or_else(|| rule.default_severity())
    }

    pub fn call_detectors(&self) -> &[Box<dyn Detector>] {
        &self.call_detectors
    }

    /// Fresh resource detectors for one run
    pub fn resource_detectors(&self) -> Vec<Box<dyn ResourceDetector>> {
        let mut detectors: Vec<Box<dyn ResourceDetector>> = Vec::new();
        if self.raw_color_enabled {
            detectors.push(Box::new(RawColorUsageDetector::with_colors_file(
                &self.colors_file,
            )));
        }
        detectors
    }

    pub fn has_resource_detectors(&self) -> bool {
        self.raw_color_enabled
    }
}

impl Default for IssueRegistry {
    fn default() -> Self {
        Self::new()
    }
}
