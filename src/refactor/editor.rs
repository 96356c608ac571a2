//! Applies diagnostic fixes to source text
//!
//! Fixes of one file are applied from the end of the file towards the start, so
//! byte offsets of the fixes still pending stay valid. A fix overlapping one
//! that was already applied is skipped.

use crate::analysis::{Diagnostic, Fix, FixEdit};
use crate::error::{LintError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Counters for one batch of fixes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixSummary {
    pub files_modified: usize,
    pub fixes_applied: usize,
    /// Text or pattern no longer found inside the fix range
    pub fixes_failed: usize,
    /// Overlapped a fix applied earlier
    pub fixes_skipped: usize,
    pub modified_files: Vec<PathBuf>,
    pub errors: Vec<String>,
}

impl FixSummary {
    fn absorb(&mut self, other: TextOutcome) {
        self.fixes_applied += other.applied;
        self.fixes_failed += other.failed;
        self.fixes_skipped += other.skipped;
    }
}

/// Result of fixing one text buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOutcome {
    pub text: String,
    pub applied: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Collects fixes from diagnostics and writes them back to disk
pub struct FixApplier {
    dry_run: bool,
    fixes_by_file: BTreeMap<PathBuf, Vec<Fix>>,
}

impl FixApplier {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            fixes_by_file: BTreeMap::new(),
        }
    }

    pub fn collect(&mut self, diagnostics: &[Diagnostic]) {
        for fix in diagnostics.iter().filter_map(|d| d.fix.as_ref()) {
            self.add_fix(fix.clone());
        }
    }

    pub fn add_fix(&mut self, fix: Fix) {
        self.fixes_by_file
            .entry(fix.range.file.clone())
            .or_default()
            .push(fix);
    }

    pub fn pending(&self) -> usize {
        self.fixes_by_file.values().map(Vec::len).sum()
    }

    /// Apply every collected fix; files are only written outside dry-run mode
    pub fn apply_all(&self) -> FixSummary {
        let mut summary = FixSummary::default();

        for (path, fixes) in &self.fixes_by_file {
            let original = match std::fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    summary.fixes_failed += fixes.len();
                    summary.errors.push(LintError::io(path, e).to_string());
                    continue;
                }
            };

            let outcome = match apply_to_text(&original, fixes) {
                Ok(outcome) => outcome,
                Err(e) => {
                    summary.fixes_failed += fixes.len();
                    summary.errors.push(e.to_string());
                    continue;
                }
            };

            let changed = outcome.text != original;
            let text = outcome.text.clone();
            summary.absorb(outcome);
            if !changed {
                continue;
            }

            if self.dry_run {
                debug!("Would modify {}", path.display());
            } else if let Err(e) = std::fs::write(path, text) {
                warn!("Failed to write {}: {}", path.display(), e);
                summary.errors.push(LintError::io(path, e).to_string());
                continue;
            }
            summary.files_modified += 1;
            summary.modified_files.push(path.clone());
        }
        summary
    }
}

/// Apply fixes to one buffer, last range first
pub fn apply_to_text(text: &str, fixes: &[Fix]) -> Result<TextOutcome> {
    let mut ordered: Vec<&Fix> = fixes.iter().collect();
    ordered.sort_by(|a, b| {
        b.range
            .start_byte
            .cmp(&a.range.start_byte)
            .then(b.range.end_byte.cmp(&a.range.end_byte))
    });

    let mut outcome = TextOutcome {
        text: text.to_string(),
        applied: 0,
        failed: 0,
        skipped: 0,
    };
    // start of the lowest range rewritten so far
    let mut frontier = usize::MAX;

    for fix in ordered {
        if fix.range.end_byte > frontier {
            outcome.skipped += 1;
            continue;
        }
        match apply_one(&outcome.text, fix)? {
            Some(rewritten) => {
                outcome.text = rewritten;
                outcome.applied += 1;
                frontier = fix.range.start_byte;
            }
            None => outcome.failed += 1,
        }
    }
    Ok(outcome)
}

/// Rewrite the fix range; `None` when the expected text is not there
fn apply_one(text: &str, fix: &Fix) -> Result<Option<String>> {
    let start = fix.range.start_byte;
    let end = fix.range.end_byte;
    let Some(window) = text.get(start..end) else {
        return Ok(None);
    };

    let (offset, len, replacement) = match &fix.edit {
        FixEdit::Replace { text: old, replacement } => match window.find(old.as_str()) {
            Some(offset) => (offset, old.len(), replacement.as_str()),
            None => return Ok(None),
        },
        FixEdit::ReplacePattern { pattern, replacement } => {
            let regex = Regex::new(pattern).map_err(|source| LintError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
            match regex.find(window) {
                Some(m) => (m.start(), m.len(), replacement.as_str()),
                None => return Ok(None),
            }
        }
    };

    let mut rewritten = String::with_capacity(text.len() + replacement.len());
    rewritten.push_str(&text[..start + offset]);
    rewritten.push_str(replacement);
    rewritten.push_str(&text[start + offset + len..]);
    Ok(Some(rewritten))
}
