//! Fix model: location-scoped literal or pattern replacements

use crate::tree::Location;
use serde::Serialize;

/// How the text inside a fix range is rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixEdit {
    /// Replace the first occurrence of `text` with `replacement`
    Replace { text: String, replacement: String },
    /// Replace the first match of the regex `pattern` with `replacement`
    ReplacePattern { pattern: String, replacement: String },
}

/// A suggested rewrite attached to a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fix {
    /// Human-readable name of the fix
    pub description: String,
    /// Range the edit is confined to
    pub range: Location,
    pub edit: FixEdit,
}

impl Fix {
    pub fn replace(
        description: impl Into<String>,
        range: Location,
        text: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            range,
            edit: FixEdit::Replace {
                text: text.into(),
                replacement: replacement.into(),
            },
        }
    }

    pub fn replace_pattern(
        description: impl Into<String>,
        range: Location,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            range,
            edit: FixEdit::ReplacePattern {
                pattern: pattern.into(),
                replacement: replacement.into(),
            },
        }
    }

    pub fn replacement(&self) -> &str {
        match &self.edit {
            FixEdit::Replace { replacement, .. } | FixEdit::ReplacePattern { replacement, .. } => {
                replacement
            }
        }
    }
}

const SPACE: &str = r"\s*";

/// Text to delete from a context composition, as a regex
///
/// Built from a core pattern, the number of parentheses wrapped around it, and
/// the operator joining it to a neighbour: a right operand swallows the
/// operator before it, a left operand the operator after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalTarget {
    core: String,
    parens: usize,
    leading_operator: Option<String>,
    trailing_operator: Option<String>,
}

impl RemovalTarget {
    /// The exact source text of a term, such as `kotlinx.coroutines.SupervisorJob()`
    pub fn term(text: &str) -> Self {
        Self {
            core: regex::escape(text),
            parens: 0,
            leading_operator: None,
            trailing_operator: None,
        }
    }

    pub fn parenthesized(mut self) -> Self {
        self.parens += 1;
        self
    }

    pub fn with_parens(mut self, parens: usize) -> Self {
        self.parens += parens;
        self
    }

    /// Also remove `operator` (and surrounding whitespace) before the term
    pub fn with_leading_operator(mut self, operator: &str) -> Self {
        self.leading_operator = Some(operator.to_string());
        self
    }

    /// Also remove `operator` (and surrounding whitespace) after the term
    pub fn with_trailing_operator(mut self, operator: &str) -> Self {
        self.trailing_operator = Some(operator.to_string());
        self
    }

    pub fn pattern(&self) -> String {
        let mut pattern = self.core.clone();
        for _ in 0..self.parens {
            pattern = format!(r"\({SPACE}{pattern}{SPACE}\)");
        }
        if let Some(op) = &self.leading_operator {
            pattern = format!("{SPACE}{}{SPACE}{pattern}", regex::escape(op));
        }
        if let Some(op) = &self.trailing_operator {
            pattern = format!("{pattern}{SPACE}{}{SPACE}", regex::escape(op));
        }
        pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn remove(target: &RemovalTarget, text: &str) -> String {
        Regex::new(&target.pattern())
            .unwrap()
            .replace(text, "")
            .into_owned()
    }

    #[test]
    fn test_plain_call() {
        let target = RemovalTarget::term("SupervisorJob()");
        assert_eq!(target.pattern(), r"SupervisorJob\(\)");
        assert_eq!(remove(&target, "SupervisorJob()"), "");
    }

    #[test]
    fn test_qualified_call_removed_whole() {
        let target =
            RemovalTarget::term("kotlinx.coroutines.SupervisorJob()").with_trailing_operator("+");
        assert_eq!(
            remove(&target, "kotlinx.coroutines.SupervisorJob() + job"),
            "job"
        );
        // the escaped dots only match themselves
        let lookalike = "kotlinxXcoroutines.SupervisorJob() + job";
        assert_eq!(remove(&target, lookalike), lookalike);
    }

    #[test]
    fn test_left_operand_swallows_trailing_operator() {
        let target = RemovalTarget::term("SupervisorJob()").with_trailing_operator("+");
        assert_eq!(
            remove(&target, "SupervisorJob() + Dispatchers.IO"),
            "Dispatchers.IO"
        );
    }

    #[test]
    fn test_right_operand_swallows_leading_operator() {
        let target = RemovalTarget::term("SupervisorJob()").with_leading_operator("+");
        assert_eq!(
            remove(&target, "Dispatchers.IO + SupervisorJob()"),
            "Dispatchers.IO"
        );
    }

    #[test]
    fn test_parenthesized_operand() {
        let target = RemovalTarget::term("SupervisorJob()")
            .parenthesized()
            .with_leading_operator("+");
        assert_eq!(
            remove(&target, "Dispatchers.IO + ( SupervisorJob() )"),
            "Dispatchers.IO"
        );
    }

    #[test]
    fn test_nested_parens() {
        let target = RemovalTarget::term("SupervisorJob()").with_parens(2);
        assert_eq!(target.pattern(), r"\(\s*\(\s*SupervisorJob\(\)\s*\)\s*\)");
        assert_eq!(remove(&target, "((SupervisorJob()))"), "");
    }
}
