//! Local rule-based analysis of error text

use crate::knowledge::{self, ErrorPattern};

/// Advice used when no category matches.
pub const GENERIC_SUGGESTIONS: &[&str] = &[
    "Try searching online for this error message",
    "Check the official documentation for the command",
    "Verify your inputs and try with --help flag",
];

/// Result of running the rule table over one error message.
#[derive(Debug)]
pub struct RuleAnalysis {
    /// Matched category name, when one applied.
    pub error_type: Option<&'static str>,
    /// Fixes to present, never empty.
    pub suggestions: Vec<String>,
    /// Illustrative commands, only for a matched category.
    pub examples: Vec<String>,
}

impl RuleAnalysis {
    /// Whether a known category matched.
    pub fn matched(&self) -> bool {
        self.error_type.is_some()
    }

    fn from_pattern(pattern: &'static ErrorPattern) -> Self {
        Self {
            error_type: Some(pattern.name),
            suggestions: pattern.solutions.iter().map(|s| s.to_string()).collect(),
            examples: pattern.examples.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn unmatched() -> Self {
        Self {
            error_type: None,
            suggestions: GENERIC_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            examples: Vec::new(),
        }
    }
}

/// Match `error_text` against the knowledge base.
///
/// Blank input and unrecognized errors both come back unmatched carrying the
/// generic suggestions, so the suggestion list is never empty.
pub fn analyze(error_text: &str) -> RuleAnalysis {
    if error_text.trim().is_empty() {
        return RuleAnalysis::unmatched();
    }

    match knowledge::find_error_pattern(error_text) {
        Some(pattern) => RuleAnalysis::from_pattern(pattern),
        None => RuleAnalysis::unmatched(),
    }
}
