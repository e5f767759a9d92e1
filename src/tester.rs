//! Live pattern tester
//!
//! Gives immediate, non-authoritative feedback on whether a generated
//! pattern behaves as intended by compiling the preview pattern with the
//! `regex` crate and running it against a user-editable sample string. The
//! preview dialect is narrower than .NET's, so a pattern may be absent
//! entirely; that is reported as a notice rather than an error.
//!
//! Evaluation is pure and synchronous: no caching, no network, no shared
//! state. Callers re-run [`evaluate`] whenever either input changes.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default sample text seeded into the tester
pub const DEFAULT_SAMPLE: &str = "abc+def+ghi+jkl.mno";

/// Notice shown when no preview pattern was provided by the generator
pub const UNSUPPORTED_NOTICE: &str =
    "The generated C# regex uses features not supported by the preview engine. \
     Use the C# code snippet to test accurately.";

/// Notice shown when the preview pattern fails to compile
pub const COMPILE_FAILED_NOTICE: &str = "Invalid preview regex pattern.";

/// A single match: the matched substring and its byte offset in the sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub matched_text: String,
    pub start_index: usize,
}

/// Result of one tester evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TesterOutcome {
    /// No preview-dialect pattern exists for the generated solution
    Unsupported,
    /// The preview pattern is not a valid regex
    CompileError { message: String },
    /// Compiled cleanly but the sample contains no occurrence
    NoMatch,
    /// First occurrence in left-to-right scan order
    Match(MatchOutcome),
}

impl TesterOutcome {
    /// The match, when one was found
    pub fn match_outcome(&self) -> Option<&MatchOutcome> {
        match self {
            TesterOutcome::Match(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// User-facing notice text for the states that carry one
    pub fn notice(&self) -> Option<String> {
        match self {
            TesterOutcome::Unsupported => Some(UNSUPPORTED_NOTICE.to_string()),
            TesterOutcome::CompileError { .. } => Some(COMPILE_FAILED_NOTICE.to_string()),
            TesterOutcome::NoMatch | TesterOutcome::Match(_) => None,
        }
    }
}

/// Rendering split of the sample around the match
///
/// When there is no match, `prefix` carries the whole sample and the other
/// segments are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub prefix: String,
    pub matched: String,
    pub suffix: String,
}

/// Evaluate a preview pattern against sample text.
///
/// Absent pattern and compile failure are terminal until the inputs change;
/// neither is retryable. On success the first occurrence in left-to-right
/// scan order is reported.
pub fn evaluate(preview_pattern: Option<&str>, sample_text: &str) -> TesterOutcome {
    let Some(pattern) = preview_pattern else {
        return TesterOutcome::Unsupported;
    };

    let regex = match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => {
            return TesterOutcome::CompileError {
                message: err.to_string(),
            }
        }
    };

    match regex.find(sample_text) {
        Some(found) => TesterOutcome::Match(MatchOutcome {
            matched_text: found.as_str().to_string(),
            start_index: found.start(),
        }),
        None => TesterOutcome::NoMatch,
    }
}

/// Split the sample into prefix / matched / suffix for rendering
pub fn highlight(sample_text: &str, outcome: &TesterOutcome) -> Highlight {
    match outcome.match_outcome() {
        Some(found) => {
            let end = found.start_index + found.matched_text.len();
            Highlight {
                prefix: sample_text[..found.start_index].to_string(),
                matched: sample_text[found.start_index..end].to_string(),
                suffix: sample_text[end..].to_string(),
            }
        }
        None => Highlight {
            prefix: sample_text.to_string(),
            matched: String::new(),
            suffix: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_pattern_is_unsupported() {
        let outcome = evaluate(None, DEFAULT_SAMPLE);
        assert_eq!(outcome, TesterOutcome::Unsupported);
        assert!(outcome.match_outcome().is_none());
        assert_eq!(outcome.notice().as_deref(), Some(UNSUPPORTED_NOTICE));
    }

    #[test]
    fn test_absent_pattern_ignores_sample_content() {
        assert_eq!(evaluate(None, ""), TesterOutcome::Unsupported);
        assert_eq!(evaluate(None, "anything"), TesterOutcome::Unsupported);
    }

    #[test]
    fn test_unbalanced_pattern_fails_compilation() {
        let outcome = evaluate(Some("("), DEFAULT_SAMPLE);
        assert!(matches!(outcome, TesterOutcome::CompileError { .. }));
        assert!(outcome.match_outcome().is_none());
        assert_eq!(outcome.notice().as_deref(), Some(COMPILE_FAILED_NOTICE));
    }

    #[test]
    fn test_no_occurrence_reports_no_match_without_notice() {
        let outcome = evaluate(Some("xyz"), DEFAULT_SAMPLE);
        assert_eq!(outcome, TesterOutcome::NoMatch);
        assert!(outcome.notice().is_none());
    }

    #[test]
    fn test_last_plus_fixture() {
        // A well-formed "find the last +" pattern only succeeds at the final
        // plus sign, so the leftmost viable match is the intended one.
        let outcome = evaluate(Some(r"\+[^+]*$"), DEFAULT_SAMPLE);
        let found = outcome.match_outcome().expect("fixture must match");
        assert_eq!(found.matched_text, "+jkl.mno");
        assert_eq!(found.start_index, 11);
    }

    #[test]
    fn test_first_occurrence_wins_in_scan_order() {
        let outcome = evaluate(Some(r"\+[a-z]+"), DEFAULT_SAMPLE);
        let found = outcome.match_outcome().expect("pattern occurs three times");
        assert_eq!(found.matched_text, "+def");
        assert_eq!(found.start_index, 3);
    }

    #[test]
    fn test_substring_invariant() {
        let outcome = evaluate(Some(r"\+[^+]*$"), DEFAULT_SAMPLE);
        let found = outcome.match_outcome().unwrap();
        let end = found.start_index + found.matched_text.len();
        assert_eq!(&DEFAULT_SAMPLE[found.start_index..end], found.matched_text);
    }

    #[test]
    fn test_highlight_splits_around_match() {
        let outcome = evaluate(Some(r"\+[^+]*$"), DEFAULT_SAMPLE);
        let split = highlight(DEFAULT_SAMPLE, &outcome);
        assert_eq!(split.prefix, "abc+def+ghi");
        assert_eq!(split.matched, "+jkl.mno");
        assert_eq!(split.suffix, "");
    }

    #[test]
    fn test_highlight_of_interior_match_keeps_suffix() {
        let outcome = evaluate(Some(r"\+[a-z]+"), DEFAULT_SAMPLE);
        let split = highlight(DEFAULT_SAMPLE, &outcome);
        assert_eq!(split.prefix, "abc");
        assert_eq!(split.matched, "+def");
        assert_eq!(split.suffix, "+ghi+jkl.mno");
    }

    #[test]
    fn test_highlight_unmarked_when_no_match() {
        for outcome in [
            TesterOutcome::NoMatch,
            TesterOutcome::Unsupported,
            TesterOutcome::CompileError {
                message: "unclosed group".to_string(),
            },
        ] {
            let split = highlight(DEFAULT_SAMPLE, &outcome);
            assert_eq!(split.prefix, DEFAULT_SAMPLE);
            assert!(split.matched.is_empty());
            assert!(split.suffix.is_empty());
        }
    }

    #[test]
    fn test_empty_sample_with_compilable_pattern() {
        assert_eq!(evaluate(Some("a+"), ""), TesterOutcome::NoMatch);
    }
}
