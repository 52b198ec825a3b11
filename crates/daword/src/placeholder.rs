//! `{{ variable }}` placeholder extraction.
//!
//! A placeholder is an identifier wrapped in double braces with optional
//! interior whitespace. Scanning keeps the first occurrence of each name,
//! in document order, and is recomputed from scratch on every call.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

const PLACEHOLDER_PATTERN: &str = r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}";

const QUESTION_PREFIX: &str = "What is the ";
const QUESTION_SUFFIX: &str = "?";

#[allow(clippy::expect_used)]
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern compiles"));

#[allow(clippy::expect_used)]
static CASE_BOUNDARY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("([a-z])([A-Z])").expect("case boundary pattern compiles"));

/// A variable found in document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    /// Identifier between the braces (e.g. `client_name`)
    pub name: String,
    /// Full text of the first match, braces included
    pub raw_text: String,
    /// Question derived from the name (e.g. `What is the client name?`)
    pub question: String,
}

impl Placeholder {
    fn new(name: &str, raw_text: &str) -> Self {
        Self {
            name: name.to_string(),
            raw_text: raw_text.to_string(),
            question: question_from_variable(name),
        }
    }

    /// The question without its `What is the ` / `?` framing.
    ///
    /// This is the field label used in generated interview templates.
    #[must_use]
    pub fn label(&self) -> &str {
        let label = self
            .question
            .strip_prefix(QUESTION_PREFIX)
            .unwrap_or(&self.question);
        label.strip_suffix(QUESTION_SUFFIX).unwrap_or(label)
    }
}

/// Extract placeholders from plain text.
///
/// Names are unique and ordered by first appearance. Text without any
/// placeholder yields an empty list.
#[must_use]
pub fn scan_text(text: &str) -> Vec<Placeholder> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let (Some(full), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if seen.insert(name.as_str()) {
            found.push(Placeholder::new(name.as_str(), full.as_str()));
        }
    }

    found
}

/// Turn a variable name into a readable question.
///
/// `client_name` -> `What is the client name?`,
/// `someMixedCase` -> `What is the some mixed case?`
#[must_use]
pub fn question_from_variable(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let split = CASE_BOUNDARY_RE.replace_all(&spaced, "${1} ${2}");
    format!(
        "{}{}{}",
        QUESTION_PREFIX,
        split.to_lowercase(),
        QUESTION_SUFFIX
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn names(found: &[Placeholder]) -> Vec<&str> {
        found.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_question_from_snake_case() {
        assert_eq!(
            question_from_variable("client_name"),
            "What is the client name?"
        );
    }

    #[test]
    fn test_question_from_mixed_case() {
        assert_eq!(
            question_from_variable("someMixedCase"),
            "What is the some mixed case?"
        );
    }

    #[test]
    fn test_question_consecutive_capitals() {
        // Only lower->upper transitions get a space.
        assert_eq!(question_from_variable("aBC"), "What is the a bc?");
        assert_eq!(question_from_variable("URL"), "What is the url?");
    }

    #[test]
    fn test_question_mixed_underscore_and_case() {
        assert_eq!(
            question_from_variable("_partyName_2"),
            "What is the  party name 2?"
        );
    }

    #[test]
    fn test_scan_orders_by_first_occurrence() {
        let text = "Dear {{ client_name }}, re {{matter}}. Regards {{ client_name }} at {{ address }}.";
        let found = scan_text(text);
        assert_eq!(names(&found), vec!["client_name", "matter", "address"]);
    }

    #[test]
    fn test_scan_keeps_first_raw_text() {
        let text = "{{client_name}} and later {{   client_name   }}";
        let found = scan_text(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw_text, "{{client_name}}");
        assert_eq!(found[0].question, "What is the client name?");
    }

    #[test]
    fn test_scan_allows_newlines_and_tabs_inside_braces() {
        let found = scan_text("{{\n\tfee_amount \n}}");
        assert_eq!(names(&found), vec!["fee_amount"]);
    }

    #[test]
    fn test_scan_no_placeholders() {
        assert!(scan_text("").is_empty());
        assert!(scan_text("Plain contract text with { single } braces.").is_empty());
    }

    #[test]
    fn test_scan_rejects_invalid_identifiers() {
        let text = "{{ 1st_party }} {{ first-party }} {{ }} {{ two words }}";
        assert!(scan_text(text).is_empty());
    }

    #[test]
    fn test_scan_ignores_expressions() {
        // Attribute access is not a bare identifier.
        assert!(scan_text("{{ client.name }}").is_empty());
    }

    #[test]
    fn test_scan_is_recomputed_each_call() {
        let first = scan_text("{{ a }} {{ b }}");
        let second = scan_text("{{ b }}");
        assert_eq!(names(&first), vec!["a", "b"]);
        assert_eq!(names(&second), vec!["b"]);
    }

    #[test]
    fn test_label_strips_question_framing() {
        let found = scan_text("{{ someMixedCase }}");
        assert_eq!(found[0].label(), "some mixed case");
    }
}
