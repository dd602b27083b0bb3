use crate::domain::test_case::{CandidateTestCase, RawTestCase, DEFAULT_CATEGORY, DEFAULT_PRIORITY};
use once_cell::sync::Lazy;
use regex::Regex;

static NAME_MARKER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*test for:").unwrap());

// One ordinal only: a number after it is step content ("1. 3 failed logins").
static STEP_ORDINAL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\.?\s*").unwrap());

/// Canonicalizes one raw test case. Each prefix is stripped once, so
/// re-applying it is a no-op unless a name repeats the marker or a step
/// starts with a number right after its ordinal.
pub(crate) fn normalize_test_case(raw: RawTestCase) -> CandidateTestCase {
    let name = raw.name.unwrap_or_default();
    let name = NAME_MARKER_PATTERN.replace(&name, "").trim().to_string();

    let steps = raw
        .steps
        .unwrap_or_default()
        .into_iter()
        .map(|step| STEP_ORDINAL_PATTERN.replace(&step, "").trim().to_string())
        .collect();

    CandidateTestCase {
        name,
        description: trimmed(raw.description),
        category: title_case_or(raw.category, DEFAULT_CATEGORY),
        steps,
        expected_result: trimmed(raw.expected_result),
        priority: title_case_or(raw.priority, DEFAULT_PRIORITY),
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|value| value.trim().to_string()).unwrap_or_default()
}

fn title_case_or(value: Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(title_case)
        .unwrap_or_else(|| default.to_string())
}

/// Upper-cases the first character and lower-cases the rest.
pub(crate) fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
