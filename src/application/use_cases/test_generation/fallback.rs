use crate::domain::test_case::{RawTestCase, DEFAULT_CATEGORY, DEFAULT_PRIORITY};

const NAME_PREFIX_CHARS: usize = 50;

pub(crate) const FALLBACK_STEPS: [&str; 4] = [
    "Open the app",
    "Navigate to the feature",
    "Perform the action",
    "Verify the result",
];

pub(crate) const FALLBACK_EXPECTED_RESULT: &str = "The feature should work as expected";

/// Placeholder used when the backend reply carries no usable test case.
pub(crate) fn synthesize_fallback(feature_description: &str) -> RawTestCase {
    let head: String = feature_description.chars().take(NAME_PREFIX_CHARS).collect();

    RawTestCase {
        name: Some(format!("Test for: {}...", head)),
        description: Some(format!("AI-generated test case for: {}", feature_description)),
        category: Some(DEFAULT_CATEGORY.to_string()),
        steps: Some(FALLBACK_STEPS.iter().map(|step| step.to_string()).collect()),
        expected_result: Some(FALLBACK_EXPECTED_RESULT.to_string()),
        priority: Some(DEFAULT_PRIORITY.to_string()),
    }
}
