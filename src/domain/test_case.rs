use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "Smoke";
pub const DEFAULT_PRIORITY: &str = "Medium";

/// Test case as the generative backend describes it. Every field may be
/// missing or null; the normalizer fills the gaps.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawTestCase {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub steps: Option<Vec<String>>,
    #[serde(default)]
    pub expected_result: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Fully populated test case, extracted but not yet persisted.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTestCase {
    pub name: String,
    pub description: String,
    pub category: String,
    pub steps: Vec<String>,
    pub expected_result: String,
    pub priority: String,
}

impl From<CandidateTestCase> for RawTestCase {
    fn from(case: CandidateTestCase) -> Self {
        Self {
            name: Some(case.name),
            description: Some(case.description),
            category: Some(case.category),
            steps: Some(case.steps),
            expected_result: Some(case.expected_result),
            priority: Some(case.priority),
        }
    }
}

/// Metadata attached to AI-generated rows in the test suite store.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TestCaseMetadata {
    pub ai_generated: bool,
    pub original_prompt: String,
    pub steps: Vec<String>,
    pub expected_result: String,
    pub priority: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// A row of the `test_suites` collection.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TestSuite {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub metadata: Option<TestCaseMetadata>,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewTestSuite {
    pub project_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub metadata: Option<TestCaseMetadata>,
}

/// A generated test case after it has been written to the store.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StoredTestCase {
    pub id: String,
    pub project_id: String,
    #[serde(flatten)]
    pub case: CandidateTestCase,
    pub metadata: TestCaseMetadata,
    /// Always true; only rows that were written are returned.
    pub stored: bool,
}
