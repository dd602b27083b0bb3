use serde::{Deserialize, Serialize};

/// A row of the `test_comments` collection. Generation batches are logged
/// here alongside user comments.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub suite_id: Option<String>,
    pub run_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: String,
    pub author_id: String,
    pub suite_id: Option<String>,
    pub run_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// What a comment thread hangs off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentTarget {
    Suite(String),
    Run(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerationActivityMetadata {
    pub ai_generation: bool,
    pub prompt: String,
    pub generated_count: usize,
    pub project_name: String,
}

/// Summary of one generation batch.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationActivityRecord {
    pub content: String,
    pub author_id: String,
    pub suite_id: Option<String>,
    pub metadata: GenerationActivityMetadata,
}

impl GenerationActivityRecord {
    pub fn into_comment(self) -> NewComment {
        NewComment {
            content: self.content,
            author_id: self.author_id,
            suite_id: self.suite_id,
            run_id: None,
            metadata: serde_json::to_value(&self.metadata).ok(),
        }
    }
}
