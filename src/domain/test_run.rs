use crate::domain::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, so `"Running"` from a filter dropdown parses too.
impl FromStr for RunStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(RunStatus::Pending),
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            other => Err(AppError::ValidationError(format!(
                "Unknown run status: {}",
                other
            ))),
        }
    }
}

/// A row of the `test_runs` collection. Timestamps are epoch milliseconds.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestRun {
    pub id: String,
    pub suite_id: String,
    pub name: String,
    pub status: RunStatus,
    pub result: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
}

impl TestRun {
    fn metadata_text(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.get(key))
            .and_then(serde_json::Value::as_str)
    }

    pub fn priority(&self) -> Option<&str> {
        self.metadata_text("priority")
    }

    pub fn version(&self) -> Option<&str> {
        self.metadata_text("version")
    }
}

#[derive(Debug, Clone)]
pub struct NewTestRun {
    pub suite_id: String,
    pub name: String,
    pub status: RunStatus,
    pub result: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RunFilter<'a> {
    pub status: Option<RunStatus>,
    pub suite_id: Option<&'a str>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueProject {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueSuite {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub project: QueueProject,
}

/// A run together with the suite and project it belongs to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    #[serde(flatten)]
    pub run: TestRun,
    pub suite: QueueSuite,
}

/// Queue filters as sent by the dashboard. `None` or an `All …` label
/// disables a filter.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueueFilter {
    pub status: Option<String>,
    pub result: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Default, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueFilterOptions {
    pub statuses: Vec<String>,
    pub results: Vec<String>,
    pub categories: Vec<String>,
    pub priorities: Vec<String>,
    pub versions: Vec<String>,
}

#[derive(Debug, Default, Serialize, Clone, PartialEq)]
pub struct QueueStats {
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub pending: usize,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QueueView {
    pub runs: Vec<QueueEntry>,
    pub filter_options: QueueFilterOptions,
    pub total_runs: usize,
    pub stats: QueueStats,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_projects: usize,
    pub total_runs: usize,
    pub completed_runs: usize,
    pub running_runs: usize,
}
