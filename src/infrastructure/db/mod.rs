pub mod connection;
pub mod sqlite;

use crate::domain::activity::{Comment, CommentTarget, NewComment};
use crate::domain::error::Result;
use crate::domain::project::Project;
use crate::domain::test_case::{NewTestSuite, TestSuite};
use crate::domain::test_run::{NewTestRun, QueueEntry, RunFilter, TestRun};
use async_trait::async_trait;
use std::sync::Arc;

pub use sqlite::SqliteStore;

/// Insert-returning and owner-filtered select operations over the
/// `projects`, `test_suites`, `test_runs` and `test_comments` collections.
#[async_trait]
pub trait TestSuiteStore {
    async fn find_owned_project(&self, project_id: &str, owner_id: &str)
        -> Result<Option<Project>>;
    async fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>>;
    async fn insert_project(
        &self,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project>;

    async fn insert_test_suite(&self, suite: &NewTestSuite) -> Result<TestSuite>;
    async fn find_test_suite(&self, suite_id: &str) -> Result<Option<TestSuite>>;
    /// Suites across every project owned by `owner_id`, newest first.
    async fn list_test_suites(&self, owner_id: &str, category: Option<&str>)
        -> Result<Vec<TestSuite>>;

    async fn insert_test_run(&self, run: &NewTestRun) -> Result<TestRun>;
    async fn find_test_run(&self, run_id: &str) -> Result<Option<TestRun>>;
    /// Runs of every suite owned by `owner_id`, newest first.
    async fn list_test_runs(&self, owner_id: &str, filter: RunFilter<'_>) -> Result<Vec<TestRun>>;
    /// Every run owned by `owner_id` joined with its suite and project, newest first.
    async fn list_queue(&self, owner_id: &str) -> Result<Vec<QueueEntry>>;

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment>;
    async fn list_comments(&self, target: &CommentTarget) -> Result<Vec<Comment>>;
}

pub type SharedStore = Arc<dyn TestSuiteStore + Send + Sync>;
