//! In-memory doubles for the store and the generative backend.

use crate::domain::activity::{Comment, CommentTarget, NewComment};
use crate::domain::error::{AppError, Result};
use crate::domain::project::Project;
use crate::domain::test_case::{NewTestSuite, TestSuite};
use crate::domain::test_run::{
    NewTestRun, QueueEntry, QueueProject, QueueSuite, RunFilter, TestRun,
};
use crate::infrastructure::db::TestSuiteStore;
use crate::infrastructure::llm_clients::LLMClient;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

pub(crate) struct ScriptedLLM {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLLM {
    pub(crate) fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLM {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| AppError::LLMError("Request failed: connection refused".to_string()))
    }
}

#[derive(Default)]
struct MemoryState {
    projects: Vec<Project>,
    suites: Vec<TestSuite>,
    runs: Vec<TestRun>,
    comments: Vec<Comment>,
    suite_insert_calls: usize,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    state: Mutex<MemoryState>,
    /// 1-based positions of `insert_test_suite` calls that fail.
    failing_suite_inserts: HashSet<usize>,
    fail_comment_inserts: bool,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_suite_insert_at(mut self, call: usize) -> Self {
        self.failing_suite_inserts.insert(call);
        self
    }

    pub(crate) fn failing_comment_inserts(mut self) -> Self {
        self.fail_comment_inserts = true;
        self
    }

    pub(crate) fn add_project(&self, owner_id: &str, name: &str, description: Option<&str>) -> Project {
        let project = Project {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: 0,
            updated_at: 0,
        };
        self.state.lock().unwrap().projects.push(project.clone());
        project
    }

    pub(crate) fn suites(&self) -> Vec<TestSuite> {
        self.state.lock().unwrap().suites.clone()
    }

    pub(crate) fn comments(&self) -> Vec<Comment> {
        self.state.lock().unwrap().comments.clone()
    }

    pub(crate) fn runs(&self) -> Vec<TestRun> {
        self.state.lock().unwrap().runs.clone()
    }
}

impl MemoryState {
    fn owned_project_ids(&self, owner_id: &str) -> HashSet<&str> {
        self.projects
            .iter()
            .filter(|project| project.owner_id == owner_id)
            .map(|project| project.id.as_str())
            .collect()
    }

    fn owned_suite_ids(&self, owner_id: &str) -> HashSet<&str> {
        let projects = self.owned_project_ids(owner_id);
        self.suites
            .iter()
            .filter(|suite| projects.contains(suite.project_id.as_str()))
            .map(|suite| suite.id.as_str())
            .collect()
    }
}

#[async_trait]
impl TestSuiteStore for MemoryStore {
    async fn find_owned_project(
        &self,
        project_id: &str,
        owner_id: &str,
    ) -> Result<Option<Project>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .projects
            .iter()
            .find(|project| project.id == project_id && project.owner_id == owner_id)
            .cloned())
    }

    async fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .projects
            .iter()
            .rev()
            .filter(|project| project.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_project(
        &self,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project> {
        Ok(self.add_project(owner_id, name, description))
    }

    async fn insert_test_suite(&self, suite: &NewTestSuite) -> Result<TestSuite> {
        let mut state = self.state.lock().unwrap();
        state.suite_insert_calls += 1;
        if self.failing_suite_inserts.contains(&state.suite_insert_calls) {
            return Err(AppError::DatabaseError(
                "Failed to insert test suite: disk I/O error".to_string(),
            ));
        }

        let stored = TestSuite {
            id: Uuid::new_v4().to_string(),
            project_id: suite.project_id.clone(),
            name: suite.name.clone(),
            description: suite.description.clone(),
            category: suite.category.clone(),
            metadata: suite.metadata.clone(),
            created_at: state.suite_insert_calls as i64,
        };
        state.suites.push(stored.clone());
        Ok(stored)
    }

    async fn find_test_suite(&self, suite_id: &str) -> Result<Option<TestSuite>> {
        let state = self.state.lock().unwrap();
        Ok(state.suites.iter().find(|suite| suite.id == suite_id).cloned())
    }

    async fn list_test_suites(
        &self,
        owner_id: &str,
        category: Option<&str>,
    ) -> Result<Vec<TestSuite>> {
        let state = self.state.lock().unwrap();
        let owned = state.owned_project_ids(owner_id);
        Ok(state
            .suites
            .iter()
            .rev()
            .filter(|suite| owned.contains(suite.project_id.as_str()))
            .filter(|suite| category.map_or(true, |c| suite.category.as_deref() == Some(c)))
            .cloned()
            .collect())
    }

    async fn insert_test_run(&self, run: &NewTestRun) -> Result<TestRun> {
        let mut state = self.state.lock().unwrap();
        if !state.suites.iter().any(|suite| suite.id == run.suite_id) {
            return Err(AppError::DatabaseError(
                "Failed to insert test run: FOREIGN KEY constraint failed".to_string(),
            ));
        }
        let stored = TestRun {
            id: Uuid::new_v4().to_string(),
            suite_id: run.suite_id.clone(),
            name: run.name.clone(),
            status: run.status,
            result: run.result.clone(),
            metadata: run.metadata.clone(),
            started_at: run.started_at,
            completed_at: run.completed_at,
            created_at: state.runs.len() as i64,
        };
        state.runs.push(stored.clone());
        Ok(stored)
    }

    async fn find_test_run(&self, run_id: &str) -> Result<Option<TestRun>> {
        let state = self.state.lock().unwrap();
        Ok(state.runs.iter().find(|run| run.id == run_id).cloned())
    }

    async fn list_test_runs(&self, owner_id: &str, filter: RunFilter<'_>) -> Result<Vec<TestRun>> {
        let state = self.state.lock().unwrap();
        let owned = state.owned_suite_ids(owner_id);
        Ok(state
            .runs
            .iter()
            .rev()
            .filter(|run| owned.contains(run.suite_id.as_str()))
            .filter(|run| filter.status.map_or(true, |status| run.status == status))
            .filter(|run| filter.suite_id.map_or(true, |id| run.suite_id == id))
            .cloned()
            .collect())
    }

    async fn list_queue(&self, owner_id: &str) -> Result<Vec<QueueEntry>> {
        let state = self.state.lock().unwrap();
        let owned = state.owned_suite_ids(owner_id);
        let mut entries = Vec::new();
        for run in state.runs.iter().rev() {
            if !owned.contains(run.suite_id.as_str()) {
                continue;
            }
            let Some(suite) = state.suites.iter().find(|suite| suite.id == run.suite_id) else {
                continue;
            };
            let Some(project) = state.projects.iter().find(|p| p.id == suite.project_id) else {
                continue;
            };
            entries.push(QueueEntry {
                run: run.clone(),
                suite: QueueSuite {
                    id: suite.id.clone(),
                    name: suite.name.clone(),
                    category: suite.category.clone(),
                    project: QueueProject {
                        id: project.id.clone(),
                        name: project.name.clone(),
                    },
                },
            });
        }
        Ok(entries)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        if self.fail_comment_inserts {
            return Err(AppError::DatabaseError(
                "Failed to insert comment: disk I/O error".to_string(),
            ));
        }
        let stored = Comment {
            id: Uuid::new_v4().to_string(),
            content: comment.content.clone(),
            author_id: comment.author_id.clone(),
            suite_id: comment.suite_id.clone(),
            run_id: comment.run_id.clone(),
            metadata: comment.metadata.clone(),
            created_at: 0,
        };
        self.state.lock().unwrap().comments.push(stored.clone());
        Ok(stored)
    }

    async fn list_comments(&self, target: &CommentTarget) -> Result<Vec<Comment>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .comments
            .iter()
            .rev()
            .filter(|comment| match target {
                CommentTarget::Suite(id) => comment.suite_id.as_ref() == Some(id),
                CommentTarget::Run(id) => comment.run_id.as_ref() == Some(id),
            })
            .cloned()
            .collect())
    }
}
