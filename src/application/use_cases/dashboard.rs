use crate::application::use_cases::test_generation::PROJECT_NOT_OWNED;
use crate::domain::activity::{Comment, CommentTarget, NewComment};
use crate::domain::error::{AppError, Result};
use crate::domain::project::Project;
use crate::domain::test_case::{NewTestSuite, TestSuite};
use crate::domain::test_run::{
    DashboardStats, NewTestRun, QueueEntry, QueueFilter, QueueFilterOptions, QueueStats,
    QueueView, RunFilter, RunStatus, TestRun,
};
use crate::infrastructure::db::SharedStore;
use tracing::info;

const SUITE_NOT_OWNED: &str = "Suite not found or not owned by user";
const RUN_NOT_OWNED: &str = "Run not found or not owned by user";
const COMMENT_TARGET_REQUIRED: &str = "Either suite_id or run_id is required";
const ALL_CATEGORIES: &str = "All";

/// A run as submitted by the dashboard, before ownership checks.
#[derive(Debug, Clone, Default)]
pub struct RunInput {
    pub name: String,
    pub suite_id: String,
    pub status: Option<String>,
    pub result: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

/// Owner-scoped listings and manual inserts behind the dashboard.
pub struct DashboardUseCase {
    store: SharedStore,
}

impl DashboardUseCase {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>> {
        self.store.list_projects(owner_id).await
    }

    pub async fn create_project(
        &self,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project> {
        let name = required(name, "Project name is required")?;
        let project = self
            .store
            .insert_project(owner_id, name, non_blank(description))
            .await?;
        info!(project_id = %project.id, "Created project");
        Ok(project)
    }

    /// `None` or `"All"` lists every category.
    pub async fn list_test_cases(
        &self,
        owner_id: &str,
        category: Option<&str>,
    ) -> Result<Vec<TestSuite>> {
        let category = non_blank(category).filter(|c| *c != ALL_CATEGORIES);
        self.store.list_test_suites(owner_id, category).await
    }

    pub async fn create_test_case(
        &self,
        owner_id: &str,
        project_id: &str,
        name: &str,
        description: Option<&str>,
        category: Option<&str>,
    ) -> Result<TestSuite> {
        let name = required(name, "Test case name is required")?;
        let project_id = required(project_id, "project_id is required")?;
        self.owned_project(project_id, owner_id).await?;

        let suite = self
            .store
            .insert_test_suite(&NewTestSuite {
                project_id: project_id.to_string(),
                name: name.to_string(),
                description: non_blank(description).map(str::to_string),
                category: non_blank(category).map(str::to_string),
                metadata: None,
            })
            .await?;
        info!(suite_id = %suite.id, project_id, "Created test case");
        Ok(suite)
    }

    /// Runs across every owned suite. A blank status or suite id is no filter.
    pub async fn list_runs(
        &self,
        owner_id: &str,
        status: Option<&str>,
        suite_id: Option<&str>,
    ) -> Result<Vec<TestRun>> {
        let status = non_blank(status)
            .map(str::parse::<RunStatus>)
            .transpose()?;
        self.store
            .list_test_runs(
                owner_id,
                RunFilter {
                    status,
                    suite_id: non_blank(suite_id),
                },
            )
            .await
    }

    pub async fn create_run(&self, owner_id: &str, input: RunInput) -> Result<TestRun> {
        let name = required(&input.name, "Name and suite_id are required")?;
        let suite_id = required(&input.suite_id, "Name and suite_id are required")?;
        let status = non_blank(input.status.as_deref())
            .map(str::parse::<RunStatus>)
            .transpose()?
            .unwrap_or_default();
        self.owned_suite(suite_id, owner_id).await?;

        let run = self
            .store
            .insert_test_run(&NewTestRun {
                suite_id: suite_id.to_string(),
                name: name.to_string(),
                status,
                result: non_blank(input.result.as_deref()).map(str::to_lowercase),
                metadata: input.metadata,
                started_at: input.started_at,
                completed_at: input.completed_at,
            })
            .await?;
        info!(run_id = %run.id, suite_id, status = %run.status, "Created test run");
        Ok(run)
    }

    /// Filtered run queue. Filter options come from every owned run so the
    /// dropdowns do not shrink as filters are applied; stats follow the filter.
    pub async fn queue(&self, owner_id: &str, filter: &QueueFilter) -> Result<QueueView> {
        let entries = self.store.list_queue(owner_id).await?;
        let filter_options = filter_options(&entries);

        let status = active(filter.status.as_deref(), "All Statuses").map(str::to_lowercase);
        let result = active(filter.result.as_deref(), "All Results").map(str::to_lowercase);
        let category = active(filter.category.as_deref(), "All Categories");
        let priority = active(filter.priority.as_deref(), "All Priorities");
        let version = active(filter.version.as_deref(), "All Versions");

        let runs: Vec<QueueEntry> = entries
            .into_iter()
            .filter(|e| status.as_deref().map_or(true, |s| e.run.status.as_str() == s))
            .filter(|e| result.as_deref().map_or(true, |r| e.run.result.as_deref() == Some(r)))
            .filter(|e| category.map_or(true, |c| e.suite.category.as_deref() == Some(c)))
            .filter(|e| priority.map_or(true, |p| e.run.priority() == Some(p)))
            .filter(|e| version.map_or(true, |v| e.run.version() == Some(v)))
            .collect();

        let stats = runs.iter().fold(QueueStats::default(), |mut stats, entry| {
            match entry.run.status {
                RunStatus::Running => stats.running += 1,
                RunStatus::Completed => stats.completed += 1,
                RunStatus::Failed => stats.failed += 1,
                RunStatus::Pending => stats.pending += 1,
            }
            stats
        });

        Ok(QueueView {
            total_runs: runs.len(),
            runs,
            filter_options,
            stats,
        })
    }

    pub async fn stats(&self, owner_id: &str) -> Result<DashboardStats> {
        let total_projects = self.store.list_projects(owner_id).await?.len();
        let runs = self
            .store
            .list_test_runs(owner_id, RunFilter::default())
            .await?;
        let count = |status: RunStatus| runs.iter().filter(|run| run.status == status).count();

        Ok(DashboardStats {
            total_projects,
            total_runs: runs.len(),
            completed_runs: count(RunStatus::Completed),
            running_runs: count(RunStatus::Running),
        })
    }

    /// Comments on a suite, or on a run when no suite is given.
    pub async fn list_comments(
        &self,
        owner_id: &str,
        suite_id: Option<&str>,
        run_id: Option<&str>,
    ) -> Result<Vec<Comment>> {
        let target = match (non_blank(suite_id), non_blank(run_id)) {
            (Some(suite_id), _) => {
                self.owned_suite(suite_id, owner_id).await?;
                CommentTarget::Suite(suite_id.to_string())
            }
            (None, Some(run_id)) => {
                self.owned_run(run_id, owner_id).await?;
                CommentTarget::Run(run_id.to_string())
            }
            (None, None) => {
                return Err(AppError::ValidationError(COMMENT_TARGET_REQUIRED.to_string()))
            }
        };
        self.store.list_comments(&target).await
    }

    pub async fn add_comment(
        &self,
        owner_id: &str,
        suite_id: Option<&str>,
        run_id: Option<&str>,
        content: &str,
    ) -> Result<Comment> {
        let content = required(content, "Comment content is required")?;
        let suite_id = non_blank(suite_id);
        let run_id = non_blank(run_id);
        if suite_id.is_none() && run_id.is_none() {
            return Err(AppError::ValidationError(COMMENT_TARGET_REQUIRED.to_string()));
        }
        if let Some(suite_id) = suite_id {
            self.owned_suite(suite_id, owner_id).await?;
        }
        if let Some(run_id) = run_id {
            self.owned_run(run_id, owner_id).await?;
        }

        self.store
            .insert_comment(&NewComment {
                content: content.to_string(),
                author_id: owner_id.to_string(),
                suite_id: suite_id.map(str::to_string),
                run_id: run_id.map(str::to_string),
                metadata: None,
            })
            .await
    }

    async fn owned_project(&self, project_id: &str, owner_id: &str) -> Result<Project> {
        self.store
            .find_owned_project(project_id, owner_id)
            .await?
            .ok_or_else(|| AppError::Forbidden(PROJECT_NOT_OWNED.to_string()))
    }

    async fn owned_suite(&self, suite_id: &str, owner_id: &str) -> Result<TestSuite> {
        let suite = self
            .store
            .find_test_suite(suite_id)
            .await?
            .ok_or_else(|| AppError::Forbidden(SUITE_NOT_OWNED.to_string()))?;
        self.owned_project(&suite.project_id, owner_id).await?;
        Ok(suite)
    }

    async fn owned_run(&self, run_id: &str, owner_id: &str) -> Result<TestRun> {
        let run = self
            .store
            .find_test_run(run_id)
            .await?
            .ok_or_else(|| AppError::Forbidden(RUN_NOT_OWNED.to_string()))?;
        self.owned_suite(&run.suite_id, owner_id).await?;
        Ok(run)
    }
}

fn filter_options(entries: &[QueueEntry]) -> QueueFilterOptions {
    let mut options = QueueFilterOptions::default();
    for entry in entries {
        push_unique(&mut options.statuses, Some(entry.run.status.as_str()));
        push_unique(&mut options.results, entry.run.result.as_deref());
        push_unique(&mut options.categories, entry.suite.category.as_deref());
        push_unique(&mut options.priorities, entry.run.priority());
        push_unique(&mut options.versions, entry.run.version());
    }
    options
}

// First-seen order, blanks skipped.
fn push_unique(values: &mut Vec<String>, value: Option<&str>) {
    if let Some(value) = non_blank(value) {
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }
}

fn active<'a>(value: Option<&'a str>, all_label: &str) -> Option<&'a str> {
    non_blank(value).filter(|v| *v != all_label)
}

fn required<'a>(value: &'a str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(message.to_string()));
    }
    Ok(trimmed)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
