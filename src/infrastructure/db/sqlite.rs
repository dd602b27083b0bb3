use super::TestSuiteStore;
use crate::domain::activity::{Comment, CommentTarget, NewComment};
use crate::domain::error::{AppError, Result};
use crate::domain::project::Project;
use crate::domain::test_case::{NewTestSuite, TestCaseMetadata, TestSuite};
use crate::domain::test_run::{
    NewTestRun, QueueEntry, QueueProject, QueueSuite, RunFilter, RunStatus, TestRun,
};
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::warn;
use uuid::Uuid;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TestSuiteStore for SqliteStore {
    async fn find_owned_project(
        &self,
        project_id: &str,
        owner_id: &str,
    ) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, ProjectEntity>(
            "SELECT id, owner_id, name, description, created_at, updated_at
             FROM projects WHERE id = ? AND owner_id = ?",
        )
        .bind(project_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch project: {e}")))?;

        Ok(project.map(|entry| entry.into()))
    }

    async fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, ProjectEntity>(
            "SELECT id, owner_id, name, description, created_at, updated_at
             FROM projects WHERE owner_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list projects: {e}")))?;

        Ok(projects.into_iter().map(|project| project.into()).collect())
    }

    async fn insert_project(
        &self,
        owner_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Project> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp_millis();

        sqlx::query(
            "INSERT INTO projects (id, owner_id, name, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .bind(created_at)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert project: {e}")))?;

        Ok(Project {
            id,
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at,
            updated_at: created_at,
        })
    }

    async fn insert_test_suite(&self, suite: &NewTestSuite) -> Result<TestSuite> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp_millis();
        let metadata_json = suite
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| AppError::ParseError(format!("Failed to encode suite metadata: {e}")))?;

        sqlx::query(
            "INSERT INTO test_suites (id, project_id, name, description, category, metadata, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&suite.project_id)
        .bind(&suite.name)
        .bind(&suite.description)
        .bind(&suite.category)
        .bind(&metadata_json)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert test suite: {e}")))?;

        Ok(TestSuite {
            id,
            project_id: suite.project_id.clone(),
            name: suite.name.clone(),
            description: suite.description.clone(),
            category: suite.category.clone(),
            metadata: suite.metadata.clone(),
            created_at,
        })
    }

    async fn find_test_suite(&self, suite_id: &str) -> Result<Option<TestSuite>> {
        let suite = sqlx::query_as::<_, TestSuiteEntity>(
            "SELECT id, project_id, name, description, category, metadata, created_at
             FROM test_suites WHERE id = ?",
        )
        .bind(suite_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch test suite: {e}")))?;

        Ok(suite.map(|entry| entry.into()))
    }

    async fn list_test_suites(
        &self,
        owner_id: &str,
        category: Option<&str>,
    ) -> Result<Vec<TestSuite>> {
        let suites = sqlx::query_as::<_, TestSuiteEntity>(
            "SELECT s.id, s.project_id, s.name, s.description, s.category, s.metadata, s.created_at
             FROM test_suites s
             JOIN projects p ON p.id = s.project_id
             WHERE p.owner_id = ? AND (? IS NULL OR s.category = ?)
             ORDER BY s.created_at DESC, s.rowid DESC",
        )
        .bind(owner_id)
        .bind(category)
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list test suites: {e}")))?;

        Ok(suites.into_iter().map(|suite| suite.into()).collect())
    }

    async fn insert_test_run(&self, run: &NewTestRun) -> Result<TestRun> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp_millis();
        let metadata_json = run.metadata.as_ref().map(|value| value.to_string());

        sqlx::query(
            "INSERT INTO test_runs (id, suite_id, name, status, result, metadata, started_at, completed_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&run.suite_id)
        .bind(&run.name)
        .bind(run.status.as_str())
        .bind(&run.result)
        .bind(&metadata_json)
        .bind(run.started_at)
        .bind(run.completed_at)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert test run: {e}")))?;

        Ok(TestRun {
            id,
            suite_id: run.suite_id.clone(),
            name: run.name.clone(),
            status: run.status,
            result: run.result.clone(),
            metadata: run.metadata.clone(),
            started_at: run.started_at,
            completed_at: run.completed_at,
            created_at,
        })
    }

    async fn find_test_run(&self, run_id: &str) -> Result<Option<TestRun>> {
        let run = sqlx::query_as::<_, TestRunEntity>(
            "SELECT id, suite_id, name, status, result, metadata, started_at, completed_at, created_at
             FROM test_runs WHERE id = ?",
        )
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch test run: {e}")))?;

        Ok(run.map(|entry| entry.into()))
    }

    async fn list_test_runs(&self, owner_id: &str, filter: RunFilter<'_>) -> Result<Vec<TestRun>> {
        let status = filter.status.map(|status| status.as_str());
        let runs = sqlx::query_as::<_, TestRunEntity>(
            "SELECT r.id, r.suite_id, r.name, r.status, r.result, r.metadata, r.started_at, r.completed_at, r.created_at
             FROM test_runs r
             JOIN test_suites s ON s.id = r.suite_id
             JOIN projects p ON p.id = s.project_id
             WHERE p.owner_id = ?
               AND (? IS NULL OR r.status = ?)
               AND (? IS NULL OR r.suite_id = ?)
             ORDER BY r.created_at DESC, r.rowid DESC",
        )
        .bind(owner_id)
        .bind(status)
        .bind(status)
        .bind(filter.suite_id)
        .bind(filter.suite_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list test runs: {e}")))?;

        Ok(runs.into_iter().map(|run| run.into()).collect())
    }

    async fn list_queue(&self, owner_id: &str) -> Result<Vec<QueueEntry>> {
        let rows = sqlx::query_as::<_, QueueEntity>(
            "SELECT r.id, r.suite_id, r.name, r.status, r.result, r.metadata, r.started_at, r.completed_at, r.created_at,
                    s.name AS suite_name, s.category AS suite_category,
                    p.id AS project_id, p.name AS project_name
             FROM test_runs r
             JOIN test_suites s ON s.id = r.suite_id
             JOIN projects p ON p.id = s.project_id
             WHERE p.owner_id = ?
             ORDER BY r.created_at DESC, r.rowid DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list test queue: {e}")))?;

        Ok(rows.into_iter().map(|row| row.into()).collect())
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp_millis();
        let metadata_json = comment.metadata.as_ref().map(|value| value.to_string());

        sqlx::query(
            "INSERT INTO test_comments (id, content, author_id, suite_id, run_id, metadata, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&comment.content)
        .bind(&comment.author_id)
        .bind(&comment.suite_id)
        .bind(&comment.run_id)
        .bind(&metadata_json)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert comment: {e}")))?;

        Ok(Comment {
            id,
            content: comment.content.clone(),
            author_id: comment.author_id.clone(),
            suite_id: comment.suite_id.clone(),
            run_id: comment.run_id.clone(),
            metadata: comment.metadata.clone(),
            created_at,
        })
    }

    async fn list_comments(&self, target: &CommentTarget) -> Result<Vec<Comment>> {
        let (column, id) = match target {
            CommentTarget::Suite(id) => ("suite_id", id),
            CommentTarget::Run(id) => ("run_id", id),
        };
        let sql = format!(
            "SELECT id, content, author_id, suite_id, run_id, metadata, created_at
             FROM test_comments WHERE {column} = ? ORDER BY created_at DESC, rowid DESC"
        );
        let comments = sqlx::query_as::<_, CommentEntity>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list comments: {e}")))?;

        Ok(comments.into_iter().map(|comment| comment.into()).collect())
    }
}

#[derive(sqlx::FromRow)]
struct ProjectEntity {
    id: String,
    owner_id: String,
    name: String,
    description: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl From<ProjectEntity> for Project {
    fn from(e: ProjectEntity) -> Self {
        Self {
            id: e.id,
            owner_id: e.owner_id,
            name: e.name,
            description: e.description,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TestSuiteEntity {
    id: String,
    project_id: String,
    name: String,
    description: Option<String>,
    category: Option<String>,
    metadata: Option<String>,
    created_at: i64,
}

impl From<TestSuiteEntity> for TestSuite {
    fn from(e: TestSuiteEntity) -> Self {
        let metadata = e.metadata.as_deref().and_then(|raw| {
            serde_json::from_str::<TestCaseMetadata>(raw)
                .map_err(|err| warn!(suite_id = %e.id, error = %err, "Ignoring unreadable suite metadata"))
                .ok()
        });
        Self {
            id: e.id,
            project_id: e.project_id,
            name: e.name,
            description: e.description,
            category: e.category,
            metadata,
            created_at: e.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentEntity {
    id: String,
    content: String,
    author_id: String,
    suite_id: Option<String>,
    run_id: Option<String>,
    metadata: Option<String>,
    created_at: i64,
}

impl From<CommentEntity> for Comment {
    fn from(e: CommentEntity) -> Self {
        Self {
            id: e.id,
            content: e.content,
            author_id: e.author_id,
            suite_id: e.suite_id,
            run_id: e.run_id,
            metadata: e
                .metadata
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
            created_at: e.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TestRunEntity {
    id: String,
    suite_id: String,
    name: String,
    status: String,
    result: Option<String>,
    metadata: Option<String>,
    started_at: Option<i64>,
    completed_at: Option<i64>,
    created_at: i64,
}

impl From<TestRunEntity> for TestRun {
    fn from(e: TestRunEntity) -> Self {
        let status = e.status.parse::<RunStatus>().unwrap_or_else(|_| {
            warn!(run_id = %e.id, status = %e.status, "Unknown run status, treating as pending");
            RunStatus::Pending
        });
        Self {
            status,
            metadata: e
                .metadata
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
            id: e.id,
            suite_id: e.suite_id,
            name: e.name,
            result: e.result,
            started_at: e.started_at,
            completed_at: e.completed_at,
            created_at: e.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct QueueEntity {
    #[sqlx(flatten)]
    run: TestRunEntity,
    suite_name: String,
    suite_category: Option<String>,
    project_id: String,
    project_name: String,
}

impl From<QueueEntity> for QueueEntry {
    fn from(e: QueueEntity) -> Self {
        let run: TestRun = e.run.into();
        Self {
            suite: QueueSuite {
                id: run.suite_id.clone(),
                name: e.suite_name,
                category: e.suite_category,
                project: QueueProject {
                    id: e.project_id,
                    name: e.project_name,
                },
            },
            run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::init_db;

    async fn store() -> SqliteStore {
        let pool = init_db("sqlite::memory:", 1).await.unwrap();
        SqliteStore::new(pool)
    }

    fn metadata() -> TestCaseMetadata {
        TestCaseMetadata {
            ai_generated: true,
            original_prompt: "login".to_string(),
            steps: vec!["Open the app".to_string()],
            expected_result: "Logged in".to_string(),
            priority: "High".to_string(),
            generated_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn owned_project_lookup_respects_owner() {
        let store = store().await;
        let project = store
            .insert_project("user-1", "Shop", Some("Mobile shop"))
            .await
            .unwrap();

        let found = store
            .find_owned_project(&project.id, "user-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "Shop");
        assert_eq!(found.description.as_deref(), Some("Mobile shop"));

        assert!(store
            .find_owned_project(&project.id, "user-2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn suite_metadata_survives_a_round_trip() {
        let store = store().await;
        let project = store.insert_project("user-1", "Shop", None).await.unwrap();
        let inserted = store
            .insert_test_suite(&NewTestSuite {
                project_id: project.id.clone(),
                name: "Login flow".to_string(),
                description: Some("Checks login".to_string()),
                category: Some("Smoke".to_string()),
                metadata: Some(metadata()),
            })
            .await
            .unwrap();

        let fetched = store.find_test_suite(&inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched.metadata, inserted.metadata);
        assert_eq!(fetched.category.as_deref(), Some("Smoke"));
    }

    #[tokio::test]
    async fn suite_insert_for_unknown_project_fails() {
        let store = store().await;
        let result = store
            .insert_test_suite(&NewTestSuite {
                project_id: "missing".to_string(),
                name: "Orphan".to_string(),
                description: None,
                category: None,
                metadata: None,
            })
            .await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn suites_are_listed_per_owner_and_category() {
        let store = store().await;
        let mine = store.insert_project("user-1", "Mine", None).await.unwrap();
        let theirs = store.insert_project("user-2", "Theirs", None).await.unwrap();

        for (project_id, name, category) in [
            (&mine.id, "a", "Smoke"),
            (&mine.id, "b", "Regression"),
            (&theirs.id, "c", "Smoke"),
        ] {
            store
                .insert_test_suite(&NewTestSuite {
                    project_id: project_id.clone(),
                    name: name.to_string(),
                    description: None,
                    category: Some(category.to_string()),
                    metadata: None,
                })
                .await
                .unwrap();
        }

        let all: Vec<String> = store
            .list_test_suites("user-1", None)
            .await
            .unwrap()
            .into_iter()
            .map(|suite| suite.name)
            .collect();
        assert_eq!(all, vec!["b", "a"]);

        let smoke = store.list_test_suites("user-1", Some("Smoke")).await.unwrap();
        assert_eq!(smoke.len(), 1);
        assert_eq!(smoke[0].name, "a");
    }

    #[tokio::test]
    async fn comments_are_listed_newest_first() {
        let store = store().await;
        let project = store.insert_project("user-1", "Shop", None).await.unwrap();
        let suite = store
            .insert_test_suite(&NewTestSuite {
                project_id: project.id,
                name: "Suite".to_string(),
                description: None,
                category: None,
                metadata: None,
            })
            .await
            .unwrap();

        for content in ["first", "second"] {
            store
                .insert_comment(&NewComment {
                    content: content.to_string(),
                    author_id: "user-1".to_string(),
                    suite_id: Some(suite.id.clone()),
                    run_id: None,
                    metadata: Some(serde_json::json!({ "ai_generation": true })),
                })
                .await
                .unwrap();
        }

        let comments = store
            .list_comments(&CommentTarget::Suite(suite.id.clone()))
            .await
            .unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "second");
        assert_eq!(
            comments[1].metadata,
            Some(serde_json::json!({ "ai_generation": true }))
        );
    }

    async fn suite_in(store: &SqliteStore, owner_id: &str, name: &str) -> TestSuite {
        let project = store.insert_project(owner_id, "Shop", None).await.unwrap();
        store
            .insert_test_suite(&NewTestSuite {
                project_id: project.id,
                name: name.to_string(),
                description: None,
                category: Some("Smoke".to_string()),
                metadata: None,
            })
            .await
            .unwrap()
    }

    fn new_run(suite_id: &str, name: &str, status: RunStatus) -> NewTestRun {
        NewTestRun {
            suite_id: suite_id.to_string(),
            name: name.to_string(),
            status,
            result: None,
            metadata: Some(serde_json::json!({ "priority": "High", "version": "1.2.0" })),
            started_at: Some(1_700_000_000_000),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn runs_are_scoped_to_owner_and_filtered() {
        let store = store().await;
        let mine = suite_in(&store, "user-1", "Login").await;
        let theirs = suite_in(&store, "user-2", "Cart").await;

        let first = store
            .insert_test_run(&new_run(&mine.id, "Nightly", RunStatus::Running))
            .await
            .unwrap();
        store
            .insert_test_run(&new_run(&mine.id, "Smoke", RunStatus::Completed))
            .await
            .unwrap();
        store
            .insert_test_run(&new_run(&theirs.id, "Foreign", RunStatus::Running))
            .await
            .unwrap();

        let all: Vec<String> = store
            .list_test_runs("user-1", RunFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|run| run.name)
            .collect();
        assert_eq!(all, vec!["Smoke", "Nightly"]);

        let running = store
            .list_test_runs(
                "user-1",
                RunFilter {
                    status: Some(RunStatus::Running),
                    suite_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(running.len(), 1);
        assert_eq!(running[0].id, first.id);
        assert_eq!(running[0].started_at, Some(1_700_000_000_000));
        assert_eq!(running[0].metadata, first.metadata);

        let fetched = store.find_test_run(&first.id).await.unwrap().unwrap();
        assert_eq!(fetched, first);
    }

    #[tokio::test]
    async fn run_insert_for_unknown_suite_fails() {
        let store = store().await;
        let result = store
            .insert_test_run(&new_run("missing", "Orphan", RunStatus::Pending))
            .await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn queue_joins_suite_and_project() {
        let store = store().await;
        let suite = suite_in(&store, "user-1", "Login").await;
        let other = suite_in(&store, "user-2", "Cart").await;
        store
            .insert_test_run(&new_run(&suite.id, "Nightly", RunStatus::Failed))
            .await
            .unwrap();
        store
            .insert_test_run(&new_run(&other.id, "Foreign", RunStatus::Failed))
            .await
            .unwrap();

        let queue = store.list_queue("user-1").await.unwrap();
        assert_eq!(queue.len(), 1);
        let entry = &queue[0];
        assert_eq!(entry.run.name, "Nightly");
        assert_eq!(entry.run.status, RunStatus::Failed);
        assert_eq!(entry.suite.id, suite.id);
        assert_eq!(entry.suite.name, "Login");
        assert_eq!(entry.suite.category.as_deref(), Some("Smoke"));
        assert_eq!(entry.suite.project.id, suite.project_id);
        assert_eq!(entry.suite.project.name, "Shop");
    }

    #[tokio::test]
    async fn run_comments_are_kept_apart_from_suite_comments() {
        let store = store().await;
        let suite = suite_in(&store, "user-1", "Login").await;
        let run = store
            .insert_test_run(&new_run(&suite.id, "Nightly", RunStatus::Pending))
            .await
            .unwrap();

        for (content, suite_id, run_id) in [
            ("on suite", Some(suite.id.clone()), None),
            ("on run", None, Some(run.id.clone())),
        ] {
            store
                .insert_comment(&NewComment {
                    content: content.to_string(),
                    author_id: "user-1".to_string(),
                    suite_id,
                    run_id,
                    metadata: None,
                })
                .await
                .unwrap();
        }

        let on_run = store
            .list_comments(&CommentTarget::Run(run.id.clone()))
            .await
            .unwrap();
        assert_eq!(on_run.len(), 1);
        assert_eq!(on_run[0].content, "on run");
        assert_eq!(on_run[0].run_id.as_deref(), Some(run.id.as_str()));

        let on_suite = store
            .list_comments(&CommentTarget::Suite(suite.id.clone()))
            .await
            .unwrap();
        assert_eq!(on_suite.len(), 1);
        assert_eq!(on_suite[0].content, "on suite");
    }
}
