use super::auth::AuthUser;
use super::AppState;
use crate::application::{GenerationOutcome, RunInput};
use crate::domain::error::Result;
use crate::domain::test_run::QueueFilter;
use actix_web::{get, post, web, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateTestCasesRequest {
    #[validate(length(min = 1))]
    pub prompt: String,
    #[validate(length(min = 1))]
    pub project_id: String,
}

#[derive(Serialize)]
struct GenerateTestCasesResponse {
    success: bool,
    #[serde(flatten)]
    outcome: GenerationOutcome,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTestCaseRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(length(min = 1))]
    pub project_id: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRunRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub suite_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<CreateRunRequest> for RunInput {
    fn from(req: CreateRunRequest) -> Self {
        Self {
            name: req.name,
            suite_id: req.suite_id,
            status: req.status,
            result: req.result,
            metadata: req.metadata,
            started_at: req.started_at.map(|at| at.timestamp_millis()),
            completed_at: req.completed_at.map(|at| at.timestamp_millis()),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub suite_id: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TestCaseQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentQuery {
    pub suite_id: Option<String>,
    pub run_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RunQuery {
    pub status: Option<String>,
    pub suite_id: Option<String>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .service(generate_test_cases)
            .service(list_projects)
            .service(create_project)
            .service(list_test_cases)
            .service(create_test_case)
            .service(list_runs)
            .service(create_run)
            .service(run_queue)
            .service(dashboard_stats)
            .service(list_comments)
            .service(create_comment),
    );
}

#[post("/ai-test-cases")]
async fn generate_test_cases(
    data: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<GenerateTestCasesRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    info!(user_id = %user.id, project_id = %req.project_id, "Generating test cases");

    match data
        .test_generation
        .generate(&user.id, &req.prompt, &req.project_id)
        .await
    {
        Ok(outcome) => Ok(HttpResponse::Ok().json(GenerateTestCasesResponse {
            success: true,
            outcome,
        })),
        Err(err) if err.status_code().is_server_error() => {
            error!(error = %err, project_id = %req.project_id, "Test case generation failed");
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to generate test cases",
                "details": err.message(),
            })))
        }
        Err(err) => Err(err),
    }
}

#[get("/projects")]
async fn list_projects(data: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let projects = data.dashboard.list_projects(&user.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "projects": projects })))
}

#[post("/projects")]
async fn create_project(
    data: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let project = data
        .dashboard
        .create_project(&user.id, &req.name, req.description.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "project": project })))
}

#[get("/test-cases")]
async fn list_test_cases(
    data: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<TestCaseQuery>,
) -> Result<HttpResponse> {
    let test_cases = data
        .dashboard
        .list_test_cases(&user.id, query.category.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "testCases": test_cases })))
}

#[post("/test-cases")]
async fn create_test_case(
    data: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<CreateTestCaseRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let test_case = data
        .dashboard
        .create_test_case(
            &user.id,
            &req.project_id,
            &req.name,
            req.description.as_deref(),
            req.category.as_deref(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "testCase": test_case })))
}

#[get("/runs")]
async fn list_runs(
    data: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<RunQuery>,
) -> Result<HttpResponse> {
    let runs = data
        .dashboard
        .list_runs(&user.id, query.status.as_deref(), query.suite_id.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "runs": runs })))
}

#[post("/runs")]
async fn create_run(
    data: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<CreateRunRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let run = data
        .dashboard
        .create_run(&user.id, req.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "run": run })))
}

#[get("/queue")]
async fn run_queue(
    data: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<QueueFilter>,
) -> Result<HttpResponse> {
    let view = data.dashboard.queue(&user.id, &query).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[get("/stats")]
async fn dashboard_stats(data: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let stats = data.dashboard.stats(&user.id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/comments")]
async fn list_comments(
    data: web::Data<AppState>,
    user: AuthUser,
    query: web::Query<CommentQuery>,
) -> Result<HttpResponse> {
    let comments = data
        .dashboard
        .list_comments(&user.id, query.suite_id.as_deref(), query.run_id.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "comments": comments })))
}

#[post("/comments")]
async fn create_comment(
    data: web::Data<AppState>,
    user: AuthUser,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let comment = data
        .dashboard
        .add_comment(
            &user.id,
            req.suite_id.as_deref(),
            req.run_id.as_deref(),
            &req.content,
        )
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "comment": comment })))
}
