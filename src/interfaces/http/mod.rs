pub mod assistant;
pub mod auth;
pub mod dashboard;

use crate::application::{AssistantUseCase, DashboardUseCase, TestGenerationUseCase};
use crate::domain::error::AppError;
use crate::infrastructure::config::ServerConfig;
use crate::infrastructure::db::SharedStore;
use crate::infrastructure::llm_clients::SharedLLMClient;
use actix_cors::Cors;
use actix_web::{dev::Server, get, web, App, HttpResponse, HttpServer, Responder};

pub struct AppState {
    pub test_generation: TestGenerationUseCase,
    pub dashboard: DashboardUseCase,
    pub assistant: AssistantUseCase,
}

impl AppState {
    pub fn new(store: SharedStore, llm_client: Option<SharedLLMClient>) -> Self {
        Self {
            test_generation: TestGenerationUseCase::new(store.clone(), llm_client.clone()),
            dashboard: DashboardUseCase::new(store),
            assistant: AssistantUseCase::new(llm_client),
        }
    }
}

#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy"
    }))
}

/// Mounts every route under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .app_data(query_config())
            .service(health_check)
            .configure(dashboard::configure)
            .configure(assistant::configure),
    );
}

// Malformed bodies and queries answer with the same JSON error shape as
// every other client error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

pub fn start_server(state: web::Data<AppState>, config: &ServerConfig) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    Ok(server)
}
