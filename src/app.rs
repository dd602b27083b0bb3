use crate::domain::error::Result;
use crate::infrastructure::config::{AppConfig, ConfigService};
use crate::infrastructure::db::connection::init_db;
use crate::infrastructure::db::{SharedStore, SqliteStore};
use crate::infrastructure::llm_clients::{GeminiClient, SharedLLMClient};
use crate::interfaces::http::{start_server, AppState};
use actix_web::web;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Loads configuration, wires the store and generative client into the use
/// cases, and serves HTTP until shutdown.
pub async fn run() -> Result<()> {
    let config = ConfigService::load()?;
    init_tracing(&config);

    let pool = init_db(&config.database.url, config.database.max_connections).await?;
    let store: SharedStore = Arc::new(SqliteStore::new(pool));
    let llm_client = build_llm_client(&config);

    let state = web::Data::new(AppState::new(store, llm_client));
    let server = start_server(state, &config.server)?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        model = %config.gemini.model,
        "HTTP server listening"
    );

    server.await?;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

// Requests that need the backend fail individually when it is not configured.
fn build_llm_client(config: &AppConfig) -> Option<SharedLLMClient> {
    match GeminiClient::new(&config.gemini) {
        Ok(client) => Some(Arc::new(client) as SharedLLMClient),
        Err(err) => {
            warn!(error = %err, "Generative backend disabled");
            None
        }
    }
}
