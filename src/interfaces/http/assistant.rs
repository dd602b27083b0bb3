use super::AppState;
use crate::domain::error::{AppError, Result};
use actix_web::{post, web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

/// Stateless chat turn: scroll target, answer, or error reply.
#[post("/assistant")]
async fn assistant(
    data: web::Data<AppState>,
    req: web::Json<AssistantRequest>,
) -> Result<HttpResponse> {
    let message = req
        .message
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| AppError::ValidationError("Invalid message".to_string()))?;
    let reply = data.assistant.respond(message).await?;
    Ok(HttpResponse::Ok().json(reply))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(assistant);
}
