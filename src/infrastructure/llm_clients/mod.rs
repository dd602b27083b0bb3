pub mod gemini;

use crate::domain::error::{AppError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::error;

pub use gemini::GeminiClient;

/// Reply used when the backend answers without any candidate.
pub const NO_RESPONSE_REPLY: &str = "Sorry, I could not generate a response.";
/// Reply used when the call to the backend fails.
pub const UPSTREAM_ERROR_REPLY: &str = "Sorry, there was an error processing your request.";

pub const MISSING_API_KEY: &str = "Gemini API key is missing.";

#[async_trait]
pub trait LLMClient {
    /// Sends one prompt and returns the first candidate's text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub type SharedLLMClient = Arc<dyn LLMClient + Send + Sync>;

/// The client is absent when its configuration was rejected at startup.
pub fn require_client(client: Option<&SharedLLMClient>) -> Result<&SharedLLMClient> {
    client.ok_or_else(|| AppError::ConfigurationError(MISSING_API_KEY.to_string()))
}

/// Asks the backend, folding any upstream failure into a fixed reply so
/// callers always get text back.
pub async fn ask(client: &(dyn LLMClient + Send + Sync), prompt: &str) -> String {
    match client.generate(prompt).await {
        Ok(text) => text,
        Err(err) => {
            error!(error = %err, "Generative backend call failed");
            UPSTREAM_ERROR_REPLY.to_string()
        }
    }
}
