mod extraction;
mod fallback;
mod normalize;
mod persistence;
mod prompts;

use crate::domain::error::{AppError, Result};
use crate::domain::test_case::{CandidateTestCase, StoredTestCase};
use crate::infrastructure::db::SharedStore;
use crate::infrastructure::llm_clients::{ask, require_client, SharedLLMClient};
use serde::Serialize;
use tracing::{debug, warn};

use extraction::{extract_test_cases, Extraction};
use fallback::synthesize_fallback;
use normalize::normalize_test_case;
use persistence::{persist_batch, BatchContext};
use prompts::build_generation_prompt;

pub(crate) const PROJECT_NOT_OWNED: &str = "Project not found or not owned by user";

const REPLY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub test_cases: Vec<StoredTestCase>,
    pub generated_count: usize,
    pub project_name: String,
}

pub struct TestGenerationUseCase {
    store: SharedStore,
    llm_client: Option<SharedLLMClient>,
}

impl TestGenerationUseCase {
    pub fn new(store: SharedStore, llm_client: Option<SharedLLMClient>) -> Self {
        Self { store, llm_client }
    }

    /// Generates test cases for a feature of one of the caller's projects and
    /// stores them. The result holds at least one attempted candidate even
    /// when the backend reply is unusable.
    pub async fn generate(
        &self,
        owner_id: &str,
        prompt: &str,
        project_id: &str,
    ) -> Result<GenerationOutcome> {
        if prompt.trim().is_empty() || project_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Prompt and project_id are required".to_string(),
            ));
        }

        let project = self
            .store
            .find_owned_project(project_id, owner_id)
            .await?
            .ok_or_else(|| AppError::Forbidden(PROJECT_NOT_OWNED.to_string()))?;

        let llm_client = require_client(self.llm_client.as_ref())?;

        let instruction =
            build_generation_prompt(prompt, &project.name, project.description.as_deref());
        let reply = ask(llm_client.as_ref(), &instruction).await;
        let candidates = candidates_from_reply(prompt, &reply);

        let batch = persist_batch(
            &self.store,
            candidates,
            &BatchContext {
                project_id: &project.id,
                project_name: &project.name,
                author_id: owner_id,
                original_prompt: prompt,
            },
        )
        .await;

        Ok(GenerationOutcome {
            test_cases: batch.stored,
            generated_count: batch.generated_count,
            project_name: project.name,
        })
    }
}

/// Extracted and normalized candidates, or the normalized fallback when the
/// reply yields none.
pub(crate) fn candidates_from_reply(prompt: &str, reply: &str) -> Vec<CandidateTestCase> {
    let extraction = extract_test_cases(reply);
    debug!(candidates = extraction.len(), "Extracted test cases from reply");

    let raw = match extraction {
        Extraction::Candidates(cases) => cases,
        Extraction::Empty => {
            warn!(
                reply_preview = %preview_text(reply, REPLY_PREVIEW_CHARS),
                "No test cases in generative reply, using fallback"
            );
            vec![synthesize_fallback(prompt)]
        }
    };

    raw.into_iter().map(normalize_test_case).collect()
}

fn preview_text(value: &str, max_chars: usize) -> String {
    let mut preview: String = value.chars().take(max_chars).collect();
    if value.chars().count() > max_chars {
        preview.push_str("...");
    }
    preview
}
