use crate::domain::activity::{GenerationActivityMetadata, GenerationActivityRecord};
use crate::domain::error::Result;
use crate::domain::test_case::{CandidateTestCase, NewTestSuite, StoredTestCase, TestCaseMetadata};
use crate::infrastructure::db::SharedStore;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

/// Who asked for the batch and what it was generated from.
pub(crate) struct BatchContext<'a> {
    pub(crate) project_id: &'a str,
    pub(crate) project_name: &'a str,
    pub(crate) author_id: &'a str,
    pub(crate) original_prompt: &'a str,
}

#[derive(Debug)]
pub(crate) struct PersistedBatch {
    pub(crate) stored: Vec<StoredTestCase>,
    /// Candidates attempted, including those whose insert failed.
    pub(crate) generated_count: usize,
}

#[derive(Default)]
struct BatchTally {
    stored: Vec<StoredTestCase>,
    attempted: usize,
}

/// Stores candidates one at a time in order, skipping failed inserts, then
/// writes exactly one activity record for the whole batch.
pub(crate) async fn persist_batch(
    store: &SharedStore,
    candidates: Vec<CandidateTestCase>,
    context: &BatchContext<'_>,
) -> PersistedBatch {
    let tally = stream::iter(candidates)
        .fold(BatchTally::default(), move |mut tally, candidate| async move {
            tally.attempted += 1;
            let name = candidate.name.clone();
            match store_candidate(store, candidate, context).await {
                Ok(stored) => tally.stored.push(stored),
                Err(err) => warn!(
                    project_id = %context.project_id,
                    position = tally.attempted,
                    name = %name,
                    error = %err,
                    "Error storing generated test case"
                ),
            }
            tally
        })
        .await;

    let activity = GenerationActivityRecord {
        content: format!(
            "AI generated {} test cases for: \"{}\"",
            tally.attempted, context.original_prompt
        ),
        author_id: context.author_id.to_string(),
        suite_id: tally.stored.first().map(|stored| stored.id.clone()),
        metadata: GenerationActivityMetadata {
            ai_generation: true,
            prompt: context.original_prompt.to_string(),
            generated_count: tally.attempted,
            project_name: context.project_name.to_string(),
        },
    };
    if let Err(err) = store.insert_comment(&activity.into_comment()).await {
        warn!(project_id = %context.project_id, error = %err, "Failed to record generation activity");
    }

    info!(
        project_id = %context.project_id,
        generated = tally.attempted,
        stored = tally.stored.len(),
        "Generated test case batch persisted"
    );

    PersistedBatch {
        stored: tally.stored,
        generated_count: tally.attempted,
    }
}

async fn store_candidate(
    store: &SharedStore,
    candidate: CandidateTestCase,
    context: &BatchContext<'_>,
) -> Result<StoredTestCase> {
    let metadata = TestCaseMetadata {
        ai_generated: true,
        original_prompt: context.original_prompt.to_string(),
        steps: candidate.steps.clone(),
        expected_result: candidate.expected_result.clone(),
        priority: candidate.priority.clone(),
        generated_at: chrono::Utc::now(),
    };

    let suite = store
        .insert_test_suite(&NewTestSuite {
            project_id: context.project_id.to_string(),
            name: candidate.name.clone(),
            description: Some(candidate.description.clone()),
            category: Some(candidate.category.clone()),
            metadata: Some(metadata.clone()),
        })
        .await?;

    Ok(StoredTestCase {
        id: suite.id,
        project_id: suite.project_id,
        case: candidate,
        metadata,
        stored: true,
    })
}
