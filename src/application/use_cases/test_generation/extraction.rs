use crate::domain::test_case::RawTestCase;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

static JSON_FENCE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"```json([\s\S]*?)```").unwrap());

static BRACE_SPAN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

/// Structured content recovered from a generative reply.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Extraction {
    Candidates(Vec<RawTestCase>),
    Empty,
}

impl Extraction {
    pub(crate) fn len(&self) -> usize {
        match self {
            Extraction::Candidates(cases) => cases.len(),
            Extraction::Empty => 0,
        }
    }
}

#[derive(Deserialize)]
struct TestCasesEnvelope {
    #[serde(rename = "testCases", default)]
    test_cases: Option<Vec<serde_json::Value>>,
}

/// Pulls the `testCases` array out of free-form reply text.
///
/// A ```json fence wins over a bare `{...}` span; whichever matches first
/// is the only payload considered. Anything unreadable yields `Empty`.
pub(crate) fn extract_test_cases(reply: &str) -> Extraction {
    let payload = match JSON_FENCE_PATTERN.captures(reply) {
        Some(captures) => captures.get(1).map(|m| m.as_str()),
        None => BRACE_SPAN_PATTERN.find(reply).map(|m| m.as_str()),
    };

    let Some(payload) = payload else {
        debug!("No JSON payload found in generative reply");
        return Extraction::Empty;
    };

    match parse_test_cases(payload) {
        Ok(cases) if !cases.is_empty() => Extraction::Candidates(cases),
        Ok(_) => Extraction::Empty,
        Err(err) => {
            debug!(error = %err, "Generative reply payload is not valid JSON");
            Extraction::Empty
        }
    }
}

fn parse_test_cases(payload: &str) -> Result<Vec<RawTestCase>, serde_json::Error> {
    let envelope: TestCasesEnvelope = serde_json::from_str(payload.trim())?;
    let items = envelope.test_cases.unwrap_or_default();
    let total = items.len();

    let cases: Vec<RawTestCase> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if cases.len() < total {
        debug!(dropped = total - cases.len(), "Dropped malformed test case entries");
    }

    Ok(cases)
}
