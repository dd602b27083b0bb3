use serde::Serialize;

/// Outcome of routing one chat message.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum AssistantReply {
    /// Scroll the landing page to the named section anchor.
    Scroll(String),
    Answer(String),
    Error(String),
}
