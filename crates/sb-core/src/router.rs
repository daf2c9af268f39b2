use crate::collaborators::LanguageModel;
use crate::error::SessionError;
use crate::types::{TaskInput, TaskKind};

const CLASSIFY_SYSTEM_PROMPT: &str = "You classify dev tasks. Reply with exactly one word: \
    simple or complex. Simple = small change, one or few files, clear scope. \
    Complex = multi-file, unclear scope, or needs exploration.";

/// Decides whether a task is simple or complex. An explicit hint wins
/// verbatim and skips the model entirely.
pub async fn route_task(
    input: &TaskInput,
    model: &dyn LanguageModel,
) -> Result<TaskKind, SessionError> {
    if let Some(hint) = input.hint {
        return Ok(hint);
    }
    let user = format!(
        "Title: {}\n\nDescription:\n{}",
        input.title, input.description
    );
    let raw = model.complete(CLASSIFY_SYSTEM_PROMPT, &user).await?;
    Ok(classification_from_response(&raw))
}

/// Only a response starting with "complex" (case-insensitive) routes to
/// the expensive path. Anything else, malformed output included, falls
/// open to the cheap simple path.
pub fn classification_from_response(raw: &str) -> TaskKind {
    if raw.trim().to_lowercase().starts_with("complex") {
        TaskKind::Complex
    } else {
        TaskKind::Simple
    }
}
