use crate::collaborators::{CodeHost, LanguageModel};
use crate::error::{GenerationError, SessionError};
use crate::router::route_task;
use crate::types::{FileChange, RepoRef, SimplePathOutcome, TaskInput, TaskKind};
use chrono::{DateTime, Utc};

const GENERATE_SYSTEM_PROMPT: &str = "You are a coding assistant. For the given task, output \
    exactly one JSON object with two keys: \"path\" (file path relative to repo root) and \
    \"content\" (full file content as a string). Escape quotes and newlines in content \
    properly. No markdown, no explanation, only the JSON.";

pub struct SimplePathRequest<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub hint: Option<TaskKind>,
    pub repo: &'a RepoRef,
    pub base_branch: &'a str,
    pub session_id: &'a str,
}

/// Attempts the direct-edit path: route, generate one file change, push a
/// fresh branch, open a PR. A `complex` routing is reported via the
/// `Delegated` marker so the caller can fall through to the cloud agent.
///
/// There is no rollback: a branch created before a later step fails is
/// left in place.
pub async fn run_simple_path(
    request: SimplePathRequest<'_>,
    model: &dyn LanguageModel,
    host: &dyn CodeHost,
) -> Result<SimplePathOutcome, SessionError> {
    let kind = route_task(
        &TaskInput {
            title: request.title.to_string(),
            description: request.description.to_string(),
            hint: request.hint,
        },
        model,
    )
    .await?;
    if kind == TaskKind::Complex {
        return Ok(SimplePathOutcome::Delegated);
    }

    let change = generate_file_change(request.title, request.description, model).await?;
    let branch = branch_name(request.session_id, Utc::now());

    let base_sha = host.branch_tip(request.repo, request.base_branch).await?;
    host.create_branch(request.repo, &branch, &base_sha).await?;
    host.upsert_file(
        request.repo,
        &branch,
        &change.path,
        &change.content,
        &format!("Update {}", change.path),
    )
    .await?;
    let pr_url = host
        .open_pull_request(
            request.repo,
            &branch,
            request.base_branch,
            request.title,
            request.description,
        )
        .await?;

    Ok(SimplePathOutcome::Completed { pr_url, branch })
}

async fn generate_file_change(
    title: &str,
    description: &str,
    model: &dyn LanguageModel,
) -> Result<FileChange, SessionError> {
    let raw = model
        .complete(GENERATE_SYSTEM_PROMPT, &format!("Task: {title}\n\n{description}"))
        .await?;
    Ok(parse_file_change(&raw)?)
}

/// Defensive parse of model output: take the first balanced JSON object
/// from the raw text and require the `{path, content}` shape. The model
/// is instructed to emit bare JSON but may still wrap it in commentary
/// or fences.
pub fn parse_file_change(raw: &str) -> Result<FileChange, GenerationError> {
    let json = extract_json_object(raw).ok_or(GenerationError::NoJsonObject)?;
    let change: FileChange =
        serde_json::from_str(json).map_err(|err| GenerationError::MalformedChange {
            message: err.to_string(),
        })?;
    if change.path.trim().is_empty() {
        return Err(GenerationError::MalformedChange {
            message: "empty path".to_string(),
        });
    }
    Ok(change)
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, byte) in raw.as_bytes()[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Fresh branch per invocation: timestamp plus a session-id suffix so
/// concurrent runs against the same repository cannot collide on
/// timestamp granularity alone.
pub fn branch_name(session_id: &str, now: DateTime<Utc>) -> String {
    let suffix: String = session_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(8)
        .collect::<String>()
        .to_lowercase();
    if suffix.is_empty() {
        format!("bot/simple-{}", now.timestamp())
    } else {
        format!("bot/simple-{}-{}", now.timestamp(), suffix)
    }
}
