use crate::types::event::SessionAction;

/// Normalized projection of a webhook event. Every optional payload field
/// is collapsed to an empty string or `None` so downstream code never
/// deals with absent fields. Built once per accepted delivery, never
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSession {
    pub session_id: String,
    pub action: SessionAction,
    pub prompt_context: String,
    pub issue_id: Option<String>,
    pub issue_title: String,
    pub issue_description: String,
    pub comment_body: Option<String>,
    /// Only populated for `prompted` deliveries.
    pub user_prompt: Option<String>,
}
