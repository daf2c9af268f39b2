use crate::types::{ParsedSession, SessionAction, WebhookEvent};

/// Normalizes a webhook payload into a [`ParsedSession`]. Returns `None`
/// when the payload carries no session id; such deliveries are benign
/// no-ops, not errors.
pub fn parse_event(event: &WebhookEvent) -> Option<ParsedSession> {
    let session = event.agent_session.as_ref()?;
    let session_id = session.id.clone().filter(|id| !id.is_empty())?;

    let issue = session.issue.as_ref();
    let user_prompt = match event.action {
        SessionAction::Prompted => event
            .agent_activity
            .as_ref()
            .and_then(|activity| activity.body.clone()),
        SessionAction::Created => None,
    };

    Some(ParsedSession {
        session_id,
        action: event.action,
        prompt_context: session.prompt_context.clone().unwrap_or_default(),
        issue_id: issue.map(|issue| issue.id.clone()),
        issue_title: issue.and_then(|issue| issue.title.clone()).unwrap_or_default(),
        issue_description: issue
            .and_then(|issue| issue.description.clone())
            .unwrap_or_default(),
        comment_body: session
            .comment
            .as_ref()
            .and_then(|comment| comment.body.clone()),
        user_prompt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(json: serde_json::Value) -> WebhookEvent {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn parses_created_event_with_issue() {
        let event = event(serde_json::json!({
            "action": "created",
            "agentSession": {
                "id": "S1",
                "issue": {"id": "I1", "title": "Fix typo", "description": "typo in README"}
            }
        }));
        let parsed = parse_event(&event).unwrap();
        assert_eq!(parsed.session_id, "S1");
        assert_eq!(parsed.action, SessionAction::Created);
        assert_eq!(parsed.issue_id.as_deref(), Some("I1"));
        assert_eq!(parsed.issue_title, "Fix typo");
        assert_eq!(parsed.issue_description, "typo in README");
        assert_eq!(parsed.prompt_context, "");
        assert_eq!(parsed.comment_body, None);
        assert_eq!(parsed.user_prompt, None);
    }

    #[test]
    fn user_prompt_only_for_prompted_action() {
        let prompted = event(serde_json::json!({
            "action": "prompted",
            "agentSession": {"id": "S1"},
            "agentActivity": {"body": "please also fix the docs"}
        }));
        let parsed = parse_event(&prompted).unwrap();
        assert_eq!(parsed.user_prompt.as_deref(), Some("please also fix the docs"));

        let created = event(serde_json::json!({
            "action": "created",
            "agentSession": {"id": "S1"},
            "agentActivity": {"body": "ignored for created"}
        }));
        assert_eq!(parse_event(&created).unwrap().user_prompt, None);
    }

    #[test]
    fn missing_session_id_is_a_no_op() {
        let no_session = event(serde_json::json!({"action": "created"}));
        assert!(parse_event(&no_session).is_none());

        let empty_id = event(serde_json::json!({
            "action": "created",
            "agentSession": {"id": ""}
        }));
        assert!(parse_event(&empty_id).is_none());
    }

    #[test]
    fn parsing_is_idempotent() {
        let event = event(serde_json::json!({
            "action": "prompted",
            "agentSession": {
                "id": "S9",
                "promptContext": "context",
                "comment": {"body": "a comment"}
            },
            "agentActivity": {"body": "do it"}
        }));
        assert_eq!(parse_event(&event), parse_event(&event));
    }
}
