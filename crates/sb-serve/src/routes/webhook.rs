use crate::middleware::correlation::CorrelationId;
use crate::routes::error::error_response;
use crate::signature;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Router};
use chrono::Utc;
use sb_core::parser::parse_event;
use sb_core::types::WebhookEvent;

const SIGNATURE_HEADER: &str = "linear-signature";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/linear", post(receive_webhook))
        .with_state(state)
}

/// Webhook intake boundary. Verifies, deduplicates, parses, then returns
/// 200 immediately and hands the session to a detached task; all heavy
/// work happens after the sender has its response, so slow collaborators
/// can never trigger the sender's retry timeout.
pub(crate) async fn receive_webhook(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(secret) = state.webhook_secret.as_deref() {
        let provided = headers
            .get(SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok());
        if !signature::verify(Some(secret), &body, provided) {
            return error_response(
                StatusCode::UNAUTHORIZED,
                "invalid_signature",
                "invalid signature".to_string(),
                Some(correlation.0),
            );
        }
    }

    let raw: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "invalid_json",
                err.to_string(),
                Some(correlation.0),
            );
        }
    };

    // Valid JSON that is not an agent-session event is acknowledged as a
    // no-op, not rejected.
    let Ok(event) = serde_json::from_value::<WebhookEvent>(raw) else {
        return StatusCode::OK.into_response();
    };

    if let Some(session_id) = event
        .agent_session
        .as_ref()
        .and_then(|session| session.id.as_deref())
    {
        if state.dedup.observe(session_id, event.action, Utc::now()) {
            tracing::debug!(session = %session_id, action = %event.action, "duplicate delivery dropped");
            return StatusCode::OK.into_response();
        }
    }

    if let Some(session) = parse_event(&event) {
        let orchestrator = state.orchestrator.clone();
        tokio::spawn(async move { orchestrator.process(session).await });
    }

    StatusCode::OK.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::Deduplicator;
    use crate::{app, AppState};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use sb_core::collaborators::{
        ActivityKind, AgentLauncher, CodeHost, Conversation, LanguageModel, LaunchRequest,
    };
    use sb_core::error::SessionError;
    use sb_core::types::{AgentLaunch, RepoRef};
    use sb_core::{Collaborators, Orchestrator};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    const SECRET: &str = "webhook-secret";

    struct ScriptedModel {
        responses: Mutex<VecDeque<String>>,
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, SessionError> {
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("model called more times than scripted"))
        }
    }

    struct StubHost;

    #[async_trait]
    impl CodeHost for StubHost {
        async fn branch_tip(&self, _repo: &RepoRef, _branch: &str) -> Result<String, SessionError> {
            Ok("abc123".to_string())
        }

        async fn create_branch(
            &self,
            _repo: &RepoRef,
            _name: &str,
            _from_sha: &str,
        ) -> Result<(), SessionError> {
            Ok(())
        }

        async fn upsert_file(
            &self,
            _repo: &RepoRef,
            _branch: &str,
            _path: &str,
            _content: &str,
            _message: &str,
        ) -> Result<(), SessionError> {
            Ok(())
        }

        async fn open_pull_request(
            &self,
            _repo: &RepoRef,
            _head: &str,
            _base: &str,
            _title: &str,
            _body: &str,
        ) -> Result<String, SessionError> {
            Ok("https://github.com/octo/widgets/pull/7".to_string())
        }
    }

    struct StubLauncher;

    #[async_trait]
    impl AgentLauncher for StubLauncher {
        async fn launch(&self, _request: &LaunchRequest) -> Result<AgentLaunch, SessionError> {
            Ok(AgentLaunch {
                id: "A1".to_string(),
                status: "running".to_string(),
                branch: None,
                pr_url: None,
            })
        }
    }

    #[derive(Default)]
    struct RecordingConversation {
        messages: Mutex<Vec<(ActivityKind, String)>>,
    }

    #[async_trait]
    impl Conversation for RecordingConversation {
        async fn emit(
            &self,
            _session_id: &str,
            kind: ActivityKind,
            body: &str,
        ) -> Result<(), SessionError> {
            self.messages.lock().unwrap().push((kind, body.to_string()));
            Ok(())
        }
    }

    fn state_with(
        secret: Option<&str>,
        responses: &[&str],
    ) -> (AppState, Arc<RecordingConversation>) {
        let conversation = Arc::new(RecordingConversation::default());
        let orchestrator = Orchestrator::new(
            Some(RepoRef {
                owner: "octo".to_string(),
                name: "widgets".to_string(),
            }),
            "main",
            Collaborators {
                model: Arc::new(ScriptedModel {
                    responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
                }),
                code_host: Arc::new(StubHost),
                launcher: Arc::new(StubLauncher),
                conversation: conversation.clone(),
            },
        );
        let state = AppState {
            webhook_secret: secret.map(|s| s.to_string()),
            dedup: Arc::new(Deduplicator::with_default_window()),
            orchestrator: Arc::new(orchestrator),
            model: Arc::new(ScriptedModel {
                responses: Mutex::new(VecDeque::new()),
            }),
        };
        (state, conversation)
    }

    fn scenario_a_body() -> String {
        serde_json::json!({
            "action": "created",
            "agentSession": {
                "id": "S1",
                "issue": {"id": "I1", "title": "Fix typo", "description": "typo in README"}
            }
        })
        .to_string()
    }

    fn request(body: &str, signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhooks/linear")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn wait_for_messages(conversation: &RecordingConversation, count: usize) {
        for _ in 0..200 {
            if conversation.messages.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for {count} conversation messages");
    }

    async fn settle() {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn invalid_signature_is_unauthorized_and_creates_no_session() {
        let (state, conversation) = state_with(Some(SECRET), &[]);
        let app = app(state);

        let body = scenario_a_body();
        let response = app
            .oneshot(request(&body, Some("deadbeef")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        settle().await;
        assert!(conversation.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_signature_is_unauthorized_when_a_secret_is_configured() {
        let (state, _conversation) = state_with(Some(SECRET), &[]);
        let response = app(state)
            .oneshot(request(&scenario_a_body(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_signature_is_accepted_and_processed() {
        let (state, conversation) = state_with(
            Some(SECRET),
            &["simple", r#"{"path":"README.md","content":"fixed"}"#],
        );
        let app = app(state);

        let body = scenario_a_body();
        let signature = signature::sign(SECRET, body.as_bytes());
        let response = app.oneshot(request(&body, Some(&signature))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        wait_for_messages(&conversation, 2).await;
        let messages = conversation.messages.lock().unwrap();
        assert_eq!(messages[1].0, ActivityKind::Response);
        assert_eq!(
            messages[1].1,
            "Done. PR: https://github.com/octo/widgets/pull/7"
        );
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (state, conversation) = state_with(None, &[]);
        let response = app(state)
            .oneshot(request("{not json", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        settle().await;
        assert!(conversation.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn event_without_a_session_is_acknowledged_as_a_no_op() {
        let (state, conversation) = state_with(None, &[]);
        let response = app(state)
            .oneshot(request(r#"{"action":"created"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        settle().await;
        assert!(conversation.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unrecognized_event_shape_is_acknowledged_as_a_no_op() {
        let (state, conversation) = state_with(None, &[]);
        let response = app(state)
            .oneshot(request(r#"{"action":"removed","something":"else"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        settle().await;
        assert!(conversation.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_delivery_yields_no_second_processing() {
        let (state, conversation) = state_with(
            None,
            &["simple", r#"{"path":"README.md","content":"fixed"}"#],
        );
        let app = app(state);

        let body = scenario_a_body();
        let first = app
            .clone()
            .oneshot(request(&body, None))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        wait_for_messages(&conversation, 2).await;

        let second = app.oneshot(request(&body, None)).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);

        settle().await;
        assert_eq!(conversation.messages.lock().unwrap().len(), 2);
    }
}
