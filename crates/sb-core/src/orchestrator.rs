use crate::collaborators::{
    ActivityKind, AgentLauncher, CodeHost, Conversation, LanguageModel,
};
use crate::complex_path::run_complex_path;
use crate::error::{ConfigError, SessionError};
use crate::simple_path::{run_simple_path, SimplePathRequest};
use crate::types::{ParsedSession, RepoRef, SimplePathOutcome};
use std::sync::Arc;

const ACK_MESSAGE: &str = "Session received. I'm analyzing the task and will proceed shortly.";

/// The external collaborators one session needs, bundled for injection.
#[derive(Clone)]
pub struct Collaborators {
    pub model: Arc<dyn LanguageModel>,
    pub code_host: Arc<dyn CodeHost>,
    pub launcher: Arc<dyn AgentLauncher>,
    pub conversation: Arc<dyn Conversation>,
}

/// Drives one parsed session through the intake state machine:
/// Received → Acknowledged → simple attempt → (resolved | complex attempt
/// → resolved) | failed. Each session visits the machine exactly once.
pub struct Orchestrator {
    repo: Option<RepoRef>,
    base_branch: String,
    collaborators: Collaborators,
}

impl Orchestrator {
    pub fn new(
        repo: Option<RepoRef>,
        base_branch: impl Into<String>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            repo,
            base_branch: base_branch.into(),
            collaborators,
        }
    }

    /// Never returns an error: every failure inside a session is caught
    /// here and converted into a single conversation message. Failures of
    /// the feedback channel itself are only logged.
    pub async fn process(&self, session: ParsedSession) {
        let session_id = session.session_id.clone();

        let Some(repo) = self.repo.clone() else {
            self.report_error(&session_id, &ConfigError::MissingRepo.to_string())
                .await;
            return;
        };

        if let Err(err) = self
            .collaborators
            .conversation
            .emit(&session_id, ActivityKind::Thought, ACK_MESSAGE)
            .await
        {
            tracing::error!(session = %session_id, error = %err, "failed to acknowledge session");
            return;
        }

        match self.run(&session, &repo).await {
            Ok(message) => {
                if let Err(err) = self
                    .collaborators
                    .conversation
                    .emit(&session_id, ActivityKind::Response, &message)
                    .await
                {
                    tracing::error!(session = %session_id, error = %err, "failed to emit response");
                }
            }
            Err(err) => self.report_error(&session_id, &format!("Error: {err}")).await,
        }
    }

    async fn run(&self, session: &ParsedSession, repo: &RepoRef) -> Result<String, SessionError> {
        let prompt = combined_prompt(session);
        let title = if session.issue_title.is_empty() {
            "Task"
        } else {
            session.issue_title.as_str()
        };
        let description = if !session.issue_description.is_empty() {
            session.issue_description.clone()
        } else if !prompt.is_empty() {
            prompt
        } else {
            "No description.".to_string()
        };

        let outcome = run_simple_path(
            SimplePathRequest {
                title,
                description: &description,
                hint: None,
                repo,
                base_branch: &self.base_branch,
                session_id: &session.session_id,
            },
            self.collaborators.model.as_ref(),
            self.collaborators.code_host.as_ref(),
        )
        .await?;

        if let SimplePathOutcome::Completed { pr_url, .. } = outcome {
            return Ok(format!("Done. PR: {pr_url}"));
        }

        let launch = run_complex_path(
            &format!("{title}\n\n{description}"),
            &repo.to_string(),
            &self.base_branch,
            self.collaborators.launcher.as_ref(),
        )
        .await?;

        Ok(match launch.pr_url {
            Some(url) => format!("Cursor agent started. PR: {url}"),
            None => format!(
                "Cursor agent started (id: {}). Branch: {}.",
                launch.id,
                launch.branch.as_deref().unwrap_or("pending")
            ),
        })
    }

    async fn report_error(&self, session_id: &str, body: &str) {
        if let Err(err) = self
            .collaborators
            .conversation
            .emit(session_id, ActivityKind::Error, body)
            .await
        {
            tracing::error!(session = %session_id, error = %err, "failed to emit error message");
        }
    }
}

fn combined_prompt(session: &ParsedSession) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if !session.prompt_context.is_empty() {
        parts.push(&session.prompt_context);
    }
    if let Some(user_prompt) = session.user_prompt.as_deref() {
        if !user_prompt.is_empty() {
            parts.push(user_prompt);
        }
    }
    parts.join("\n\n")
}
