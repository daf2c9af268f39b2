//! Trait seams for the external collaborators. The orchestration pipeline
//! only ever talks to these traits; concrete reqwest-backed clients live
//! in `sb-clients`, mocks live next to the tests.

use crate::error::SessionError;
use crate::types::{AgentLaunch, RepoRef};
use async_trait::async_trait;

/// Chat-completion backend used for classification and file-change
/// generation. Returns the raw response text; interpretation belongs to
/// the caller.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, SessionError>;
}

/// Source-control hosting operations needed by the simple path.
#[async_trait]
pub trait CodeHost: Send + Sync {
    async fn branch_tip(&self, repo: &RepoRef, branch: &str) -> Result<String, SessionError>;

    async fn create_branch(
        &self,
        repo: &RepoRef,
        name: &str,
        from_sha: &str,
    ) -> Result<(), SessionError>;

    /// Creates or overwrites one file on `branch`. Implementations must
    /// look up the file's current revision marker first (absent if the
    /// file is new) to avoid a lost-update conflict.
    async fn upsert_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), SessionError>;

    async fn open_pull_request(
        &self,
        repo: &RepoRef,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<String, SessionError>;
}

#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub prompt: String,
    pub repository: String,
    pub base_branch: String,
}

/// Launches an autonomous cloud coding agent.
#[async_trait]
pub trait AgentLauncher: Send + Sync {
    async fn launch(&self, request: &LaunchRequest) -> Result<AgentLaunch, SessionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Thought,
    Response,
    Error,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thought => "thought",
            Self::Response => "response",
            Self::Error => "error",
        }
    }
}

/// Feedback channel back to the originating conversation.
#[async_trait]
pub trait Conversation: Send + Sync {
    async fn emit(
        &self,
        session_id: &str,
        kind: ActivityKind,
        body: &str,
    ) -> Result<(), SessionError>;
}
