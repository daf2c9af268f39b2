use serde::{Deserialize, Serialize};
use std::fmt;

/// Action carried by an agent-session webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionAction {
    Created,
    Prompted,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Prompted => write!(f, "prompted"),
        }
    }
}

/// Raw webhook payload for an agent-session event. Immutable once
/// deserialized; unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub action: SessionAction,
    #[serde(default)]
    pub agent_session: Option<AgentSession>,
    #[serde(default)]
    pub agent_activity: Option<AgentActivity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSession {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub issue: Option<SessionIssue>,
    #[serde(default)]
    pub comment: Option<SessionComment>,
    #[serde(default)]
    pub prompt_context: Option<String>,
    #[serde(default)]
    pub previous_comments: Option<Vec<SessionComment>>,
    #[serde(default)]
    pub guidance: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionIssue {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionComment {
    #[serde(default)]
    pub body: Option<String>,
}

/// Latest activity attached to a `prompted` delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentActivity {
    #[serde(default)]
    pub body: Option<String>,
}
