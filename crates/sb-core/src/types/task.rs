use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Simple,
    Complex,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

/// Input to the router. An explicit hint bypasses classification entirely.
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub hint: Option<TaskKind>,
}

/// One file's full target content. The simple path produces exactly one
/// of these per task.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub content: String,
}

/// Outcome of the simple path. `Delegated` is the marker telling the
/// orchestrator to fall through to the cloud-agent path; it is not an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimplePathOutcome {
    Completed { pr_url: String, branch: String },
    Delegated,
}

/// Tracking handle returned by the cloud-agent launch. `pr_url` may not
/// be known yet at launch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentLaunch {
    pub id: String,
    pub status: String,
    pub branch: Option<String>,
    pub pr_url: Option<String>,
}

/// Owner/name pair for the target repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
