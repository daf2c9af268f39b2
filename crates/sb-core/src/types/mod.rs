pub mod event;
pub mod session;
pub mod task;

pub use event::{AgentActivity, AgentSession, SessionAction, WebhookEvent};
pub use session::ParsedSession;
pub use task::{AgentLaunch, FileChange, RepoRef, SimplePathOutcome, TaskInput, TaskKind};
