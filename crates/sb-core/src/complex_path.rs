use crate::collaborators::{AgentLauncher, LaunchRequest};
use crate::error::SessionError;
use crate::types::AgentLaunch;

/// Delegates a complex task to the cloud agent. One launch call, no
/// polling: the returned handle may or may not already carry a PR URL.
pub async fn run_complex_path(
    prompt: &str,
    repository: &str,
    base_branch: &str,
    launcher: &dyn AgentLauncher,
) -> Result<AgentLaunch, SessionError> {
    launcher
        .launch(&LaunchRequest {
            prompt: prompt.to_string(),
            repository: repository.to_string(),
            base_branch: base_branch.to_string(),
        })
        .await
}
