use crate::{status_error, transport_error};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sb_core::collaborators::{AgentLauncher, LaunchRequest};
use sb_core::error::{ConfigError, ExternalError, SessionError};
use sb_core::types::AgentLaunch;
use serde::Deserialize;

const SERVICE: &str = "cursor";

/// Cursor cloud-agent launch client. Cursor clones the repository, runs
/// the agent, and pushes to a branch of its own.
pub struct CursorClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CursorClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn auth_header(&self) -> Result<String, SessionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ConfigError::MissingCredential { name: "CURSOR_API_KEY" })?;
        Ok(basic_auth(api_key))
    }
}

/// Cursor authenticates with HTTP basic auth: the API key as the user,
/// empty password.
fn basic_auth(api_key: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{api_key}:")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LaunchResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default)]
    pr_url: Option<String>,
}

impl From<LaunchResponse> for AgentLaunch {
    fn from(response: LaunchResponse) -> Self {
        Self {
            id: response.id.unwrap_or_default(),
            status: response.status.unwrap_or_else(|| "unknown".to_string()),
            branch: response.branch,
            pr_url: response.pr_url,
        }
    }
}

#[async_trait]
impl AgentLauncher for CursorClient {
    async fn launch(&self, request: &LaunchRequest) -> Result<AgentLaunch, SessionError> {
        let auth = self.auth_header()?;
        let response = self
            .http
            .post(format!("{}/v1/cloud-agent/tasks", self.base_url))
            .header(reqwest::header::AUTHORIZATION, auth)
            .json(&serde_json::json!({
                "prompt": request.prompt,
                "repository": request.repository,
                "baseBranch": request.base_branch,
            }))
            .send()
            .await
            .map_err(|err| transport_error(SERVICE, err))?;
        if !response.status().is_success() {
            return Err(status_error(SERVICE, response).await);
        }
        let launch: LaunchResponse = response.json().await.map_err(|err| {
            SessionError::from(ExternalError::MalformedResponse {
                service: SERVICE,
                message: err.to_string(),
            })
        })?;
        Ok(launch.into())
    }
}
