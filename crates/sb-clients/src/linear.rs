use crate::{status_error, transport_error};
use async_trait::async_trait;
use sb_core::collaborators::{ActivityKind, Conversation};
use sb_core::error::{ConfigError, ExternalError, SessionError};

const SERVICE: &str = "linear";
const DEFAULT_API_URL: &str = "https://api.linear.app/graphql";

const AGENT_ACTIVITY_MUTATION: &str = "\
mutation AgentActivityCreate($input: AgentActivityCreateInput!) {
  agentActivityCreate(input: $input) {
    success
    agentActivity { id }
  }
}";

/// Emits agent activities (thought / response / error) back to the
/// Linear conversation via the GraphQL API.
pub struct LinearClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl LinearClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_url(DEFAULT_API_URL, api_key)
    }

    pub fn with_url(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str, SessionError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingCredential { name: "LINEAR_API_KEY" }.into())
    }
}

fn activity_request(session_id: &str, kind: ActivityKind, body: &str) -> serde_json::Value {
    serde_json::json!({
        "query": AGENT_ACTIVITY_MUTATION,
        "variables": {
            "input": {
                "agentSessionId": session_id,
                "content": { "type": kind.as_str(), "body": body },
            }
        }
    })
}

#[async_trait]
impl Conversation for LinearClient {
    async fn emit(
        &self,
        session_id: &str,
        kind: ActivityKind,
        body: &str,
    ) -> Result<(), SessionError> {
        let api_key = self.api_key()?;
        let response = self
            .http
            .post(&self.api_url)
            .header(reqwest::header::AUTHORIZATION, api_key)
            .json(&activity_request(session_id, kind, body))
            .send()
            .await
            .map_err(|err| transport_error(SERVICE, err))?;
        if !response.status().is_success() {
            return Err(status_error(SERVICE, response).await);
        }
        let payload: serde_json::Value = response.json().await.map_err(|err| {
            SessionError::from(ExternalError::MalformedResponse {
                service: SERVICE,
                message: err.to_string(),
            })
        })?;
        let success = payload["data"]["agentActivityCreate"]["success"].as_bool();
        if success != Some(true) {
            return Err(ExternalError::MalformedResponse {
                service: SERVICE,
                message: "agentActivityCreate did not report success".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_mutation_request() {
        let request = activity_request("S1", ActivityKind::Thought, "analyzing");
        assert_eq!(request["variables"]["input"]["agentSessionId"], "S1");
        assert_eq!(request["variables"]["input"]["content"]["type"], "thought");
        assert_eq!(request["variables"]["input"]["content"]["body"], "analyzing");
        assert!(request["query"]
            .as_str()
            .unwrap()
            .contains("agentActivityCreate"));
    }

    #[test]
    fn missing_key_fails_the_operation() {
        let client = LinearClient::new(None);
        assert!(matches!(
            client.api_key().unwrap_err(),
            SessionError::Config(ConfigError::MissingCredential { name: "LINEAR_API_KEY" })
        ));
    }
}
