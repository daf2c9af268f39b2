use crate::{status_error, transport_error};
use async_trait::async_trait;
use sb_core::collaborators::LanguageModel;
use sb_core::config::LlmBackendConfig;
use sb_core::error::{ExternalError, SessionError};
use serde::Deserialize;

const SERVICE: &str = "llm";
const TEMPERATURE: f64 = 0.2;

/// Chat-completion client. The backend is fixed at construction from
/// configuration; there is no per-call probing.
pub struct LlmClient {
    http: reqwest::Client,
    backend: LlmBackendConfig,
}

impl LlmClient {
    pub fn new(backend: LlmBackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            backend,
        }
    }
}

fn messages(system: &str, user: &str) -> serde_json::Value {
    serde_json::json!([
        { "role": "system", "content": system },
        { "role": "user", "content": user },
    ])
}

fn malformed(message: impl Into<String>) -> SessionError {
    ExternalError::MalformedResponse {
        service: SERVICE,
        message: message.into(),
    }
    .into()
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: String,
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, SessionError> {
        match &self.backend {
            LlmBackendConfig::Ollama { base_url, model } => {
                let response = self
                    .http
                    .post(format!("{}/api/chat", base_url.trim_end_matches('/')))
                    .json(&serde_json::json!({
                        "model": model,
                        "messages": messages(system, user),
                        "stream": false,
                        "options": { "temperature": TEMPERATURE },
                    }))
                    .send()
                    .await
                    .map_err(|err| transport_error(SERVICE, err))?;
                if !response.status().is_success() {
                    return Err(status_error(SERVICE, response).await);
                }
                let payload: OllamaResponse =
                    response.json().await.map_err(|err| malformed(err.to_string()))?;
                Ok(payload.message.content)
            }
            LlmBackendConfig::OpenAi {
                base_url,
                api_key,
                model,
            } => {
                let response = self
                    .http
                    .post(format!(
                        "{}/chat/completions",
                        base_url.trim_end_matches('/')
                    ))
                    .bearer_auth(api_key)
                    .json(&serde_json::json!({
                        "model": model,
                        "messages": messages(system, user),
                        "temperature": TEMPERATURE,
                    }))
                    .send()
                    .await
                    .map_err(|err| transport_error(SERVICE, err))?;
                if !response.status().is_success() {
                    return Err(status_error(SERVICE, response).await);
                }
                let payload: OpenAiResponse =
                    response.json().await.map_err(|err| malformed(err.to_string()))?;
                payload
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content)
                    .ok_or_else(|| malformed("response carried no choices"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_array_has_system_then_user() {
        let value = messages("be terse", "do the thing");
        assert_eq!(value[0]["role"], "system");
        assert_eq!(value[0]["content"], "be terse");
        assert_eq!(value[1]["role"], "user");
        assert_eq!(value[1]["content"], "do the thing");
    }

    #[test]
    fn ollama_response_shape_decodes() {
        let payload: OllamaResponse =
            serde_json::from_str(r#"{"model":"llama3.2","message":{"role":"assistant","content":"simple"}}"#)
                .unwrap();
        assert_eq!(payload.message.content, "simple");
    }

    #[test]
    fn openai_response_shape_decodes() {
        let payload: OpenAiResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"complex"}}]}"#,
        )
        .unwrap();
        assert_eq!(payload.choices[0].message.content, "complex");
    }
}
