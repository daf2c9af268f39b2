use crate::{status_error, transport_error};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::StatusCode;
use sb_core::collaborators::CodeHost;
use sb_core::error::{ConfigError, ExternalError, SessionError};
use sb_core::types::RepoRef;
use serde::Deserialize;

const SERVICE: &str = "github";
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// GitHub REST v3 client backing the [`CodeHost`] trait.
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self, SessionError> {
        Self::with_base(DEFAULT_API_BASE, token)
    }

    pub fn with_base(api_base: impl Into<String>, token: Option<String>) -> Result<Self, SessionError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("switchboard"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| transport_error(SERVICE, err))?;
        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn token(&self) -> Result<&str, SessionError> {
        self.token
            .as_deref()
            .ok_or_else(|| ConfigError::MissingCredential { name: "GITHUB_TOKEN" }.into())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, SessionError> {
        let token = self.token()?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| transport_error(SERVICE, err))?;
        if !response.status().is_success() {
            return Err(status_error(SERVICE, response).await);
        }
        Ok(response)
    }

    /// Revision marker of `path` on `branch`, or `None` if the file does
    /// not exist there yet. Needed by the contents API to avoid a
    /// lost-update conflict on overwrite.
    async fn file_sha(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>, SessionError> {
        let token = self.token()?;
        let response = self
            .http
            .get(format!(
                "{}/repos/{}/{}/contents/{}",
                self.api_base, repo.owner, repo.name, path
            ))
            .query(&[("ref", branch)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| transport_error(SERVICE, err))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(SERVICE, response).await);
        }
        let info: ContentInfo = response.json().await.map_err(decode_error)?;
        Ok(Some(info.sha))
    }
}

fn decode_error(err: reqwest::Error) -> SessionError {
    ExternalError::MalformedResponse {
        service: SERVICE,
        message: err.to_string(),
    }
    .into()
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ContentInfo {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    html_url: String,
}

#[async_trait]
impl CodeHost for GithubClient {
    async fn branch_tip(&self, repo: &RepoRef, branch: &str) -> Result<String, SessionError> {
        let response = self
            .send(self.http.get(format!(
                "{}/repos/{}/{}/git/ref/heads/{}",
                self.api_base, repo.owner, repo.name, branch
            )))
            .await?;
        let reference: RefResponse = response.json().await.map_err(decode_error)?;
        Ok(reference.object.sha)
    }

    async fn create_branch(
        &self,
        repo: &RepoRef,
        name: &str,
        from_sha: &str,
    ) -> Result<(), SessionError> {
        self.send(
            self.http
                .post(format!(
                    "{}/repos/{}/{}/git/refs",
                    self.api_base, repo.owner, repo.name
                ))
                .json(&serde_json::json!({
                    "ref": format!("refs/heads/{name}"),
                    "sha": from_sha,
                })),
        )
        .await?;
        Ok(())
    }

    async fn upsert_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), SessionError> {
        let current_sha = self.file_sha(repo, branch, path).await?;
        let mut payload = serde_json::json!({
            "message": message,
            "content": BASE64.encode(content.as_bytes()),
            "branch": branch,
        });
        if let Some(sha) = current_sha {
            payload["sha"] = serde_json::Value::String(sha);
        }
        self.send(
            self.http
                .put(format!(
                    "{}/repos/{}/{}/contents/{}",
                    self.api_base, repo.owner, repo.name, path
                ))
                .json(&payload),
        )
        .await?;
        Ok(())
    }

    async fn open_pull_request(
        &self,
        repo: &RepoRef,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<String, SessionError> {
        let response = self
            .send(
                self.http
                    .post(format!(
                        "{}/repos/{}/{}/pulls",
                        self.api_base, repo.owner, repo.name
                    ))
                    .json(&serde_json::json!({
                        "title": title,
                        "body": body,
                        "head": head,
                        "base": base,
                    })),
            )
            .await?;
        let pull: PullResponse = response.json().await.map_err(decode_error)?;
        Ok(pull.html_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_fails_the_operation_with_a_config_error() {
        let client = GithubClient::new(None).unwrap();
        let err = client.token().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Config(ConfigError::MissingCredential { name: "GITHUB_TOKEN" })
        ));
    }

    #[test]
    fn ref_response_shape_decodes() {
        let reference: RefResponse =
            serde_json::from_str(r#"{"ref":"refs/heads/main","object":{"sha":"abc","type":"commit"}}"#)
                .unwrap();
        assert_eq!(reference.object.sha, "abc");
    }

    #[test]
    fn api_base_trailing_slash_is_normalized() {
        let client = GithubClient::with_base("https://ghe.example.com/api/v3/", None).unwrap();
        assert_eq!(client.api_base, "https://ghe.example.com/api/v3");
    }
}
