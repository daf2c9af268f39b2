use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GITHUB_REPO is not set. Set it to e.g. owner/repo or full GitHub URL.")]
    MissingRepo,
    #[error("{name} is not set")]
    MissingCredential { name: &'static str },
    #[error("invalid repo: {value}")]
    InvalidRepo { value: String },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model output contains no JSON object")]
    NoJsonObject,
    #[error("model did not return a valid {{path, content}} change: {message}")]
    MalformedChange { message: String },
}

#[derive(Debug, Error)]
pub enum ExternalError {
    #[error("{service} request failed with status {status}: {body}")]
    Http {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },
    #[error("{service} returned an unexpected response: {message}")]
    MalformedResponse {
        service: &'static str,
        message: String,
    },
}

/// Umbrella error for one session's execution. Caught exactly once at the
/// orchestrator boundary and reported as a single conversation message.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    External(#[from] ExternalError),
}
