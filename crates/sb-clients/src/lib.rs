//! reqwest-backed implementations of the collaborator traits from
//! `sb-core`. Each client requires its credential lazily: a missing
//! credential fails the operation that needs it, never process startup.

pub mod cursor;
pub mod github;
pub mod linear;
pub mod llm;

use sb_core::error::{ExternalError, SessionError};

pub(crate) fn transport_error(service: &'static str, err: reqwest::Error) -> SessionError {
    ExternalError::Transport {
        service,
        message: err.to_string(),
    }
    .into()
}

/// Converts a non-success response into an error carrying the status and
/// a bounded slice of the body.
pub(crate) async fn status_error(
    service: &'static str,
    response: reqwest::Response,
) -> SessionError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ExternalError::Http {
        service,
        status,
        body: truncate(&body, 800),
    }
    .into()
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
