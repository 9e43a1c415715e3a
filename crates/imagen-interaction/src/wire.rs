//! Shared plumbing for the Gemini REST endpoints.

use imagen_core::ImagenError;
use reqwest::StatusCode;
use serde::Deserialize;

/// Base URL of the Generative Language model endpoints.
pub(crate) const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Environment variable holding the API key.
pub(crate) const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

/// Maps a non-success HTTP response into a provider error, preferring the
/// structured `{error: {message, status}}` body the API returns.
pub(crate) fn map_http_error(status: StatusCode, body: String) -> ImagenError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    ImagenError::provider(format!("HTTP {}: {}", status.as_u16(), message))
}

/// Maps a transport-level failure (connect, timeout, decode) into a
/// provider error.
pub(crate) fn map_transport_error(context: &str, err: reqwest::Error) -> ImagenError {
    ImagenError::provider(format!("{context}: {err}"))
}
