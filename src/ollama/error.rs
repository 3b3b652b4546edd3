//! Typed failures for the local model service client

use std::time::Duration;
use thiserror::Error;

/// Errors from talking to the local Ollama service.
///
/// Every way the service can let us down is a value here, so callers decide
/// whether to fall back rather than unwinding.
#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("Ollama is not reachable at {url}")]
    Unavailable { url: String },

    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Ollama returned HTTP {status}: {message}")]
    Http {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Classify a transport error into the variant callers branch on.
pub(crate) fn classify(err: reqwest::Error, url: &str, timeout: Duration) -> OllamaError {
    if err.is_timeout() {
        OllamaError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else if err.is_connect() {
        OllamaError::Unavailable {
            url: url.to_string(),
        }
    } else {
        OllamaError::Request(err)
    }
}
