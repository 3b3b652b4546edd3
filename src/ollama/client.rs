//! HTTP client for a local Ollama-compatible model service

use super::error::{classify, OllamaError};
use super::stream::{response_stream, ResponseStream};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout for the lightweight availability probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Timeout for listing installed models.
const LIST_TIMEOUT: Duration = Duration::from_secs(5);

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "mistral".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_temperature() -> f32 {
    0.7
}

fn default_num_ctx() -> u32 {
    2048
}

/// Connection and generation settings for the model service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaSettings {
    /// Base URL of the service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name passed to the generate endpoint.
    #[serde(default = "default_model")]
    pub model: String,

    /// Timeout for a generation call; streamed reads are each bounded by it.
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Context window size in tokens.
    #[serde(default = "default_num_ctx")]
    pub num_ctx: u32,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            request_timeout: default_request_timeout(),
            temperature: default_temperature(),
            num_ctx: default_num_ctx(),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    temperature: f32,
    num_ctx: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

/// Client for the generate and tags endpoints of a local Ollama service.
pub struct OllamaClient {
    settings: OllamaSettings,
    http: reqwest::Client,
}

impl OllamaClient {
    /// Create a client with the given settings.
    pub fn new(settings: OllamaSettings) -> Self {
        Self {
            settings,
            http: reqwest::Client::new(),
        }
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Whether the service answers its tags endpoint within the probe window.
    pub async fn is_available(&self) -> bool {
        let url = self.tags_url();
        match self.http.get(&url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Ollama availability probe failed: {}", e);
                false
            }
        }
    }

    /// Names of the models installed on the service.
    pub async fn list_models(&self) -> Result<Vec<String>, OllamaError> {
        let url = self.tags_url();
        let response = self
            .http
            .get(&url)
            .timeout(LIST_TIMEOUT)
            .send()
            .await
            .map_err(|e| classify(e, &url, LIST_TIMEOUT))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OllamaError::Http { status, message });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify(e, &url, LIST_TIMEOUT))?;
        let tags: TagsResponse = serde_json::from_str(&body)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Generate a complete response for `prompt`, waiting for the full body.
    pub async fn generate(&self, prompt: &str, system: &str) -> Result<String, OllamaError> {
        self.ensure_available().await?;

        let url = self.generate_url();
        let timeout = self.settings.request_timeout;
        let response = self
            .http
            .post(&url)
            .timeout(timeout)
            .json(&self.request_body(prompt, system, false))
            .send()
            .await
            .map_err(|e| classify(e, &url, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OllamaError::Http { status, message });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify(e, &url, timeout))?;
        let decoded: GenerateResponse = serde_json::from_str(&body)?;
        Ok(decoded.response)
    }

    /// Start a streaming generation, returning fragments as they arrive.
    ///
    /// The timeout bounds connecting and each subsequent read, not the whole
    /// generation; a stalled stream simply ends.
    pub async fn generate_stream(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<ResponseStream, OllamaError> {
        self.ensure_available().await?;

        let url = self.generate_url();
        let timeout = self.settings.request_timeout;
        let request = self
            .http
            .post(&url)
            .json(&self.request_body(prompt, system, true));

        let sent = tokio::time::timeout(timeout, request.send()).await;
        let response = match sent {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(classify(e, &url, timeout)),
            Err(_) => {
                return Err(OllamaError::Timeout {
                    url,
                    timeout,
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OllamaError::Http { status, message });
        }

        Ok(response_stream(response, timeout))
    }

    async fn ensure_available(&self) -> Result<(), OllamaError> {
        if self.is_available().await {
            Ok(())
        } else {
            Err(OllamaError::Unavailable {
                url: self.settings.base_url.clone(),
            })
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a str, system: &'a str, stream: bool) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.settings.model,
            prompt,
            system,
            stream,
            temperature: self.settings.temperature,
            num_ctx: self.settings.num_ctx,
        }
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.settings.base_url.trim_end_matches('/'))
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/api/generate",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}
