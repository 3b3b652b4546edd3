//! Layered configuration: built-in defaults, config file, environment
//!
//! Precedence, lowest to highest: defaults, the first config file found
//! (`triage.toml` in the working directory, then the user config dir),
//! environment variables, command-line flags. An explicitly given file must
//! exist and parse; default locations are simply skipped when absent.

use crate::capture::DEFAULT_MIN_CHUNK_SIZE;
use crate::ollama::OllamaSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_min_chunk_size() -> usize {
    DEFAULT_MIN_CHUNK_SIZE
}

fn default_true() -> bool {
    true
}

/// Settings for stderr capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Minimum bytes of stderr to accumulate before delivering a chunk.
    #[serde(default = "default_min_chunk_size")]
    pub min_chunk_size: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            min_chunk_size: default_min_chunk_size(),
        }
    }
}

/// Feature switches for the analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSettings {
    /// Ask the local model service before anything else.
    #[serde(default = "default_true")]
    pub use_llm: bool,

    /// Fall back to the rule table when the model is unavailable.
    #[serde(default = "default_true")]
    pub fallback_enabled: bool,

    /// Stream model responses fragment by fragment instead of waiting.
    #[serde(default = "default_true")]
    pub stream_responses: bool,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            use_llm: true,
            fallback_enabled: true,
            stream_responses: true,
        }
    }
}

/// Complete tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub stream: StreamSettings,

    #[serde(default)]
    pub ollama: OllamaSettings,

    #[serde(default)]
    pub features: FeatureSettings,
}

impl TriageConfig {
    /// Load configuration, optionally from an explicitly given file.
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path).await?,
            None => Self::from_default_locations().await?,
        };
        config.merge_env_vars();
        Ok(config)
    }

    async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    async fn from_default_locations() -> Result<Self> {
        for path in Self::default_paths() {
            if path.exists() {
                return Self::from_file(&path).await;
            }
        }
        Ok(Self::default())
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("triage.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("triage").join("config.toml"));
        }
        paths
    }

    /// Apply environment variable overrides on top of file values.
    pub fn merge_env_vars(&mut self) {
        if let Ok(url) = std::env::var("TRIAGE_OLLAMA_URL") {
            self.ollama.base_url = url;
        }

        if let Ok(model) = std::env::var("TRIAGE_MODEL") {
            self.ollama.model = model;
        }
    }
}
