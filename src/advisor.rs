//! Error analysis with model-first, rules-second fallback
//!
//! The advisor asks the local model service for a fix when enabled, falls
//! back to the rule table when the service fails or gives nothing, and
//! hands out generic suggestions as the last resort. Every path produces
//! advice; a failed analysis is never an empty one.

use crate::analyzer::{self, GENERIC_SUGGESTIONS};
use crate::capture::ChunkSink;
use crate::config::TriageConfig;
use crate::ollama::{prompt, OllamaClient};
use futures_util::StreamExt;
use std::fmt;
use std::sync::Arc;

/// How a piece of advice was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdviceMethod {
    Llm,
    RuleBased,
    Generic,
}

impl fmt::Display for AdviceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdviceMethod::Llm => write!(f, "LLM"),
            AdviceMethod::RuleBased => write!(f, "Rule-Based"),
            AdviceMethod::Generic => write!(f, "Generic"),
        }
    }
}

/// Advice for one error, with at least one suggestion always present.
#[derive(Debug)]
pub struct Advice {
    pub method: AdviceMethod,
    /// Matched category name, for rule-based advice.
    pub error_type: Option<String>,
    pub suggestions: Vec<String>,
    pub examples: Vec<String>,
}

impl Advice {
    fn generic() -> Self {
        Self {
            method: AdviceMethod::Generic,
            error_type: None,
            suggestions: GENERIC_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            examples: Vec::new(),
        }
    }
}

/// Produces advice for captured error output.
pub struct Advisor {
    client: Option<OllamaClient>,
    fallback_enabled: bool,
    stream_responses: bool,
}

impl Advisor {
    /// Build an advisor from the effective configuration.
    pub fn new(config: &TriageConfig) -> Self {
        let client = config
            .features
            .use_llm
            .then(|| OllamaClient::new(config.ollama.clone()));
        Self {
            client,
            fallback_enabled: config.features.fallback_enabled,
            stream_responses: config.features.stream_responses,
        }
    }

    /// Analyze `error_text`, forwarding streamed model fragments to `sink`.
    ///
    /// The sink only sees fragments when response streaming is enabled and
    /// the model answers; fallback paths produce their advice all at once.
    pub async fn advise(
        &self,
        error_text: &str,
        command_context: &str,
        sink: Arc<dyn ChunkSink>,
    ) -> Advice {
        if let Some(client) = &self.client {
            if let Some(suggestion) = self
                .llm_suggestion(client, error_text, command_context, &sink)
                .await
            {
                return Advice {
                    method: AdviceMethod::Llm,
                    error_type: None,
                    suggestions: vec![suggestion],
                    examples: Vec::new(),
                };
            }
        }

        self.fallback(error_text)
    }

    async fn llm_suggestion(
        &self,
        client: &OllamaClient,
        error_text: &str,
        context: &str,
        sink: &Arc<dyn ChunkSink>,
    ) -> Option<String> {
        let user_prompt = prompt::build_prompt(error_text, context);

        let suggestion = if self.stream_responses {
            let mut stream = match client.generate_stream(&user_prompt, prompt::SYSTEM_PROMPT).await
            {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::debug!("LLM analysis failed, falling back: {}", e);
                    return None;
                }
            };

            let mut suggestion = String::new();
            while let Some(fragment) = stream.next().await {
                if let Err(e) = sink.on_chunk(&fragment).await {
                    tracing::warn!("Chunk sink failed to handle fragment: {}", e);
                }
                suggestion.push_str(&fragment);
            }
            if let Err(e) = sink.on_complete(&suggestion).await {
                tracing::warn!("Chunk sink failed on completion: {}", e);
            }
            suggestion
        } else {
            match client.generate(&user_prompt, prompt::SYSTEM_PROMPT).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!("LLM analysis failed, falling back: {}", e);
                    return None;
                }
            }
        };

        let suggestion = suggestion.trim().to_string();
        if suggestion.is_empty() {
            None
        } else {
            Some(suggestion)
        }
    }

    fn fallback(&self, error_text: &str) -> Advice {
        if self.fallback_enabled {
            let analysis = analyzer::analyze(error_text);
            if analysis.matched() {
                return Advice {
                    method: AdviceMethod::RuleBased,
                    error_type: analysis.error_type.map(String::from),
                    suggestions: analysis.suggestions,
                    examples: analysis.examples,
                };
            }
        }

        Advice::generic()
    }
}
