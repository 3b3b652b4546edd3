//! Client for a local Ollama-compatible model service
//!
//! Covers the two endpoints the tool needs: `/api/tags` for availability
//! and installed models, and `/api/generate` for completions, either as one
//! response or as a lazy stream of text fragments decoded from NDJSON.

pub mod client;
pub mod error;
pub mod prompt;
pub mod stream;

pub use client::{OllamaClient, OllamaSettings};
pub use error::OllamaError;
pub use stream::ResponseStream;
