//! # Triage
//!
//! A CLI wrapper that runs commands, captures their error output live, and
//! turns failures into actionable fixes using a local Ollama model with a
//! rule-based fallback.
//!
//! ## Usage
//!
//! ```bash
//! triage run 'npm install missing-package'
//! triage explain 'bash: htop: command not found'
//! triage models
//! ```
//!
//! ## Modules
//!
//! - `capture` - Shell execution with chunked live stderr capture
//! - `ollama` - Client for a local Ollama-compatible model service
//! - `knowledge` - Built-in knowledge base of common failures
//! - `analyzer` - Rule-based analysis over the knowledge base
//! - `advisor` - Model-first analysis chain with rule and generic fallbacks
//! - `config` - Layered configuration (defaults, file, environment)
//! - `display` - Terminal presentation of runs and advice
pub mod advisor;
pub mod analyzer;
pub mod capture;
pub mod config;
pub mod display;
pub mod knowledge;
pub mod ollama;
