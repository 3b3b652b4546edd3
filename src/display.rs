//! Terminal presentation of runs and advice

use crate::advisor::Advice;
use crate::capture::{ChunkSink, RunOutcome};
use anyhow::Result;
use async_trait::async_trait;
use std::io::Write;

/// Sink that passes chunks straight to the terminal as they arrive.
pub struct PrintSink {
    to_stderr: bool,
}

impl PrintSink {
    /// Print chunks to stdout, for model response fragments.
    pub fn stdout() -> Self {
        Self { to_stderr: false }
    }

    /// Print chunks to stderr, for passed-through child error output.
    pub fn stderr() -> Self {
        Self { to_stderr: true }
    }
}

#[async_trait]
impl ChunkSink for PrintSink {
    async fn on_chunk(&self, chunk: &str) -> Result<()> {
        if self.to_stderr {
            eprint!("{chunk}");
            std::io::stderr().flush()?;
        } else {
            print!("{chunk}");
            std::io::stdout().flush()?;
        }
        Ok(())
    }

    async fn on_complete(&self, _full_text: &str) -> Result<()> {
        Ok(())
    }
}

/// Announce the command about to run.
pub fn announce_run(command_line: &str) {
    println!("🔧 Running: {command_line}\n");
}

/// Banner printed before analysis of a failed run starts.
pub fn announce_analysis() {
    println!("\n{}", "=".repeat(70));
    println!("Analyzing failure...");
    println!("{}\n", "=".repeat(70));
}

/// Banner and instructions for interactive paste mode.
pub fn print_paste_banner() {
    println!("{}", "=".repeat(60));
    println!("triage - Error Helper");
    println!("{}", "=".repeat(60));
    println!("\nPaste your error message (press Enter twice to submit):\n");
}

/// Pass through the captured stdout of a finished child.
pub fn print_child_stdout(outcome: &RunOutcome) {
    if !outcome.stdout.is_empty() {
        print!("{}", outcome.stdout);
        let _ = std::io::stdout().flush();
    }
}

/// Render advice.
///
/// `streamed_live` suppresses the suggestion list when its text was already
/// printed fragment by fragment while streaming.
pub fn print_advice(advice: &Advice, streamed_live: bool) {
    println!("\n✓ Method: {}", advice.method);
    if let Some(error_type) = &advice.error_type {
        println!("✓ Error Type: {error_type}");
    }

    if !streamed_live {
        println!("\n💡 Suggested Fixes:");
        for (i, suggestion) in advice.suggestions.iter().enumerate() {
            println!("  {}. {}", i + 1, suggestion);
        }
    }

    if !advice.examples.is_empty() {
        println!("\n📝 Examples:");
        for (i, example) in advice.examples.iter().enumerate() {
            println!("  {}. {}", i + 1, example);
        }
    }

    println!();
}

/// Notice shown when the model service is down but analysis still works.
///
/// `model` is the configured model name, used in the pull tip.
pub fn print_service_notice(model: &str) {
    println!("⚠️  Ollama is not running. Using rule-based analysis only.");
    println!("   Tip: Start Ollama with: ollama serve");
    println!("   Or pull a model with: ollama pull {model}\n");
}

/// List the models installed on the service.
pub fn print_models(models: &[String], configured: &str) {
    if models.is_empty() {
        println!("No models installed.");
        println!("   Tip: Pull one with: ollama pull {configured}");
    } else {
        println!("Installed models:");
        for model in models {
            println!("  - {model}");
        }
    }
}
