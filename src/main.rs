use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, trace};

use triage::advisor::{AdviceMethod, Advisor};
use triage::capture::{CaptureSettings, ShellRunner};
use triage::config::TriageConfig;
use triage::display::{self, PrintSink};
use triage::ollama::OllamaClient;

/// Run commands with live error capture and instant fixes
#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Run a command, capture its errors live, and get fixes", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a shell command, analyzing its errors if it fails
    Run {
        /// Command line to hand to the shell
        #[arg(required = true, trailing_var_arg = true)]
        command: Vec<String>,

        /// Skip the model and use rule-based analysis only
        #[arg(long)]
        no_llm: bool,

        /// Wait for complete model responses instead of streaming
        #[arg(long)]
        no_stream: bool,
    },
    /// Analyze an error message without running anything
    Explain {
        /// Error text (leave empty to paste interactively)
        text: Vec<String>,

        /// Skip the model and use rule-based analysis only
        #[arg(long)]
        no_llm: bool,

        /// Wait for complete model responses instead of streaming
        #[arg(long)]
        no_stream: bool,
    },
    /// List models installed on the local Ollama service
    Models,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        2 => "trace",
        _ => "trace,hyper=debug,tower=debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .with_thread_ids(cli.verbose >= 3)
        .with_line_number(cli.verbose >= 3)
        .init();

    debug!("triage started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match cli.command {
        Some(Commands::Run {
            command,
            no_llm,
            no_stream,
        }) => run_command(command, no_llm, no_stream, cli.config).await,
        Some(Commands::Explain {
            text,
            no_llm,
            no_stream,
        }) => explain_error(text, no_llm, no_stream, cli.config).await,
        Some(Commands::Models) => list_models(cli.config).await,
        None => Cli::command()
            .print_help()
            .map(|_| 0)
            .map_err(anyhow::Error::from),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {}", e);
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn load_config(
    path: Option<PathBuf>,
    no_llm: bool,
    no_stream: bool,
) -> anyhow::Result<TriageConfig> {
    let mut config = TriageConfig::load(path.as_deref()).await?;
    if no_llm {
        config.features.use_llm = false;
    }
    if no_stream {
        config.features.stream_responses = false;
    }
    Ok(config)
}

/// Warn once up front when the model was requested but is not answering.
async fn check_service(config: &TriageConfig) {
    if config.features.use_llm {
        let client = OllamaClient::new(config.ollama.clone());
        if !client.is_available().await {
            display::print_service_notice(client.model());
        }
    }
}

async fn run_command(
    parts: Vec<String>,
    no_llm: bool,
    no_stream: bool,
    config_path: Option<PathBuf>,
) -> anyhow::Result<i32> {
    let config = load_config(config_path, no_llm, no_stream).await?;
    let command_line = parts.join(" ");

    check_service(&config).await;
    display::announce_run(&command_line);

    let runner = ShellRunner::new(CaptureSettings {
        min_chunk_size: config.stream.min_chunk_size,
    });
    let outcome = runner
        .run(&command_line, Arc::new(PrintSink::stderr()))
        .await;

    display::print_child_stdout(&outcome);

    if let Some(failure) = &outcome.failure {
        eprintln!("Error: {failure}");
        return Ok(outcome.exit_code);
    }

    if !outcome.success && !outcome.stderr.trim().is_empty() {
        display::announce_analysis();

        let advisor = Advisor::new(&config);
        let advice = advisor
            .advise(&outcome.stderr, &command_line, Arc::new(PrintSink::stdout()))
            .await;

        let streamed_live =
            config.features.stream_responses && advice.method == AdviceMethod::Llm;
        display::print_advice(&advice, streamed_live);
    }

    Ok(outcome.exit_code)
}

async fn explain_error(
    text: Vec<String>,
    no_llm: bool,
    no_stream: bool,
    config_path: Option<PathBuf>,
) -> anyhow::Result<i32> {
    let config = load_config(config_path, no_llm, no_stream).await?;

    let error_message = if text.is_empty() {
        read_pasted_error()?
    } else {
        text.join(" ")
    };
    let error_message = error_message.trim().to_string();

    if error_message.is_empty() {
        println!("No error message provided.");
        return Ok(0);
    }

    check_service(&config).await;

    let advisor = Advisor::new(&config);
    let advice = advisor
        .advise(&error_message, "", Arc::new(PrintSink::stdout()))
        .await;

    let streamed_live = config.features.stream_responses && advice.method == AdviceMethod::Llm;
    display::print_advice(&advice, streamed_live);

    Ok(0)
}

/// Read a pasted error from stdin; two consecutive empty lines submit.
fn read_pasted_error() -> anyhow::Result<String> {
    display::print_paste_banner();

    let stdin = std::io::stdin();
    let mut lines: Vec<String> = Vec::new();
    let mut empty_lines = 0;

    loop {
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            empty_lines += 1;
            if empty_lines >= 2 {
                break;
            }
            lines.push(line.to_string());
        } else {
            empty_lines = 0;
            lines.push(line.to_string());
        }
    }

    Ok(lines.join("\n"))
}

async fn list_models(config_path: Option<PathBuf>) -> anyhow::Result<i32> {
    let config = TriageConfig::load(config_path.as_deref()).await?;
    let client = OllamaClient::new(config.ollama.clone());

    match client.list_models().await {
        Ok(models) => {
            display::print_models(&models, client.model());
            Ok(0)
        }
        Err(e) => {
            debug!("Listing models failed: {}", e);
            display::print_service_notice(client.model());
            Ok(1)
        }
    }
}
