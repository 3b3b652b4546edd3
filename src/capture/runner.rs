//! Shell command execution with live stderr capture

use super::buffer::DEFAULT_MIN_CHUNK_SIZE;
use super::drain::{ChunkSink, StreamDrain};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// Settings controlling how a run is captured.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Minimum bytes of stderr to accumulate before delivering a chunk.
    pub min_chunk_size: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
        }
    }
}

/// Everything known about a finished run.
///
/// Built only after the stderr drain has joined and the child has been
/// reaped, and never modified afterwards.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Child exit code; `128 + signal` when killed by a signal, `-1` when
    /// the shell could not be launched at all.
    pub exit_code: i32,
    /// Complete standard output.
    pub stdout: String,
    /// Complete standard error. For a drained child this is identical to the
    /// concatenation of every chunk delivered to the sink; for a child that
    /// never started it carries the launch failure description.
    pub stderr: String,
    /// Whether the child exited with status zero.
    pub success: bool,
    /// Description of a launch failure, when the child never started.
    pub failure: Option<String>,
}

impl RunOutcome {
    /// Outcome for a child that never started. The reason doubles as the
    /// stderr text so callers that only look at output still see it.
    pub fn not_started(reason: String) -> Self {
        Self {
            exit_code: -1,
            stdout: String::new(),
            stderr: reason.clone(),
            success: false,
            failure: Some(reason),
        }
    }
}

/// Runs a command line through the platform shell, draining stderr into
/// chunks while stdout is read to completion.
///
/// The command line is handed to the shell verbatim, so pipes, redirections
/// and the rest of its syntax behave exactly as they would interactively.
pub struct ShellRunner {
    settings: CaptureSettings,
}

impl ShellRunner {
    /// Create a runner with the given capture settings.
    pub fn new(settings: CaptureSettings) -> Self {
        Self { settings }
    }

    /// Run `command_line` to completion, delivering stderr chunks to `sink`
    /// as they fill.
    ///
    /// Launch failures are reported through the returned outcome, never
    /// raised; the sink is not invoked when the child never started.
    pub async fn run(&self, command_line: &str, sink: Arc<dyn ChunkSink>) -> RunOutcome {
        let start = Instant::now();
        tracing::debug!("Running shell command: {}", command_line);

        let mut child = match shell_command(command_line).spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("Failed to launch shell for '{}': {}", command_line, e);
                return RunOutcome::not_started(format!("failed to launch shell: {e}"));
            }
        };

        let stderr = match child.stderr.take() {
            Some(stderr) => stderr,
            None => return RunOutcome::not_started("stderr pipe unavailable".to_string()),
        };
        let mut stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => return RunOutcome::not_started("stdout pipe unavailable".to_string()),
        };

        // Drain stderr concurrently so the pipe never fills while stdout is
        // being read; both must finish before the child is reaped.
        let drain = StreamDrain::new(self.settings.min_chunk_size, sink);
        let stderr_task = tokio::spawn(async move { drain.drain(stderr).await });

        let mut stdout_bytes = Vec::new();
        if let Err(e) = stdout.read_to_end(&mut stdout_bytes).await {
            tracing::warn!("Reading stdout failed: {}", e);
        }

        let stderr_text = match stderr_task.await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Stderr drain task failed: {}", e);
                String::new()
            }
        };

        let stdout_text = String::from_utf8_lossy(&stdout_bytes).to_string();

        let status = match child.wait().await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Waiting for child failed: {}", e);
                return RunOutcome {
                    exit_code: -1,
                    stdout: stdout_text,
                    stderr: stderr_text,
                    success: false,
                    failure: Some(format!("failed to wait for child: {e}")),
                };
            }
        };

        let exit_code = convert_exit_code(status);
        if status.success() {
            tracing::debug!(
                "Shell command completed in {:?}: {}",
                start.elapsed(),
                command_line
            );
        } else {
            tracing::debug!(
                "Shell command failed with exit code {} in {:?}: {}",
                exit_code,
                start.elapsed(),
                command_line
            );
            if !stderr_text.is_empty() {
                tracing::trace!("Stderr: {}", stderr_text);
            }
        }

        RunOutcome {
            exit_code,
            stdout: stdout_text,
            stderr: stderr_text,
            success: status.success(),
            failure: None,
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new(CaptureSettings::default())
    }
}

/// Build the platform shell invocation with piped output streams.
///
/// Stdin is inherited so commands that prompt still work under the wrapper.
fn shell_command(command_line: &str) -> Command {
    #[cfg(unix)]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command_line);
        cmd
    };

    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command_line);
        cmd
    };

    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd
}

/// Convert an exit status to a single code, folding signals in on Unix.
fn convert_exit_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        code
    } else {
        signal_exit_code(status)
    }
}

#[cfg(unix)]
fn signal_exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => 128 + signal,
        None => -1,
    }
}

#[cfg(not(unix))]
fn signal_exit_code(_status: std::process::ExitStatus) -> i32 {
    -1
}
