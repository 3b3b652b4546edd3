//! Live capture of child process output
//!
//! Runs a command line through the shell, drains stderr line by line into
//! threshold-sized chunks delivered while the child is still running, and
//! reads stdout to completion. Everything ends up in an immutable
//! [`RunOutcome`] built only after both streams are finished and the child
//! is reaped.

pub mod buffer;
pub mod drain;
pub mod runner;

pub use buffer::{ChunkBuffer, DEFAULT_MIN_CHUNK_SIZE};
pub use drain::{ChannelSink, ChunkSink, CollectSink, NullSink, StreamDrain};
pub use runner::{CaptureSettings, RunOutcome, ShellRunner};
