//! Session layer: the child process and pattern-based waits.
//!
//! This module owns the interactive side of a run: spawning the external
//! command, merging its output streams, and exposing the narrow wait/send
//! surface the driver loop is written against.

mod buffer;
mod config;
mod patterns;
mod process;

pub use buffer::{DEFAULT_SEARCH_DEPTH, OutputBuffer};
pub use config::SpawnConfig;
pub use patterns::{PromptMatch, PromptSet};
pub use process::ProcessSession;

use std::future::Future;
use std::process::ExitStatus;
use std::time::Duration;

use crate::error::Result;

/// Result of a single wait on the child's combined output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wait {
    /// A pattern matched. Carries its index in the [`PromptSet`] and the
    /// matched text.
    Matched {
        index: usize,
        text: String,
    },

    /// The child closed its output streams.
    Eof,

    /// No pattern matched and no end-of-stream within the timeout.
    TimedOut,
}

/// An interactive session with a running child process.
///
/// The driver loop is generic over this trait so its policy can be tested
/// against a scripted session with no process behind it.
pub trait Session: Send {
    /// Wait until one of `prompts` matches the combined output, the stream
    /// ends, or `timeout` elapses.
    ///
    /// Matched output is consumed: a prompt is reported once. An empty set
    /// turns this into a pure wait for end-of-stream.
    fn expect(
        &mut self,
        prompts: &PromptSet,
        timeout: Duration,
    ) -> impl Future<Output = Result<Wait>> + Send;

    /// Write `line` plus a newline to the child's stdin.
    fn send_line(&mut self, line: &str) -> impl Future<Output = Result<()>> + Send;

    /// Close stdin and wait up to `timeout` for the child to exit.
    ///
    /// On expiry the child is killed and an exit-timeout error is returned.
    fn close(&mut self, timeout: Duration) -> impl Future<Output = Result<ExitStatus>> + Send;

    /// Kill the child immediately and reap it.
    fn terminate(&mut self) -> impl Future<Output = Result<()>> + Send;
}
