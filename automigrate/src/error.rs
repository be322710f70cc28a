//! Error types for automigrate.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for automigrate operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Session-level errors (spawning and talking to the child process)
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Driver-level errors (prompt loop policy)
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
}

/// Session layer errors (child process, streams, pattern matching).
#[derive(Error, Debug)]
pub enum SessionError {
    /// The external command could not be started
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// One of the child's pipes was not available after spawn
    #[error("Child {stream} pipe is not available")]
    PipeUnavailable { stream: &'static str },

    /// I/O error on one of the child's streams
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The child did not exit within the final grace period
    #[error("Child did not exit within {0:?}")]
    ExitTimeout(Duration),

    /// Invalid prompt pattern
    #[error("Invalid prompt pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Driver layer errors (migration prompt loop).
#[derive(Error, Debug)]
pub enum DriverError {
    /// More interactive prompts were seen than the safety ceiling allows
    #[error("Prompt limit exceeded after {limit} answered prompts")]
    PromptStorm { limit: u32 },
}

/// Result type alias using automigrate's Error.
pub type Result<T> = std::result::Result<T, Error>;
