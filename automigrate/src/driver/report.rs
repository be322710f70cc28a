//! Report type for a completed migration run.

use std::process::ExitStatus;
use std::time::Duration;

/// Outcome of driving one migration command to completion.
///
/// A report exists only for runs where the interaction itself worked; a
/// broken interaction (spawn failure, prompt storm, hung child) surfaces as
/// an error instead. The child's exit status decides success.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    /// Number of interactive prompts answered with the default option.
    pub prompts_answered: u32,

    /// Exit status reported by the migration tool.
    pub status: ExitStatus,

    /// Time from spawn to reaped exit status.
    pub elapsed: Duration,
}

impl MigrationReport {
    /// Check if the run succeeded (exit status exactly zero).
    pub fn is_success(&self) -> bool {
        self.status.success()
    }

    /// The child's exit code, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }
}

impl std::fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} prompts answered, ", self.prompts_answered)?;
        match self.exit_code() {
            Some(code) => write!(f, "exit code {code}")?,
            None => write!(f, "killed by signal")?,
        }
        write!(f, ", {:.1?} elapsed", self.elapsed)
    }
}
