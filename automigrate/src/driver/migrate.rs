//! The migration prompt loop.
//!
//! PayloadCMS's `migrate:create` asks for confirmation whenever a table or
//! column in the new schema could be either a creation or a rename. The
//! driver answers every such prompt with the default option (create) until
//! the tool finishes, with a ceiling on answers so an unanticipated prompt
//! can never loop forever.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use super::report::MigrationReport;
use crate::error::{DriverError, Result, SessionError};
use crate::session::{ProcessSession, PromptSet, Session, SpawnConfig, Wait};

/// Table-level conflict prompt.
const TABLE_PROMPT: &str = "table .*created or renamed";

/// Column-level conflict prompt.
const COLUMN_PROMPT: &str = "column .*created or renamed";

/// Printed by the tool once between the table phase and the column phase.
const TRANSITION_MARKER: &str = "--- all table conflicts resolved ---";

/// Indices into the compiled prompt set, in compile order.
const IDX_TABLE: usize = 0;
const IDX_COLUMN: usize = 1;

/// Timing and safety knobs for the prompt loop.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Timeout for the first wait. Generous, because the tool compiles the
    /// schema before it prints anything.
    pub first_prompt_timeout: Duration,

    /// Timeout for every later wait; once warmed up, prompts arrive fast.
    pub prompt_timeout: Duration,

    /// Final wait for end-of-stream and for the process to exit.
    pub drain_timeout: Duration,

    /// Ceiling on answered prompts. A heuristic for "more than any real
    /// migration needs", guarding against an interactive loop we did not
    /// anticipate.
    pub max_prompts: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            first_prompt_timeout: Duration::from_secs(30),
            prompt_timeout: Duration::from_secs(10),
            drain_timeout: Duration::from_secs(10),
            max_prompts: 50,
        }
    }
}

/// Drives one interactive migration command to completion.
///
/// The loop policy lives in [`drive`](Self::drive), which is generic over
/// [`Session`] so it can be exercised against a scripted session in tests;
/// [`run`](Self::run) binds it to a real [`ProcessSession`].
pub struct MigrationDriver {
    config: DriverConfig,
    prompts: PromptSet,
}

impl MigrationDriver {
    /// Create a driver with the given configuration.
    pub fn new(config: DriverConfig) -> Result<Self> {
        let prompts = PromptSet::compile(&[TABLE_PROMPT, COLUMN_PROMPT, TRANSITION_MARKER])
            .map_err(SessionError::from)?;
        Ok(Self { config, prompts })
    }

    /// Create a driver with default timeouts and ceiling.
    pub fn with_defaults() -> Result<Self> {
        Self::new(DriverConfig::default())
    }

    /// Spawn the configured command and drive it to completion.
    pub async fn run(&self, spawn: &SpawnConfig) -> Result<MigrationReport> {
        let mut session = ProcessSession::spawn(spawn)?;
        self.drive(&mut session).await
    }

    /// Drive an open session until the tool exits, answering every
    /// table/column prompt with the default option.
    pub async fn drive<S: Session>(&self, session: &mut S) -> Result<MigrationReport> {
        let start = Instant::now();
        let mut answered = 0u32;
        let mut first_wait = true;

        loop {
            let timeout = if first_wait {
                self.config.first_prompt_timeout
            } else {
                self.config.prompt_timeout
            };
            first_wait = false;

            match session.expect(&self.prompts, timeout).await? {
                Wait::Matched { index, text } if index == IDX_TABLE || index == IDX_COLUMN => {
                    if answered >= self.config.max_prompts {
                        warn!(
                            "Prompt ceiling of {} reached, giving up on {:?}",
                            self.config.max_prompts,
                            text.trim()
                        );
                        if let Err(err) = session.terminate().await {
                            warn!("Failed to kill child after prompt storm: {err}");
                        }
                        return Err(DriverError::PromptStorm {
                            limit: self.config.max_prompts,
                        }
                        .into());
                    }
                    answered += 1;
                    info!(
                        "Prompt #{answered} ({:?}): selecting the default option",
                        text.trim()
                    );
                    session.send_line("").await?;
                }
                Wait::Matched { .. } => {
                    info!("Table conflicts resolved, watching for column prompts");
                }
                Wait::Eof => break,
                Wait::TimedOut => {
                    info!("No more prompts detected");
                    break;
                }
            }
        }

        // Flush whatever the tool prints on its way out.
        if let Wait::TimedOut = session
            .expect(&PromptSet::empty(), self.config.drain_timeout)
            .await?
        {
            debug!("Output stream still open, relying on the exit grace period");
        }

        let status = session.close(self.config.drain_timeout).await?;
        Ok(MigrationReport {
            prompts_answered: answered,
            status,
            elapsed: start.elapsed(),
        })
    }
}
