//! # Automigrate
//!
//! Drives PayloadCMS's interactive `migrate:create` command to completion.
//!
//! The migration generator stops and asks for confirmation whenever a table
//! or column could be either newly created or renamed. Automigrate spawns
//! the command, mirrors its output, and answers every such prompt with the
//! default option, so schema migrations can be generated unattended (CI,
//! deploy hooks) while a human still sees the full transcript.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use automigrate::{MigrationDriver, SpawnConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), automigrate::Error> {
//!     let spawn = SpawnConfig::new("pnpm")
//!         .args(["payload", "migrate:create", "add-users"])
//!         .current_dir("/srv/backend")
//!         .env("NODE_ENV", "production")
//!         .env("PAYLOAD_SECRET", "ignore");
//!
//!     let driver = MigrationDriver::with_defaults()?;
//!     let report = driver.run(&spawn).await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! The prompt policy in [`MigrationDriver`] is written against the narrow
//! [`Session`] trait, so it can be tested with a scripted session instead
//! of a real child process.

pub mod driver;
pub mod error;
pub mod session;

// Re-export main types for convenience
pub use driver::{DriverConfig, MigrationDriver, MigrationReport};
pub use error::{DriverError, Error, Result, SessionError};
pub use session::{ProcessSession, PromptSet, Session, SpawnConfig, Wait};
