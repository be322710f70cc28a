//! Unattended `migrate:create` for the PayloadCMS backend.
//!
//! No arguments: run it from the backend checkout and it generates the
//! migration, answering every table/column confirmation prompt with the
//! default option. Exits 0 when the tool exits 0, and 1 for everything
//! else.

use std::process::ExitCode;

use log::{error, info};

use automigrate::{MigrationDriver, MigrationReport, Result, SpawnConfig};

/// Name of the migration to create.
const MIGRATION_NAME: &str = "add-bylaws-service-standards";

#[tokio::main]
async fn main() -> ExitCode {
    // Logs share stdout with the mirrored child output so the operator
    // reads one interleaved transcript.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    match run().await {
        Ok(report) if report.is_success() => {
            info!("Migration created successfully ({report})");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            error!("Migration failed ({report})");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("Migration run aborted: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<MigrationReport> {
    let backend_dir = std::env::current_dir().map_err(automigrate::SessionError::Io)?;

    let spawn = SpawnConfig::new("pnpm")
        .args(["payload", "migrate:create", MIGRATION_NAME])
        .current_dir(&backend_dir)
        .env("NODE_ENV", "production")
        .env("PAYLOAD_SECRET", "ignore");

    info!("Running: {}", spawn.command_line());
    info!("Environment: NODE_ENV=production PAYLOAD_SECRET=ignore");

    let driver = MigrationDriver::with_defaults()?;
    driver.run(&spawn).await
}
