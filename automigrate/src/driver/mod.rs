//! Driver layer: the prompt-answering policy for a migration run.

mod migrate;
mod report;

pub use migrate::{DriverConfig, MigrationDriver};
pub use report::MigrationReport;
