//! CLI error type.

use landmask::config::ConfigError;
use landmask::driver::WorkflowError;
use landmask::platform::PlatformError;
use thiserror::Error;

/// Errors surfaced to the user; any of them ends the process non-zero.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error("failed to bind inputs: {0}")]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("{rejected} of {total} export submissions were rejected")]
    Rejected { rejected: usize, total: usize },
}
