//! Shared setup for commands that talk to the platform.

use std::future::Future;

use landmask::config::ConfigFile;
use landmask::logging::{init_logging, LoggingGuard};
use tokio::runtime::Runtime;
use tracing::info;

use crate::error::CliError;

/// Loaded configuration, installed logging and an async runtime.
pub struct CliRunner {
    config: ConfigFile,
    runtime: Runtime,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load the config file, start logging and build the runtime.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let logging = init_logging(&config.logging)?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(CliError::Runtime)?;

        Ok(Self {
            config,
            runtime,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log the command and version at startup.
    pub fn log_startup(&self, command: &str) {
        info!(
            command,
            version = landmask::VERSION,
            project = %self.config.platform.project,
            "landmask starting"
        );
    }

    /// Drive a future to completion on the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
