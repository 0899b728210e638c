//! Status command - query the state of a submitted export.

use console::style;
use landmask::platform::{JobHandle, JobState, DRY_RUN_OPERATION_PREFIX};

use super::common::platform;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the status command.
pub fn run(operation: &str) -> Result<(), CliError> {
    if operation.starts_with(DRY_RUN_OPERATION_PREFIX) {
        return Err(CliError::Config(format!(
            "'{}' comes from a dry run and was never submitted",
            operation
        )));
    }

    let runner = CliRunner::new()?;
    runner.log_startup("status");

    let platform = platform(runner.config())?;
    let handle = JobHandle::new(operation, operation);
    let state = runner.block_on(platform.operation_status(&handle))?;

    let label = match &state {
        JobState::Succeeded => style(state.to_string()).green(),
        JobState::Failed(_) | JobState::Cancelled => style(state.to_string()).red(),
        _ => style(state.to_string()).yellow(),
    };
    println!("{}: {}", operation, label);
    Ok(())
}
