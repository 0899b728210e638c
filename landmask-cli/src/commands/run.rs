//! Run command - bind inputs and submit every export job.

use std::path::PathBuf;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use landmask::catalog::Year;
use landmask::display::{present, LoggingDisplay};
use landmask::driver::{BoundInputs, ExportDriver, SubmissionReport};
use landmask::platform::{ExportSubmitter, RecordingSubmitter};

use super::common::{bind_inputs, platform, resolve_inputs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
pub struct RunArgs {
    pub polygons_file: Option<PathBuf>,
    pub years: Option<Vec<Year>>,
    pub dry_run: bool,
    pub show_layers: bool,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("run");
    let config = runner.config();

    let spec = resolve_inputs(config, args.polygons_file.as_ref(), args.years);
    let platform = platform(config)?;
    let params = config.export_params();

    println!("Landmask Export v{}", landmask::VERSION);
    println!("=====================");
    println!();
    println!("Polygons: {}", spec.polygons);
    println!("Classes:  {:?}", spec.classes);
    println!("Years:    {:?}", spec.years);
    println!("Folder:   {}", params.folder);
    if args.dry_run {
        println!("Mode:     {}", style("dry run, nothing is submitted").yellow());
    }
    println!();

    let report = runner.block_on(async {
        let inputs = bind_inputs(&platform, &spec, args.polygons_file.is_some()).await?;

        let report = if args.dry_run {
            let driver = ExportDriver::new(RecordingSubmitter::new(), params);
            fan_out(&driver, &inputs, args.show_layers).await
        } else {
            let driver = ExportDriver::new(platform, params);
            fan_out(&driver, &inputs, args.show_layers).await
        };
        Ok::<_, CliError>(report)
    })?;

    print_summary(&report);

    if report.is_complete_success() {
        Ok(())
    } else {
        Err(CliError::Rejected {
            rejected: report.rejected(),
            total: report.outcomes.len(),
        })
    }
}

/// Present, plan and submit with a progress bar.
async fn fan_out<S: ExportSubmitter>(
    driver: &ExportDriver<S>,
    inputs: &BoundInputs,
    show_layers: bool,
) -> SubmissionReport {
    if show_layers {
        let mut display = LoggingDisplay;
        present(&mut display, &inputs.aois, &inputs.mask);
    }

    let jobs = driver.plan(inputs);
    let progress = submission_progress(jobs.len() as u64);

    let report = driver
        .submit_each(&jobs, |outcome| {
            progress.set_message(outcome.name.clone());
            progress.inc(1);
        })
        .await;

    progress.finish_and_clear();
    report
}

fn submission_progress(total: u64) -> ProgressBar {
    let progress = ProgressBar::new(total);
    if let Ok(bar_style) =
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {wide_msg}")
    {
        progress.set_style(bar_style.progress_chars("=> "));
    }
    progress
}

fn print_summary(report: &SubmissionReport) {
    for handle in report.handles() {
        println!("  {} {}", style("✓").green(), handle);
    }
    for (name, error) in report.failures() {
        println!("  {} {}: {}", style("✗").red(), name, error);
    }

    println!();
    println!(
        "{} submitted, {} rejected",
        style(report.submitted()).green().bold(),
        style(report.rejected()).red().bold()
    );
}

