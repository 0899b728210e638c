//! Landmask CLI - Command-line interface
//!
//! Binds the configured polygon collection, masks each yearly image by
//! land-cover class and submits one export job per polygon and year.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use console::style;

use commands::config::ConfigCommands;

#[derive(Debug, Parser)]
#[command(name = "landmask", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write the default configuration file if none exists
    Init,

    /// Bind inputs and submit every export job
    Run {
        #[command(flatten)]
        inputs: InputArgs,

        /// Record jobs locally instead of submitting them
        #[arg(long)]
        dry_run: bool,

        /// Log the map layers before submitting
        #[arg(long)]
        show_layers: bool,
    },

    /// Print the export jobs as JSON without submitting
    Plan {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Query the state of a submitted export
    Status {
        /// Operation name returned at submission
        operation: String,
    },

    /// View or change configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Input overrides shared by `run` and `plan`.
#[derive(Debug, Args)]
struct InputArgs {
    /// Read polygons from a local GeoJSON file instead of the platform
    #[arg(long, value_name = "PATH")]
    polygons_file: Option<PathBuf>,

    /// Comma-separated years, overriding inputs.years
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    years: Option<Vec<u16>>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Run {
            inputs,
            dry_run,
            show_layers,
        } => commands::run::run(commands::run::RunArgs {
            polygons_file: inputs.polygons_file,
            years: inputs.years,
            dry_run,
            show_layers,
        }),
        Commands::Plan { inputs } => commands::plan::run(inputs.polygons_file, inputs.years),
        Commands::Status { operation } => commands::status::run(&operation),
        Commands::Config { command } => commands::config::run(command),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "landmask",
            "run",
            "--dry-run",
            "--years",
            "2013,2023",
            "--polygons-file",
            "aoi.geojson",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                inputs, dry_run, ..
            } => {
                assert!(dry_run);
                assert_eq!(inputs.years, Some(vec![2013, 2023]));
                assert_eq!(inputs.polygons_file, Some(PathBuf::from("aoi.geojson")));
            }
            other => panic!("Expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_bad_year() {
        assert!(Cli::try_parse_from(["landmask", "plan", "--years", "2013,soon"]).is_err());
    }
}
