//! # formkit CLI entry point
//!
//! Parses command-line arguments, loads the optional config file, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use formkit_cli::check::{run_check, CheckArgs};
use formkit_cli::config::CliConfig;
use formkit_cli::render::{run_render, RenderArgs};
use formkit_cli::validate::{run_validate, ValidateArgs};

/// formkit: declarative form schemas.
///
/// Checks schema files, validates records against them, and prints the
/// form view a host UI would draw.
#[derive(Parser, Debug)]
#[command(name = "formkit", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a schema and compile its validator.
    Check(CheckArgs),

    /// Validate a record against a schema.
    Validate(ValidateArgs),

    /// Print the form view for a schema.
    Render(RenderArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(1);
        }
    };

    let filter = EnvFilter::try_new(config.log_filter(cli.verbose))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("formkit CLI starting");

    let result = match cli.command {
        Commands::Check(args) => run_check(&args, config.format(args.format)),
        Commands::Validate(args) => run_validate(&args, config.format(args.format)).await,
        Commands::Render(args) => run_render(&args, config.format(args.format)),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
