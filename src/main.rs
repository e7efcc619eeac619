//! IFC Colorize - apply spreadsheet color legends to IFC models
//!
//! Reads a color legend from an `.xlsx` worksheet and binds matching surface
//! styles to the body geometry of IFC objects, keyed by a classification
//! property such as `Mechanical / System Type`.

use clap::{ArgAction, Parser, Subcommand};
use ifc_colorize::cli::{
    ApplyArgs, ConfigArgs, ExitCode, GlobalOptions, InspectArgs, MappingArgs,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// IFC Colorize - apply spreadsheet color legends to IFC models
#[derive(Parser, Debug)]
#[command(name = "ifc-colorize", author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Use this config file instead of the default location
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Style IFC objects from a color legend
    Apply(ApplyArgs),
    /// Print the color mapping read from a workbook
    Mapping(MappingArgs),
    /// Show how each object of a model would be treated
    Inspect(InspectArgs),
    /// Manage configuration
    Config(ConfigArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = if verbose == 0 {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into())
    } else {
        level.into()
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let global = GlobalOptions { config: cli.config };
    let result = match &cli.command {
        Commands::Apply(args) => args.execute(&global),
        Commands::Mapping(args) => args.execute(&global),
        Commands::Inspect(args) => args.execute(&global),
        Commands::Config(args) => args.execute(&global),
    };

    let code = match result {
        Ok(()) => ExitCode::Success,
        Err(error) => {
            eprintln!("{error}");
            error.exit_code()
        }
    };
    std::process::exit(code.code());
}
