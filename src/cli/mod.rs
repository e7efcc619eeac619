//! CLI command handlers for ifc-colorize.
//!
//! Each subcommand is a clap `Args` struct with an `execute` method returning
//! a [`common::CliResult`]; `main.rs` maps failures to exit codes.

pub mod apply;
pub mod common;
pub mod config;
pub mod inspect;
pub mod mapping;

// Re-export types used by main.rs and tests
pub use apply::ApplyArgs;
pub use common::{CliError, ExitCode, GlobalOptions};
pub use config::ConfigArgs;
pub use inspect::InspectArgs;
pub use mapping::MappingArgs;
