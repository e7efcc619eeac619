//! Configuration management CLI commands.

use crate::cli::common::{describe, CliError, CliResult, GlobalOptions};
use crate::config::Config;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Write a configuration file with default values
    Init(ConfigInitArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Write a default configuration file
#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Default legend workbook
    #[arg(long, value_name = "FILE")]
    workbook: Option<PathBuf>,

    /// Worksheet holding the legend
    #[arg(long, value_name = "NAME")]
    sheet: Option<String>,

    /// Property set carrying the classification
    #[arg(long, value_name = "NAME")]
    property_set: Option<String>,

    /// Classification property inside the set
    #[arg(long, value_name = "NAME")]
    property: Option<String>,

    /// Regex entity names must match (empty accepts all)
    #[arg(long, value_name = "REGEX")]
    name_pattern: Option<String>,

    /// Shape representation to style
    #[arg(long, value_name = "ID")]
    representation: Option<String>,

    /// Transparency of created styles, 0.0 to 1.0
    #[arg(long, value_name = "VALUE")]
    transparency: Option<f64>,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self, global: &GlobalOptions) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(global),
            ConfigCommand::Init(args) => args.execute(global),
            ConfigCommand::Set(args) => args.execute(global),
        }
    }
}

impl ConfigShowArgs {
    fn execute(&self, global: &GlobalOptions) -> CliResult<()> {
        let config = global.load_config()?;

        if self.json {
            let json = serde_json::to_string_pretty(&config).map_err(|e| {
                CliError::io(format!("Failed to serialize configuration to JSON: {e}"))
            })?;
            println!("{json}");
        } else {
            println!("Configuration ({})", global.config_path()?.display());
            println!();
            println!("Source:");
            match &config.source.workbook {
                Some(path) => println!("  Workbook:       {}", path.display()),
                None => println!("  Workbook:       (not set)"),
            }
            println!("  Sheet:          {}", config.source.sheet);
            println!();
            println!("Classification:");
            println!("  Property set:   {}", config.classification.property_set);
            println!("  Property:       {}", config.classification.property);
            println!();
            println!("Filter:");
            if config.filter.name_pattern.is_empty() {
                println!("  Name pattern:   (disabled)");
            } else {
                println!("  Name pattern:   {}", config.filter.name_pattern);
            }
            println!();
            println!("Geometry:");
            println!(
                "  Representation: {}",
                config.geometry.representation_identifier
            );
            println!();
            println!("Style:");
            println!("  Transparency:   {}", config.style.transparency);
        }

        Ok(())
    }
}

impl ConfigInitArgs {
    fn execute(&self, global: &GlobalOptions) -> CliResult<()> {
        let path = global.config_path()?;
        if path.exists() && !self.force {
            return Err(CliError::validation(format!(
                "Configuration already exists at {} (use --force to overwrite)",
                path.display()
            )));
        }

        Config::new()
            .save_to(&path)
            .map_err(|e| CliError::io(format!("Failed to save configuration: {}", describe(&e))))?;

        println!("Wrote default configuration to {}", path.display());
        Ok(())
    }
}

impl ConfigSetArgs {
    fn execute(&self, global: &GlobalOptions) -> CliResult<()> {
        let mut config = global.load_config()?;
        let mut changed = Vec::new();

        if let Some(workbook) = &self.workbook {
            config.source.workbook = Some(workbook.clone());
            changed.push(format!("source.workbook = {}", workbook.display()));
        }
        if let Some(sheet) = &self.sheet {
            config.source.sheet.clone_from(sheet);
            changed.push(format!("source.sheet = {sheet}"));
        }
        if let Some(property_set) = &self.property_set {
            config.classification.property_set.clone_from(property_set);
            changed.push(format!("classification.property_set = {property_set}"));
        }
        if let Some(property) = &self.property {
            config.classification.property.clone_from(property);
            changed.push(format!("classification.property = {property}"));
        }
        if let Some(pattern) = &self.name_pattern {
            config.filter.name_pattern.clone_from(pattern);
            changed.push(format!("filter.name_pattern = {pattern}"));
        }
        if let Some(representation) = &self.representation {
            config
                .geometry
                .representation_identifier
                .clone_from(representation);
            changed.push(format!(
                "geometry.representation_identifier = {representation}"
            ));
        }
        if let Some(transparency) = self.transparency {
            config.style.transparency = transparency;
            changed.push(format!("style.transparency = {transparency}"));
        }

        if changed.is_empty() {
            return Err(CliError::validation(
                "No configuration values specified. Use --help to see available options.",
            ));
        }

        config
            .validate()
            .map_err(|e| CliError::validation(describe(&e)))?;

        let path = global.config_path()?;
        config
            .save_to(&path)
            .map_err(|e| CliError::io(format!("Failed to save configuration: {}", describe(&e))))?;

        println!("Configuration updated successfully.");
        for line in changed {
            println!("  {line}");
        }
        Ok(())
    }
}
