//! Mapping command: shows the color legend as the apply command reads it.

use crate::cli::common::{describe, CliError, CliResult, GlobalOptions};
use crate::parser::xlsx::XlsxError;
use crate::services::load_color_mapping;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Print the color mapping loaded from a workbook
#[derive(Debug, Clone, Args)]
pub struct MappingArgs {
    /// Workbook holding the color legend (defaults to `source.workbook`)
    #[arg(short, long, value_name = "FILE")]
    pub workbook: Option<PathBuf>,

    /// Worksheet holding the legend
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// One mapping entry for output
#[derive(Serialize, Debug)]
struct MappingEntry<'a> {
    name: &'a str,
    r: f64,
    g: f64,
    b: f64,
    hex: String,
}

impl MappingArgs {
    /// Execute the mapping command
    pub fn execute(&self, global: &GlobalOptions) -> CliResult<()> {
        let config = global.load_config()?;
        let sheet = self.sheet.as_deref().unwrap_or(&config.source.sheet);
        let workbook = self
            .workbook
            .as_ref()
            .or(config.source.workbook.as_ref())
            .ok_or_else(|| {
                CliError::validation("No workbook given; pass --workbook or set source.workbook")
            })?;

        let mapping = load_color_mapping(workbook, sheet).map_err(|e| {
            let message = format!("Failed to load color mapping: {}", describe(&e));
            if e.downcast_ref::<XlsxError>().is_some() {
                CliError::io(message)
            } else {
                CliError::validation(message)
            }
        })?;

        let entries: Vec<MappingEntry<'_>> = mapping
            .iter()
            .map(|(name, color)| MappingEntry {
                name,
                r: color.r,
                g: color.g,
                b: color.b,
                hex: color.to_hex(),
            })
            .collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&entries)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
        } else if entries.is_empty() {
            println!("No color entries found in sheet '{sheet}'.");
        } else {
            let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
            println!("Color mapping ({} entries):", entries.len());
            for (name, color) in mapping.iter() {
                println!("  {name:<width$}  {}  {color}", color.to_hex());
            }
        }

        if entries.is_empty() {
            return Err(CliError::warning("No mapping entries were loaded."));
        }

        Ok(())
    }
}
