//! Apply command: colors an IFC model from a spreadsheet legend.

use crate::cli::common::{describe, CliError, CliResult, GlobalOptions};
use crate::config::Config;
use crate::ifc::IfcDocument;
use crate::models::RunSummary;
use crate::parser::xlsx::XlsxError;
use crate::services::{load_color_mapping, report, AssignmentDriver};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Style the body geometry of IFC objects from a color legend
#[derive(Debug, Clone, Args)]
pub struct ApplyArgs {
    /// IFC model to style
    #[arg(long, value_name = "FILE")]
    pub ifc: PathBuf,

    /// Workbook holding the color legend (defaults to `source.workbook`)
    #[arg(short, long, value_name = "FILE")]
    pub workbook: Option<PathBuf>,

    /// Worksheet holding the legend
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Write the styled model to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Property set carrying the classification
    #[arg(long, value_name = "NAME")]
    pub property_set: Option<String>,

    /// Classification property inside the set
    #[arg(long, value_name = "NAME")]
    pub property: Option<String>,

    /// Regex entity names must match (empty accepts all)
    #[arg(long, value_name = "REGEX")]
    pub name_pattern: Option<String>,

    /// Transparency of created styles, 0.0 to 1.0
    #[arg(long, value_name = "VALUE")]
    pub transparency: Option<f64>,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Run the assignment but never write the model
    #[arg(long)]
    pub dry_run: bool,
}

/// JSON output of a run
#[derive(Serialize, Debug)]
struct ApplyOutput<'a> {
    #[serde(flatten)]
    summary: &'a RunSummary,
    mapping_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    dry_run: bool,
}

impl ApplyArgs {
    /// Execute the apply command
    pub fn execute(&self, global: &GlobalOptions) -> CliResult<()> {
        let mut config = global.load_config()?;
        self.apply_overrides(&mut config);
        config
            .validate()
            .map_err(|e| CliError::validation(format!("Invalid settings: {}", describe(&e))))?;

        let workbook = self
            .workbook
            .clone()
            .or_else(|| config.source.workbook.clone())
            .ok_or_else(|| {
                CliError::validation("No workbook given; pass --workbook or set source.workbook")
            })?;
        let options = config
            .to_assign_options()
            .map_err(|e| CliError::validation(describe(&e)))?;

        let mapping = load_color_mapping(&workbook, &config.source.sheet).map_err(|e| {
            let message = format!("Failed to load color mapping: {}", describe(&e));
            if e.downcast_ref::<XlsxError>().is_some() {
                CliError::io(message)
            } else {
                CliError::validation(message)
            }
        })?;
        if mapping.is_empty() {
            return Err(CliError::warning("No mapping. End the program."));
        }
        info!(entries = mapping.len(), workbook = %workbook.display(), "Loaded color mapping");

        let mut document =
            IfcDocument::open(&self.ifc).map_err(|e| CliError::io(describe(&e)))?;

        let summary = AssignmentDriver::new(&mapping, &options)
            .run(&mut document)
            .map_err(|e| CliError::io(format!("Assignment failed: {}", describe(&e))))?;

        let written = match &self.output {
            Some(path) if !self.dry_run => {
                document
                    .save(path)
                    .map_err(|e| CliError::io(describe(&e)))?;
                info!(path = %path.display(), "Saved styled model");
                Some(path.display().to_string())
            }
            _ => None,
        };

        if self.json {
            let output = ApplyOutput {
                summary: &summary,
                mapping_entries: mapping.len(),
                output: written,
                dry_run: self.dry_run,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&output)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
        } else {
            print!("{}", report::render_text(&summary));
            if let Some(path) = written {
                println!("[DONE] Saved styled model to {path}");
            }
        }

        Ok(())
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(sheet) = &self.sheet {
            config.source.sheet.clone_from(sheet);
        }
        if let Some(property_set) = &self.property_set {
            config.classification.property_set.clone_from(property_set);
        }
        if let Some(property) = &self.property {
            config.classification.property.clone_from(property);
        }
        if let Some(pattern) = &self.name_pattern {
            config.filter.name_pattern.clone_from(pattern);
        }
        if let Some(transparency) = self.transparency {
            config.style.transparency = transparency;
        }
    }
}
