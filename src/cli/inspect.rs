//! Inspect command: per-object triage of an IFC model.

use crate::cli::common::{describe, CliError, CliResult, GlobalOptions};
use crate::ifc::IfcDocument;
use crate::services::host::{find_body_item, ModelHost};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Show how each object of an IFC model would be treated
#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// IFC model to inspect
    #[arg(long, value_name = "FILE")]
    pub ifc: PathBuf,

    /// Only list objects that pass the name filter
    #[arg(long)]
    pub eligible_only: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output of the inspect command
#[derive(Serialize, Debug)]
struct InspectOutput {
    schema: Option<String>,
    instances: usize,
    existing_styles: usize,
    objects: Vec<ObjectInfo>,
}

/// One model object
#[derive(Serialize, Debug)]
struct ObjectInfo {
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body_item: Option<String>,
    styled: bool,
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self, global: &GlobalOptions) -> CliResult<()> {
        let config = global.load_config()?;
        let options = config
            .to_assign_options()
            .map_err(|e| CliError::validation(describe(&e)))?;

        let document = IfcDocument::open(&self.ifc).map_err(|e| CliError::io(describe(&e)))?;

        let objects: Vec<ObjectInfo> = document
            .objects()
            .into_iter()
            .map(|object| {
                let Some(entity) = object.entity else {
                    return ObjectInfo {
                        label: object.label,
                        entity: None,
                        name: None,
                        eligible: false,
                        classification: None,
                        body_item: None,
                        styled: false,
                    };
                };
                let name = document.entity_name(entity);
                let classification = document
                    .properties(entity)
                    .get(&options.property_set)
                    .and_then(|group| group.get(&options.property))
                    .filter(|value| !value.is_blank())
                    .map(ToString::to_string);
                let body_item =
                    find_body_item(&document, entity, &options.representation_identifier);
                ObjectInfo {
                    label: object.label,
                    entity: Some(entity.to_string()),
                    eligible: options.name_filter.accepts(name.as_deref()),
                    name,
                    classification,
                    body_item: body_item.map(|item| item.to_string()),
                    styled: body_item.is_some_and(|item| document.styled_item(item).is_some()),
                }
            })
            .filter(|info| !self.eligible_only || info.eligible)
            .collect();

        let output = InspectOutput {
            schema: document.schema().map(str::to_string),
            instances: document.len(),
            existing_styles: document.existing_styles().len(),
            objects,
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&output)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
            return Ok(());
        }

        println!("Model: {}", self.ifc.display());
        println!("  Schema:          {}", output.schema.as_deref().unwrap_or("unknown"));
        println!("  Instances:       {}", output.instances);
        println!("  Existing styles: {}", output.existing_styles);
        println!("  Objects:         {}", output.objects.len());
        println!();

        for info in &output.objects {
            let marker = if info.eligible { "✓" } else { "·" };
            println!("{marker} {}", info.label);
            if let Some(classification) = &info.classification {
                println!("    {}: {classification}", options.property);
            }
            match &info.body_item {
                Some(item) if info.styled => println!("    Body item: {item} (styled)"),
                Some(item) => println!("    Body item: {item}"),
                None => println!("    Body item: none"),
            }
        }

        Ok(())
    }
}
