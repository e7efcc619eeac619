//! Run outcome types reported to the operator.

use serde::Serialize;
use std::collections::BTreeSet;

/// Terminal outcome of processing one model object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectOutcome {
    /// Style bound to the object's body item
    Styled,
    /// Host object has no linked entity
    NoEntity,
    /// Entity name rejected by the eligibility filter
    NameMismatch,
    /// Property set or classification property missing or blank
    NoClassification,
    /// Classification value has no color in the mapping
    NoColor,
    /// Entity has no body representation item
    NoBody,
}

/// Per-reason counts of skipped objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    /// Objects without a linked entity
    pub no_entity: usize,
    /// Entities filtered out by name
    pub name_mismatch: usize,
    /// Entities without the classification property
    pub no_classification: usize,
    /// Entities whose classification has no color
    pub no_color: usize,
}

/// Aggregate result of one assignment run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Geometry items that received a style binding
    pub assigned_items: usize,
    /// Model objects whose body item was styled
    pub assigned_objects: usize,
    /// Eligible objects with no body geometry item
    pub no_body: usize,
    /// Distinct unmapped classification values, as found on the entities
    pub no_color: BTreeSet<String>,
    /// Style records created during the run
    pub styles_created: usize,
    /// Objects skipped before reaching the geometry stage
    pub skipped: SkipCounts,
}

impl RunSummary {
    /// Folds one object outcome into the counters.
    pub fn record(&mut self, outcome: ObjectOutcome) {
        match outcome {
            ObjectOutcome::Styled => {
                self.assigned_items += 1;
                self.assigned_objects += 1;
            }
            ObjectOutcome::NoEntity => self.skipped.no_entity += 1,
            ObjectOutcome::NameMismatch => self.skipped.name_mismatch += 1,
            ObjectOutcome::NoClassification => self.skipped.no_classification += 1,
            ObjectOutcome::NoColor => self.skipped.no_color += 1,
            ObjectOutcome::NoBody => self.no_body += 1,
        }
    }
}
