//! Data models for color mappings, styles, entities and run summaries.
//!
//! Models are plain data and independent of any file format or host document.

pub mod color_mapping;
pub mod entity;
pub mod property;
pub mod rgb;
pub mod style;
pub mod summary;

// Re-export all model types
pub use color_mapping::{normalize_key, ColorMapping};
pub use entity::{AttributeValue, EntityId};
pub use property::{PropertySets, PropertyValue};
pub use rgb::RgbTriple;
pub use style::{StyleHandle, StyleKey};
pub use summary::{ObjectOutcome, RunSummary, SkipCounts};
