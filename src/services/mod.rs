//! Service layer for the color assignment workflow.
//!
//! Services encapsulate the workflow logic and talk to a model document only
//! through the [`host::ModelHost`] trait.

pub mod assign;
pub mod host;
pub mod mapping;
pub mod name_filter;
pub mod report;
pub mod style_cache;

// Re-export commonly used types and functions
pub use assign::{AssignOptions, AssignmentDriver};
pub use host::ModelHost;
pub use mapping::load_color_mapping;
pub use name_filter::NameFilter;
pub use style_cache::StyleCache;
