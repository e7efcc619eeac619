//! Readers and writers for the external file formats.
//!
//! `xlsx` reads cell values and fill colors from spreadsheet packages; `step`
//! reads and writes the ISO 10303-21 clear-text encoding used by IFC files.

pub mod step;
pub mod xlsx;

// Re-export commonly used functions
pub use xlsx::read_worksheet;
