//! IFC Colorize Library
//!
//! This library provides the core of the IFC Colorize tool: reading color
//! legends from `.xlsx` workbooks, parsing and writing IFC-SPF models, and
//! assigning shared surface styles to the body geometry of classified
//! objects.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod ifc;
pub mod models;
pub mod parser;
pub mod services;
