//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the default workflow settings.

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "ifc-colorize";

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "ifc-colorize";

/// Environment variable that overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "IFC_COLORIZE_CONFIG_DIR";

/// Worksheet holding the color legend.
pub const DEFAULT_SHEET_NAME: &str = "ModelView";

/// Literal header text marking the color column of the legend.
pub const COLOR_HEADER: &str = "Color";

/// Property set carrying the classification.
pub const DEFAULT_PROPERTY_SET: &str = "Mechanical";

/// Classification property inside [`DEFAULT_PROPERTY_SET`].
pub const DEFAULT_PROPERTY: &str = "System Type";

/// Entities are eligible only when their name contains a standalone 7-digit token.
pub const DEFAULT_NAME_PATTERN: &str = r"\b\d{7}\b";

/// Shape representation whose first item receives the style.
pub const DEFAULT_REPRESENTATION_IDENTIFIER: &str = "Body";

/// Decimal places used when comparing colors for style reuse.
pub const STYLE_KEY_DECIMALS: i32 = 6;
