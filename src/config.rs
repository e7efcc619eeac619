//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, DEFAULT_NAME_PATTERN, DEFAULT_PROPERTY,
    DEFAULT_PROPERTY_SET, DEFAULT_REPRESENTATION_IDENTIFIER, DEFAULT_SHEET_NAME,
};
use crate::services::{AssignOptions, NameFilter};

/// Where the color legend is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Workbook used when `--workbook` is not given
    pub workbook: Option<PathBuf>,
    /// Worksheet holding the legend
    pub sheet: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            workbook: None,
            sheet: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

/// Which property classifies an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Property set name (e.g., "Mechanical")
    pub property_set: String,
    /// Property name inside the set (e.g., "System Type")
    pub property: String,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            property_set: DEFAULT_PROPERTY_SET.to_string(),
            property: DEFAULT_PROPERTY.to_string(),
        }
    }
}

/// Entity eligibility filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Regex the entity name must match; empty accepts every entity
    pub name_pattern: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            name_pattern: DEFAULT_NAME_PATTERN.to_string(),
        }
    }
}

/// Which geometry receives the style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Shape representation identifier (e.g., "Body")
    pub representation_identifier: String,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            representation_identifier: DEFAULT_REPRESENTATION_IDENTIFIER.to_string(),
        }
    }
}

/// Appearance of created styles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Surface transparency, 0.0 (opaque) to 1.0
    pub transparency: f64,
}

/// Application configuration.
///
/// Every section is optional in the file; missing values fall back to the
/// defaults.
///
/// Validation rules:
/// - the name pattern must be a valid regex (or empty)
/// - sheet, property set, property and representation identifier must not be blank
/// - transparency must lie in [0, 1]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Legend workbook settings
    pub source: SourceConfig,
    /// Classification property
    pub classification: ClassificationConfig,
    /// Name-based eligibility
    pub filter: FilterConfig,
    /// Styled representation
    pub geometry: GeometryConfig,
    /// Created style appearance
    pub style: StyleConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the config directory path.
    ///
    /// `IFC_COLORIZE_CONFIG_DIR` takes precedence; otherwise:
    /// - Linux: `~/.config/ifc-colorize/`
    /// - macOS: `~/Library/Application Support/ifc-colorize/`
    /// - Windows: `%APPDATA%\ifc-colorize\`
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the default config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from a specific file, defaulting when it is absent.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate().context(format!(
            "Invalid configuration in {}",
            config_path.display()
        ))?;

        Ok(config)
    }

    /// Saves configuration to the default config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `config_path` using an atomic write.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        // Ensure config directory exists
        if let Some(config_dir) = config_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        // Serialize to TOML
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = config_path.with_extension("toml.tmp");

        // Write to temp file
        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        // Atomic rename
        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        NameFilter::from_pattern(&self.filter.name_pattern)?;

        let required = [
            ("source.sheet", &self.source.sheet),
            ("classification.property_set", &self.classification.property_set),
            ("classification.property", &self.classification.property),
            (
                "geometry.representation_identifier",
                &self.geometry.representation_identifier,
            ),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                bail!("'{key}' must not be empty");
            }
        }

        let transparency = self.style.transparency;
        if !(0.0..=1.0).contains(&transparency) {
            bail!("'style.transparency' must be between 0 and 1, got {transparency}");
        }

        Ok(())
    }

    /// Builds the assignment settings described by this configuration.
    pub fn to_assign_options(&self) -> Result<AssignOptions> {
        Ok(AssignOptions {
            name_filter: NameFilter::from_pattern(&self.filter.name_pattern)?,
            property_set: self.classification.property_set.clone(),
            property: self.classification.property.clone(),
            representation_identifier: self.geometry.representation_identifier.clone(),
            transparency: self.style.transparency,
        })
    }
}
