//! Entity eligibility predicate based on the entity name.

use anyhow::{Context, Result};
use regex::Regex;

use crate::constants::DEFAULT_NAME_PATTERN;

/// Decides which entities are eligible for styling by their `Name`.
///
/// The default pattern accepts names containing a standalone 7-digit token
/// (e.g. `Diffuser:1350981`). A missing name is treated as empty.
#[derive(Debug, Clone)]
pub enum NameFilter {
    /// Every entity is eligible
    AcceptAll,
    /// Name must contain a match of the pattern
    Pattern(Regex),
}

impl NameFilter {
    /// Builds a filter from a regex; an empty pattern accepts everything.
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self::AcceptAll);
        }
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid entity name pattern '{pattern}'"))?;
        Ok(Self::Pattern(regex))
    }

    /// Returns `true` if an entity with this name should be processed.
    #[must_use]
    pub fn accepts(&self, name: Option<&str>) -> bool {
        match self {
            Self::AcceptAll => true,
            Self::Pattern(regex) => regex.is_match(name.unwrap_or_default()),
        }
    }
}

impl Default for NameFilter {
    fn default() -> Self {
        Self::from_pattern(DEFAULT_NAME_PATTERN).unwrap_or(Self::AcceptAll)
    }
}
