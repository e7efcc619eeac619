//! Classification-name to color lookup table.

use serde::Serialize;
use std::collections::BTreeMap;

use super::RgbTriple;

/// Normalizes a classification name for lookup: trimmed and lowercased.
#[must_use]
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Case- and whitespace-insensitive mapping of names to colors.
///
/// Built once by the mapping loader and read-only afterwards. Keys are stored
/// normalized (see [`normalize_key`]) and iterate in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColorMapping {
    entries: BTreeMap<String, RgbTriple>,
}

impl ColorMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a color under the normalized form of `name`.
    ///
    /// A later insert for the same normalized name replaces the earlier one.
    /// Names that normalize to an empty string are ignored.
    pub fn insert(&mut self, name: &str, color: RgbTriple) {
        let key = normalize_key(name);
        if key.is_empty() {
            return;
        }
        self.entries.insert(key, color);
    }

    /// Looks up a color, normalizing `name` first.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<RgbTriple> {
        self.entries.get(&normalize_key(name)).copied()
    }

    /// Number of distinct normalized names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no colors were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RgbTriple)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<S: AsRef<str>> FromIterator<(S, RgbTriple)> for ColorMapping {
    fn from_iter<I: IntoIterator<Item = (S, RgbTriple)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (name, color) in iter {
            mapping.insert(name.as_ref(), color);
        }
        mapping
    }
}
