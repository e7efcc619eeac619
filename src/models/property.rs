//! Classification property values grouped by property set.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Property sets of an entity: set name -> property name -> value.
pub type PropertySets = BTreeMap<String, BTreeMap<String, PropertyValue>>;

/// A single property value, stripped of its IFC measure/label type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Label, text, identifier and enumerated values
    Text(String),
    /// Integer-typed measures and counts
    Integer(i64),
    /// Real-typed measures
    Real(f64),
    /// Boolean and logical values
    Boolean(bool),
}

impl PropertyValue {
    /// Returns `true` for values that carry no classification: empty text,
    /// zero and `false`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Integer(i) => *i == 0,
            Self::Real(r) => *r == 0.0,
            Self::Boolean(b) => !b,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r:?}"),
            Self::Boolean(true) => f.write_str("True"),
            Self::Boolean(false) => f.write_str("False"),
        }
    }
}
