//! Entity identifiers and positional attribute values of a model document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Instance identifier of an entity in a model document (`#123`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One positional attribute of an entity.
///
/// Mirrors the value forms of an IFC-SPF instance: `$`, `*`, numbers,
/// strings, `.ENUM.` literals, `#id` references, nested lists and typed
/// values such as `IFCLABEL('Chilled Water')`.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Unset optional attribute (`$`)
    Null,
    /// Attribute derived by a supertype (`*`)
    Derived,
    /// Integer literal
    Integer(i64),
    /// Real literal
    Real(f64),
    /// String literal (unescaped)
    String(String),
    /// Enumeration literal without the surrounding dots, e.g. `BOTH`
    Enum(String),
    /// Reference to another entity
    Ref(EntityId),
    /// Aggregate (list or set)
    List(Vec<AttributeValue>),
    /// Typed value: uppercase type name and its wrapped value
    Typed(String, Box<AttributeValue>),
}

impl AttributeValue {
    /// Shorthand for a string attribute.
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Shorthand for an enumeration attribute.
    pub fn enumeration(value: impl Into<String>) -> Self {
        Self::Enum(value.into())
    }

    /// Shorthand for a list of references.
    pub fn refs(ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self::List(ids.into_iter().map(Self::Ref).collect())
    }

    /// Returns the referenced id, if this is a reference.
    #[must_use]
    pub const fn as_ref_id(&self) -> Option<EntityId> {
        match self {
            Self::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns the string contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list items, or an empty slice for any non-list value.
    #[must_use]
    pub fn as_list(&self) -> &[AttributeValue] {
        match self {
            Self::List(items) => items,
            _ => &[],
        }
    }

    /// Collects every reference held directly in a list attribute.
    #[must_use]
    pub fn ref_ids(&self) -> Vec<EntityId> {
        self.as_list().iter().filter_map(Self::as_ref_id).collect()
    }

    /// Returns `true` for `$`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}
