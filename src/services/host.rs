//! Narrow interface to the host model document.
//!
//! The assignment driver and style cache only talk to the document through
//! [`ModelHost`], so they run the same against a parsed IFC file or an
//! in-memory fake.

use anyhow::Result;
use serde::Serialize;

use crate::models::{AttributeValue, EntityId, PropertySets, RgbTriple, StyleHandle};

/// A host-side object, optionally linked to a model entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelObject {
    /// Display label of the object in the host
    pub label: String,
    /// Underlying entity, or `None` when the link does not resolve
    pub entity: Option<EntityId>,
}

/// One shape representation of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeRepresentation {
    /// Representation identifier such as "Body" or "Axis"
    pub identifier: Option<String>,
    /// Geometry items, in document order
    pub items: Vec<EntityId>,
}

/// A complete style chain already present in the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExistingStyle {
    /// Surface colour of the style
    pub color: RgbTriple,
    /// Rendering transparency
    pub transparency: f64,
    /// The style-assignment record
    pub handle: StyleHandle,
}

/// Operations the styling workflow needs from a model document.
pub trait ModelHost {
    /// All host objects, in host enumeration order.
    fn objects(&self) -> Vec<ModelObject>;

    /// The entity's `Name` attribute.
    fn entity_name(&self, entity: EntityId) -> Option<String>;

    /// Property sets attached to the entity (quantity sets excluded).
    fn properties(&self, entity: EntityId) -> PropertySets;

    /// Shape representations of the entity's product shape.
    fn shape_representations(&self, entity: EntityId) -> Vec<ShapeRepresentation>;

    /// Creates an entity of `kind` from positional constructor arguments.
    fn create_entity(&mut self, kind: &str, args: Vec<AttributeValue>) -> Result<EntityId>;

    /// The styled-item record already bound to `item`, if any.
    fn styled_item(&self, item: EntityId) -> Option<EntityId>;

    /// Current style list of a styled-item record.
    fn styles(&self, styled_item: EntityId) -> Vec<EntityId>;

    /// Replaces the style list of a styled-item record.
    fn set_styles(&mut self, styled_item: EntityId, styles: Vec<EntityId>) -> Result<()>;

    /// Style chains created by an earlier run, so identical colors are reused
    /// instead of recreated. Hosts that cannot tell return nothing.
    fn existing_styles(&self) -> Vec<ExistingStyle> {
        Vec::new()
    }

    /// Creates a styled-item record binding `styles` to `item`.
    fn create_styled_item(&mut self, item: EntityId, styles: Vec<EntityId>) -> Result<EntityId> {
        self.create_entity(
            "IfcStyledItem",
            vec![
                AttributeValue::Ref(item),
                AttributeValue::refs(styles),
                AttributeValue::Null,
            ],
        )
    }
}

/// Returns the first item of the first shape representation tagged
/// `identifier`.
///
/// Only single-item bodies are supported: additional items are ignored.
pub fn find_body_item<H: ModelHost + ?Sized>(
    host: &H,
    entity: EntityId,
    identifier: &str,
) -> Option<EntityId> {
    host.shape_representations(entity)
        .into_iter()
        .find(|rep| rep.identifier.as_deref() == Some(identifier))
        .and_then(|rep| rep.items.first().copied())
}
