//! Entity store of an IFC-SPF file.

use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use super::kinds;
use crate::models::{AttributeValue, EntityId};
use crate::parser::step::{self, HeaderRecord, Instance, StepError};

/// Schema written into the header of documents built in memory.
pub const DEFAULT_SCHEMA: &str = "IFC4";

/// Inverse relationships resolved once when instances are added.
#[derive(Debug, Clone, Default)]
struct RelationIndex {
    /// Object -> property definitions attached to the occurrence
    property_definitions: HashMap<EntityId, Vec<EntityId>>,
    /// Object -> its type object
    types: HashMap<EntityId, EntityId>,
    /// Representation item -> styled items pointing at it
    styled_by_item: HashMap<EntityId, Vec<EntityId>>,
}

impl RelationIndex {
    fn add(&mut self, id: EntityId, instance: &Instance) {
        match instance.kind.as_str() {
            kinds::REL_DEFINES_BY_PROPERTIES => {
                let definitions = refs_in(instance.arg(5));
                for object in instance.arg(4).ref_ids() {
                    self.property_definitions
                        .entry(object)
                        .or_default()
                        .extend(&definitions);
                }
            }
            kinds::REL_DEFINES_BY_TYPE => {
                if let Some(ty) = instance.arg(5).as_ref_id() {
                    for object in instance.arg(4).ref_ids() {
                        self.types.entry(object).or_insert(ty);
                    }
                }
            }
            kinds::STYLED_ITEM => {
                if let Some(item) = instance.arg(0).as_ref_id() {
                    self.styled_by_item.entry(item).or_default().push(id);
                }
            }
            _ => {}
        }
    }

    /// Whether changing this attribute would invalidate the index.
    fn covers(kind: &str, index: usize) -> bool {
        matches!(
            (kind, index),
            (kinds::REL_DEFINES_BY_PROPERTIES | kinds::REL_DEFINES_BY_TYPE, 4 | 5)
                | (kinds::STYLED_ITEM, 0)
        )
    }
}

/// A single reference or every reference of a list.
fn refs_in(value: &AttributeValue) -> Vec<EntityId> {
    match value {
        AttributeValue::Ref(id) => vec![*id],
        other => other.ref_ids(),
    }
}

/// An IFC model held in memory as `#id -> instance`.
///
/// Instances are kept in id order, which is also the order they are written
/// back in. New instances are numbered after the highest existing id.
#[derive(Debug, Clone)]
pub struct IfcDocument {
    header: Vec<HeaderRecord>,
    instances: BTreeMap<EntityId, Instance>,
    index: RelationIndex,
}

impl Default for IfcDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl IfcDocument {
    /// Creates an empty document with a generated header.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: step::default_header(DEFAULT_SCHEMA, ""),
            instances: BTreeMap::new(),
            index: RelationIndex::default(),
        }
    }

    /// Parses IFC-SPF text.
    ///
    /// # Errors
    ///
    /// Returns a [`StepError`] if the text is not a readable STEP file.
    pub fn parse(text: &str) -> Result<Self, StepError> {
        let file = step::parse(text)?;
        let mut document = Self {
            header: file.header,
            instances: BTreeMap::new(),
            index: RelationIndex::default(),
        };
        if document.header.is_empty() {
            document.header = step::default_header(DEFAULT_SCHEMA, "");
        }
        for (id, instance) in file.instances {
            document.index.add(id, &instance);
            document.instances.insert(id, instance);
        }
        Ok(document)
    }

    /// Reads and parses an IFC file.
    pub fn open(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read IFC file: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse IFC file: {}", path.display()))
    }

    /// Writes the document to `path` through a temporary file and a rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let temp_path = path.with_extension("ifc.tmp");

        fs::write(&temp_path, self.to_string())
            .with_context(|| format!("Failed to write temp IFC file: {}", temp_path.display()))?;

        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to rename temp IFC file to: {}", path.display()))?;

        Ok(())
    }

    /// Schema named in the file header, e.g. `IFC2X3`.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        step::header_schema(&self.header)
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` if the DATA section is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Looks up an instance.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    /// Looks up an instance, only if it has the given uppercase type.
    #[must_use]
    pub fn get_kind(&self, id: EntityId, kind: &str) -> Option<&Instance> {
        self.get(id).filter(|instance| instance.kind == kind)
    }

    /// All instances in id order.
    pub fn instances(&self) -> impl Iterator<Item = (EntityId, &Instance)> {
        self.instances.iter().map(|(id, instance)| (*id, instance))
    }

    /// Instances of one uppercase type, in id order.
    pub fn instances_of<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = (EntityId, &'a Instance)> + 'a {
        self.instances().filter(move |(_, instance)| instance.kind == kind)
    }

    /// Instance count per type.
    #[must_use]
    pub fn kind_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for instance in self.instances.values() {
            *counts.entry(instance.kind.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Id the next added instance will receive.
    #[must_use]
    pub fn next_id(&self) -> EntityId {
        self.instances
            .keys()
            .next_back()
            .map_or(EntityId(1), |last| EntityId(last.0 + 1))
    }

    /// Adds an instance of `kind` (any case) and returns its id.
    pub fn add(&mut self, kind: &str, args: Vec<AttributeValue>) -> Result<EntityId> {
        let valid = kind.starts_with(|c: char| c.is_ascii_alphabetic())
            && kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            bail!("Invalid entity type name '{kind}'");
        }

        let id = self.next_id();
        let instance = Instance::new(kind, args);
        self.index.add(id, &instance);
        self.instances.insert(id, instance);
        Ok(id)
    }

    /// Replaces one positional attribute, padding with `$` if needed.
    ///
    /// Attributes that define indexed relationships (relating/related objects
    /// of property and type assignments, the item of a styled item) cannot be
    /// changed.
    pub fn set_attribute(&mut self, id: EntityId, index: usize, value: AttributeValue) -> Result<()> {
        let Some(instance) = self.instances.get_mut(&id) else {
            bail!("Instance {id} does not exist");
        };
        if RelationIndex::covers(&instance.kind, index) {
            bail!("Attribute {index} of {} {id} cannot be changed", instance.kind);
        }
        if instance.args.len() <= index {
            instance.args.resize(index + 1, AttributeValue::Null);
        }
        instance.args[index] = value;
        Ok(())
    }

    /// Property definitions attached directly to an object.
    pub(crate) fn property_definitions(&self, object: EntityId) -> &[EntityId] {
        self.index
            .property_definitions
            .get(&object)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Type object of an object occurrence.
    pub(crate) fn type_of(&self, object: EntityId) -> Option<EntityId> {
        self.index.types.get(&object).copied()
    }

    /// Styled items whose `Item` is `item`, in id order.
    pub(crate) fn styled_items_of(&self, item: EntityId) -> &[EntityId] {
        self.index
            .styled_by_item
            .get(&item)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl fmt::Display for IfcDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        step::write_to(f, &self.header, self.instances())
    }
}
