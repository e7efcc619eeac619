//! Assignment driver: binds mapped colors to the body items of model objects.
//!
//! For every host object the driver resolves the entity, applies the name
//! filter, reads the classification property, looks the value up in the color
//! mapping, obtains a shared style and binds it to the first body item. Each
//! object ends in exactly one [`ObjectOutcome`]; only style creation and
//! document writes can fail the run.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::host::{find_body_item, ModelHost, ModelObject};
use super::name_filter::NameFilter;
use super::style_cache::StyleCache;
use crate::constants::{DEFAULT_PROPERTY, DEFAULT_PROPERTY_SET, DEFAULT_REPRESENTATION_IDENTIFIER};
use crate::models::{ColorMapping, EntityId, ObjectOutcome, RunSummary, StyleHandle};

/// Settings of one assignment run.
#[derive(Debug, Clone)]
pub struct AssignOptions {
    /// Eligibility predicate on entity names
    pub name_filter: NameFilter,
    /// Property set holding the classification
    pub property_set: String,
    /// Classification property inside the set
    pub property: String,
    /// Shape representation whose first item is styled
    pub representation_identifier: String,
    /// Transparency of every created style (0 = opaque)
    pub transparency: f64,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self {
            name_filter: NameFilter::default(),
            property_set: DEFAULT_PROPERTY_SET.to_string(),
            property: DEFAULT_PROPERTY.to_string(),
            representation_identifier: DEFAULT_REPRESENTATION_IDENTIFIER.to_string(),
            transparency: 0.0,
        }
    }
}

/// What happened when binding a style to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// A new styled-item record was created for the item
    Created(EntityId),
    /// The style was appended to the item's existing styled item
    Appended(EntityId),
    /// The item's styled item already listed the style
    AlreadyBound(EntityId),
}

/// Binds `style` to `item`, reusing the item's styled-item record if one
/// exists and never listing the same style twice.
pub fn bind_style<H: ModelHost + ?Sized>(
    host: &mut H,
    item: EntityId,
    style: StyleHandle,
) -> Result<Binding> {
    let style_id = style.entity();

    if let Some(styled) = host.styled_item(item) {
        let mut styles = host.styles(styled);
        if styles.contains(&style_id) {
            return Ok(Binding::AlreadyBound(styled));
        }
        styles.push(style_id);
        host.set_styles(styled, styles)
            .with_context(|| format!("Failed to update styles of {styled}"))?;
        return Ok(Binding::Appended(styled));
    }

    let styled = host
        .create_styled_item(item, vec![style_id])
        .with_context(|| format!("Failed to create styled item for {item}"))?;
    Ok(Binding::Created(styled))
}

/// Runs the color assignment over every object of a host document.
///
/// Keeps its style cache between calls, so running it twice against the same
/// document adds nothing the first run did not.
#[derive(Debug)]
pub struct AssignmentDriver<'a> {
    mapping: &'a ColorMapping,
    options: &'a AssignOptions,
    cache: StyleCache,
}

impl<'a> AssignmentDriver<'a> {
    /// Creates a driver over a loaded color mapping.
    #[must_use]
    pub fn new(mapping: &'a ColorMapping, options: &'a AssignOptions) -> Self {
        Self {
            mapping,
            options,
            cache: StyleCache::new(),
        }
    }

    /// Processes every host object and returns the aggregated summary.
    ///
    /// An empty mapping aborts before touching the document.
    pub fn run<H: ModelHost + ?Sized>(&mut self, host: &mut H) -> Result<RunSummary> {
        if self.mapping.is_empty() {
            warn!("Color mapping is empty; no styles will be assigned");
            anyhow::bail!("No color mapping entries were loaded");
        }

        self.cache.prime(host.existing_styles());
        let created_before = self.cache.created();

        let mut summary = RunSummary::default();
        for object in host.objects() {
            let outcome = self.process_object(host, &object, &mut summary)?;
            debug!(label = %object.label, ?outcome, "Processed object");
            summary.record(outcome);
        }

        summary.styles_created = self.cache.created() - created_before;
        Ok(summary)
    }

    fn process_object<H: ModelHost + ?Sized>(
        &mut self,
        host: &mut H,
        object: &ModelObject,
        summary: &mut RunSummary,
    ) -> Result<ObjectOutcome> {
        let Some(entity) = object.entity else {
            return Ok(ObjectOutcome::NoEntity);
        };

        let name = host.entity_name(entity);
        if !self.options.name_filter.accepts(name.as_deref()) {
            return Ok(ObjectOutcome::NameMismatch);
        }

        let properties = host.properties(entity);
        let value = match properties
            .get(&self.options.property_set)
            .and_then(|set| set.get(&self.options.property))
        {
            Some(value) if !value.is_blank() => value,
            _ => return Ok(ObjectOutcome::NoClassification),
        };

        let original = value.to_string();
        let Some(color) = self.mapping.get(&original) else {
            summary.no_color.insert(original);
            return Ok(ObjectOutcome::NoColor);
        };

        let style = self
            .cache
            .resolve(host, color, self.options.transparency)?;

        let Some(item) =
            find_body_item(&*host, entity, &self.options.representation_identifier)
        else {
            return Ok(ObjectOutcome::NoBody);
        };

        let binding = bind_style(host, item, style)?;
        debug!(%entity, %item, ?binding, "Bound style");
        Ok(ObjectOutcome::Styled)
    }
}

/// Convenience wrapper: runs a fresh [`AssignmentDriver`] once.
pub fn run<H: ModelHost + ?Sized>(
    host: &mut H,
    mapping: &ColorMapping,
    options: &AssignOptions,
) -> Result<RunSummary> {
    AssignmentDriver::new(mapping, options).run(host)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{AttributeValue, PropertySets, PropertyValue, RgbTriple};
    use crate::services::host::{ExistingStyle, ShapeRepresentation};
    use std::collections::{BTreeSet, HashMap};

    /// In-memory host recording every created entity.
    #[derive(Debug, Default)]
    pub(crate) struct FakeHost {
        pub objects: Vec<ModelObject>,
        pub names: HashMap<EntityId, String>,
        pub properties: HashMap<EntityId, PropertySets>,
        pub representations: HashMap<EntityId, Vec<ShapeRepresentation>>,
        pub created: Vec<(EntityId, String, Vec<AttributeValue>)>,
        pub styled_by_item: HashMap<EntityId, EntityId>,
        pub style_lists: HashMap<EntityId, Vec<EntityId>>,
    }

    impl FakeHost {
        /// Adds an object with a named entity, an optional classification
        /// and an optional single-item body.
        pub fn add_product(
            &mut self,
            id: u64,
            name: &str,
            system_type: Option<&str>,
            body_item: Option<u64>,
        ) -> EntityId {
            let entity = EntityId(id);
            self.objects.push(ModelObject {
                label: name.to_string(),
                entity: Some(entity),
            });
            self.names.insert(entity, name.to_string());
            if let Some(value) = system_type {
                let mut sets = PropertySets::new();
                sets.entry("Mechanical".to_string()).or_default().insert(
                    "System Type".to_string(),
                    PropertyValue::Text(value.to_string()),
                );
                self.properties.insert(entity, sets);
            }
            if let Some(item) = body_item {
                self.representations.insert(
                    entity,
                    vec![ShapeRepresentation {
                        identifier: Some("Body".to_string()),
                        items: vec![EntityId(item)],
                    }],
                );
            }
            entity
        }

        pub fn created_of_kind(&self, kind: &str) -> usize {
            self.created.iter().filter(|(_, k, _)| k == kind).count()
        }

        fn args_of(&self, id: EntityId) -> Option<&[AttributeValue]> {
            self.created
                .iter()
                .find(|(created, _, _)| *created == id)
                .map(|(_, _, args)| args.as_slice())
        }
    }

    impl ModelHost for FakeHost {
        fn objects(&self) -> Vec<ModelObject> {
            self.objects.clone()
        }

        fn entity_name(&self, entity: EntityId) -> Option<String> {
            self.names.get(&entity).cloned()
        }

        fn properties(&self, entity: EntityId) -> PropertySets {
            self.properties.get(&entity).cloned().unwrap_or_default()
        }

        fn shape_representations(&self, entity: EntityId) -> Vec<ShapeRepresentation> {
            self.representations.get(&entity).cloned().unwrap_or_default()
        }

        fn create_entity(&mut self, kind: &str, args: Vec<AttributeValue>) -> Result<EntityId> {
            let id = EntityId(1000 + self.created.len() as u64);
            if kind == "IfcStyledItem" {
                if let Some(item) = args.first().and_then(AttributeValue::as_ref_id) {
                    self.styled_by_item.insert(item, id);
                }
                self.style_lists
                    .insert(id, args.get(1).map(AttributeValue::ref_ids).unwrap_or_default());
            }
            self.created.push((id, kind.to_string(), args));
            Ok(id)
        }

        fn styled_item(&self, item: EntityId) -> Option<EntityId> {
            self.styled_by_item.get(&item).copied()
        }

        fn styles(&self, styled_item: EntityId) -> Vec<EntityId> {
            self.style_lists.get(&styled_item).cloned().unwrap_or_default()
        }

        fn set_styles(&mut self, styled_item: EntityId, styles: Vec<EntityId>) -> Result<()> {
            self.style_lists.insert(styled_item, styles);
            Ok(())
        }

        fn existing_styles(&self) -> Vec<ExistingStyle> {
            let real = |v: &AttributeValue| match v {
                AttributeValue::Real(r) => *r,
                _ => 0.0,
            };
            self.created
                .iter()
                .filter(|(_, kind, _)| kind == "IfcPresentationStyleAssignment")
                .filter_map(|(psa, _, args)| {
                    let surface = args.first()?.ref_ids().first().copied()?;
                    let rendering = self.args_of(surface)?.get(2)?.ref_ids().first().copied()?;
                    let rendering_args = self.args_of(rendering)?;
                    let colour = self.args_of(rendering_args.first()?.as_ref_id()?)?;
                    Some(ExistingStyle {
                        color: RgbTriple::new(real(&colour[1]), real(&colour[2]), real(&colour[3])),
                        transparency: real(&rendering_args[1]),
                        handle: StyleHandle(*psa),
                    })
                })
                .collect()
        }
    }

    fn chilled_water_mapping() -> ColorMapping {
        [("chilled water", RgbTriple::new(0.0, 0.0, 1.0))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_two_pumps_share_one_style() {
        let mut host = FakeHost::default();
        host.add_product(1, "Pump:1234567", Some("Chilled Water"), Some(11));
        host.add_product(2, "Pump:7654321", Some("Chilled Water"), Some(12));
        let mapping = chilled_water_mapping();

        let summary = run(&mut host, &mapping, &AssignOptions::default()).unwrap();

        assert_eq!(summary.assigned_items, 2);
        assert_eq!(summary.assigned_objects, 2);
        assert_eq!(summary.no_body, 0);
        assert!(summary.no_color.is_empty());
        assert_eq!(summary.styles_created, 1);
        assert_eq!(host.created_of_kind("IfcPresentationStyleAssignment"), 1);
        assert_eq!(host.created_of_kind("IfcStyledItem"), 2);

        let first = host.styles(host.styled_item(EntityId(11)).unwrap());
        let second = host.styles(host.styled_item(EntityId(12)).unwrap());
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
    }

    #[test]
    fn test_rerun_adds_nothing() {
        let mut host = FakeHost::default();
        host.add_product(1, "Pump:1234567", Some("Chilled Water"), Some(11));
        let mapping = chilled_water_mapping();
        let options = AssignOptions::default();

        let mut driver = AssignmentDriver::new(&mapping, &options);
        driver.run(&mut host).unwrap();
        let created = host.created.len();
        let summary = driver.run(&mut host).unwrap();

        assert_eq!(host.created.len(), created);
        assert_eq!(summary.styles_created, 0);
        assert_eq!(summary.assigned_items, 1);
        let styled = host.styled_item(EntityId(11)).unwrap();
        assert_eq!(host.styles(styled).len(), 1);
    }

    #[test]
    fn test_fresh_driver_reuses_existing_styles() {
        let mut host = FakeHost::default();
        host.add_product(1, "Pump:1234567", Some("Chilled Water"), Some(11));
        let mapping = chilled_water_mapping();
        let options = AssignOptions::default();

        run(&mut host, &mapping, &options).unwrap();
        let created = host.created.len();
        let summary = run(&mut host, &mapping, &options).unwrap();

        assert_eq!(host.created.len(), created);
        assert_eq!(summary.styles_created, 0);
        let styled = host.styled_item(EntityId(11)).unwrap();
        assert_eq!(host.styles(styled).len(), 1);
    }

    #[test]
    fn test_no_body_counts_and_skips() {
        let mut host = FakeHost::default();
        host.add_product(1, "Duct:1234567", Some("Chilled Water"), None);

        let summary = run(&mut host, &chilled_water_mapping(), &AssignOptions::default()).unwrap();

        assert_eq!(summary.no_body, 1);
        assert_eq!(summary.assigned_items, 0);
        assert_eq!(summary.assigned_objects, 0);
        assert_eq!(host.created_of_kind("IfcStyledItem"), 0);
    }

    #[test]
    fn test_non_body_representation_is_ignored() {
        let mut host = FakeHost::default();
        let entity = host.add_product(1, "Duct:1234567", Some("Chilled Water"), None);
        host.representations.insert(
            entity,
            vec![ShapeRepresentation {
                identifier: Some("Axis".to_string()),
                items: vec![EntityId(11)],
            }],
        );

        let summary = run(&mut host, &chilled_water_mapping(), &AssignOptions::default()).unwrap();
        assert_eq!(summary.no_body, 1);
        assert!(host.styled_item(EntityId(11)).is_none());
    }

    #[test]
    fn test_missing_color_reported_once_with_original_spelling() {
        let mut host = FakeHost::default();
        host.add_product(1, "Pipe:1000001", Some(" Hot Water "), Some(11));
        host.add_product(2, "Pipe:1000002", Some(" Hot Water "), Some(12));
        host.add_product(3, "Pipe:1000003", Some("Chilled Water"), Some(13));

        let summary = run(&mut host, &chilled_water_mapping(), &AssignOptions::default()).unwrap();

        assert_eq!(summary.no_color, BTreeSet::from([" Hot Water ".to_string()]));
        assert_eq!(summary.skipped.no_color, 2);
        assert_eq!(summary.assigned_items, 1);
        assert!(host.styled_item(EntityId(11)).is_none());
        assert!(host.styled_item(EntityId(12)).is_none());
    }

    #[test]
    fn test_skip_reasons() {
        let mut host = FakeHost::default();
        host.objects.push(ModelObject {
            label: "Orphan".to_string(),
            entity: None,
        });
        host.add_product(1, "Pump:123456", Some("Chilled Water"), Some(11));
        host.add_product(2, "Pump:1234567", None, Some(12));
        host.add_product(3, "Pump:7654321", Some(""), Some(13));

        let summary = run(&mut host, &chilled_water_mapping(), &AssignOptions::default()).unwrap();

        assert_eq!(summary.skipped.no_entity, 1);
        assert_eq!(summary.skipped.name_mismatch, 1);
        assert_eq!(summary.skipped.no_classification, 2);
        assert_eq!(summary.assigned_items, 0);
        assert!(host.created.is_empty());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut host = FakeHost::default();
        host.add_product(1, "Pump:1234567", Some("  CHILLED water"), Some(11));

        let summary = run(&mut host, &chilled_water_mapping(), &AssignOptions::default()).unwrap();
        assert_eq!(summary.assigned_items, 1);
    }

    #[test]
    fn test_only_first_body_item_is_styled() {
        let mut host = FakeHost::default();
        let entity = host.add_product(1, "Pump:1234567", Some("Chilled Water"), None);
        host.representations.insert(
            entity,
            vec![ShapeRepresentation {
                identifier: Some("Body".to_string()),
                items: vec![EntityId(11), EntityId(12)],
            }],
        );

        let summary = run(&mut host, &chilled_water_mapping(), &AssignOptions::default()).unwrap();

        assert_eq!(summary.assigned_items, 1);
        assert!(host.styled_item(EntityId(11)).is_some());
        assert!(host.styled_item(EntityId(12)).is_none());
    }

    #[test]
    fn test_bind_appends_to_existing_styled_item() {
        let mut host = FakeHost::default();
        let item = EntityId(11);
        let styled = host.create_styled_item(item, vec![EntityId(500)]).unwrap();

        let binding = bind_style(&mut host, item, StyleHandle(EntityId(600))).unwrap();
        assert_eq!(binding, Binding::Appended(styled));
        assert_eq!(host.styles(styled), vec![EntityId(500), EntityId(600)]);

        let binding = bind_style(&mut host, item, StyleHandle(EntityId(600))).unwrap();
        assert_eq!(binding, Binding::AlreadyBound(styled));
        assert_eq!(host.styles(styled).len(), 2);
        assert_eq!(host.created_of_kind("IfcStyledItem"), 1);
    }

    #[test]
    fn test_empty_mapping_aborts_without_mutation() {
        let mut host = FakeHost::default();
        host.add_product(1, "Pump:1234567", Some("Chilled Water"), Some(11));

        let result = run(&mut host, &ColorMapping::new(), &AssignOptions::default());

        assert!(result.is_err());
        assert!(host.created.is_empty());
    }

    #[test]
    fn test_name_filter_can_be_disabled() {
        let mut host = FakeHost::default();
        host.add_product(1, "Pump", Some("Chilled Water"), Some(11));
        let options = AssignOptions {
            name_filter: NameFilter::AcceptAll,
            ..AssignOptions::default()
        };

        let summary = run(&mut host, &chilled_water_mapping(), &options).unwrap();
        assert_eq!(summary.assigned_items, 1);
    }
}
