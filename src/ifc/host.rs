//! [`ModelHost`] implementation over an [`IfcDocument`].

use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};

use super::kinds;
use super::IfcDocument;
use crate::models::{AttributeValue, EntityId, PropertySets, PropertyValue, RgbTriple, StyleHandle};
use crate::parser::step::Instance;
use crate::services::host::{ExistingStyle, ModelHost, ModelObject, ShapeRepresentation};

impl IfcDocument {
    /// Spatial decomposition: parent -> children in relationship order.
    fn decomposition(&self) -> HashMap<EntityId, Vec<EntityId>> {
        let mut children: HashMap<EntityId, Vec<EntityId>> = HashMap::new();
        for (_, instance) in self.instances() {
            let (parent, kids) = match instance.kind.as_str() {
                kinds::REL_AGGREGATES => (instance.arg(4), instance.arg(5)),
                kinds::REL_CONTAINED_IN_SPATIAL_STRUCTURE => (instance.arg(5), instance.arg(4)),
                _ => continue,
            };
            if let Some(parent) = parent.as_ref_id() {
                children.entry(parent).or_default().extend(kids.ref_ids());
            }
        }
        children
    }

    fn model_object(&self, id: EntityId) -> ModelObject {
        match self.get(id) {
            Some(instance) => {
                let name = instance
                    .arg(2)
                    .as_str()
                    .map_or_else(|| id.to_string(), str::to_string);
                ModelObject {
                    label: format!("{}/{name}", instance.kind),
                    entity: Some(id),
                }
            }
            None => ModelObject {
                label: id.to_string(),
                entity: None,
            },
        }
    }

    /// Objects of a file without a project: anything shaped like a product.
    fn standalone_products(&self) -> Vec<ModelObject> {
        self.instances()
            .filter(|(_, instance)| looks_like_product(instance))
            .map(|(id, _)| self.model_object(id))
            .collect()
    }

    fn merge_property_set(&self, sets: &mut PropertySets, id: EntityId) {
        let Some(pset) = self.get_kind(id, kinds::PROPERTY_SET) else {
            return;
        };
        let Some(name) = pset.arg(2).as_str() else {
            return;
        };
        let group = sets.entry(name.to_string()).or_default();
        for property in pset.arg(4).ref_ids() {
            if let Some((key, value)) = self.property(property) {
                group.insert(key, value);
            }
        }
    }

    fn property(&self, id: EntityId) -> Option<(String, PropertyValue)> {
        let instance = self.get(id)?;
        let name = instance.arg(0).as_str()?.to_string();
        let value = match instance.kind.as_str() {
            kinds::PROPERTY_SINGLE_VALUE => property_value(instance.arg(2))?,
            kinds::PROPERTY_ENUMERATED_VALUE => {
                let values: Vec<String> = instance
                    .arg(2)
                    .as_list()
                    .iter()
                    .filter_map(property_value)
                    .map(|value| value.to_string())
                    .collect();
                if values.is_empty() {
                    return None;
                }
                PropertyValue::Text(values.join(", "))
            }
            _ => return None,
        };
        Some((name, value))
    }

    /// Decodes `PSA -> surface style -> rendering -> colour` when the
    /// assignment has exactly that single-path shape.
    fn surface_style_chain(&self, assignment: &Instance) -> Option<(RgbTriple, f64)> {
        let surface = self.get_kind(single_ref(assignment.arg(0))?, kinds::SURFACE_STYLE)?;
        if !matches!(surface.arg(1), AttributeValue::Enum(side) if side == "BOTH") {
            return None;
        }
        let rendering = self.get_kind(
            single_ref(surface.arg(2))?,
            kinds::SURFACE_STYLE_RENDERING,
        )?;
        let colour = self.get_kind(rendering.arg(0).as_ref_id()?, kinds::COLOUR_RGB)?;
        let color = RgbTriple::new(
            number(colour.arg(1))?,
            number(colour.arg(2))?,
            number(colour.arg(3))?,
        );
        Some((color, number(rendering.arg(1))?))
    }
}

fn looks_like_product(instance: &Instance) -> bool {
    let kind = instance.kind.as_str();
    instance.arg(0).as_str().is_some()
        && instance.args.len() > 6
        && matches!(instance.arg(6), AttributeValue::Ref(_) | AttributeValue::Null)
        && kind != kinds::PROJECT
        && !kind.starts_with("IFCREL")
        && !kind.ends_with("TYPE")
        && !kind.contains("PROPERTY")
        && !kind.contains("QUANTITY")
}

fn single_ref(value: &AttributeValue) -> Option<EntityId> {
    match value.as_list() {
        [AttributeValue::Ref(id)] => Some(*id),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn number(value: &AttributeValue) -> Option<f64> {
    match value {
        AttributeValue::Real(r) => Some(*r),
        AttributeValue::Integer(i) => Some(*i as f64),
        AttributeValue::Typed(_, inner) => number(inner),
        _ => None,
    }
}

/// Strips the measure type of a nominal value. Unknown logicals and unset
/// values yield `None`.
fn property_value(value: &AttributeValue) -> Option<PropertyValue> {
    match value {
        AttributeValue::Typed(_, inner) => property_value(inner),
        AttributeValue::String(s) => Some(PropertyValue::Text(s.clone())),
        AttributeValue::Integer(i) => Some(PropertyValue::Integer(*i)),
        AttributeValue::Real(r) => Some(PropertyValue::Real(*r)),
        AttributeValue::Enum(e) => match e.as_str() {
            "T" | "TRUE" => Some(PropertyValue::Boolean(true)),
            "F" | "FALSE" => Some(PropertyValue::Boolean(false)),
            "U" | "UNKNOWN" => None,
            other => Some(PropertyValue::Text(other.to_string())),
        },
        _ => None,
    }
}

impl ModelHost for IfcDocument {
    /// Walks the spatial tree from each project depth-first, then appends the
    /// products the tree does not reach (nested, grouped or uncontained) in
    /// id order. Every product appears once.
    fn objects(&self) -> Vec<ModelObject> {
        let projects: Vec<EntityId> = self
            .instances_of(kinds::PROJECT)
            .map(|(id, _)| id)
            .collect();
        if projects.is_empty() {
            return self.standalone_products();
        }

        let children = self.decomposition();
        let mut visited: HashSet<EntityId> = projects.iter().copied().collect();
        let mut objects = Vec::new();
        for project in projects {
            let mut stack: Vec<EntityId> = children
                .get(&project)
                .map(|kids| kids.iter().rev().copied().collect())
                .unwrap_or_default();
            while let Some(id) = stack.pop() {
                if !visited.insert(id) {
                    continue;
                }
                objects.push(self.model_object(id));
                if let Some(kids) = children.get(&id) {
                    stack.extend(kids.iter().rev());
                }
            }
        }

        let detached: Vec<EntityId> = self
            .instances()
            .filter(|(id, instance)| !visited.contains(id) && looks_like_product(instance))
            .map(|(id, _)| id)
            .collect();
        objects.extend(detached.into_iter().map(|id| self.model_object(id)));
        objects
    }

    fn entity_name(&self, entity: EntityId) -> Option<String> {
        self.get(entity)?.arg(2).as_str().map(str::to_string)
    }

    /// Type-level sets first, then occurrence-level sets on top.
    fn properties(&self, entity: EntityId) -> PropertySets {
        let mut sets = PropertySets::new();
        if let Some(ty) = self.type_of(entity).and_then(|id| self.get(id)) {
            for pset in ty.arg(5).ref_ids() {
                self.merge_property_set(&mut sets, pset);
            }
        }
        for &definition in self.property_definitions(entity) {
            self.merge_property_set(&mut sets, definition);
        }
        sets
    }

    fn shape_representations(&self, entity: EntityId) -> Vec<ShapeRepresentation> {
        let Some(shape) = self
            .get(entity)
            .and_then(|product| product.arg(6).as_ref_id())
            .and_then(|id| self.get_kind(id, kinds::PRODUCT_DEFINITION_SHAPE))
        else {
            return Vec::new();
        };
        shape
            .arg(2)
            .ref_ids()
            .into_iter()
            .filter_map(|id| self.get_kind(id, kinds::SHAPE_REPRESENTATION))
            .map(|rep| ShapeRepresentation {
                identifier: rep.arg(1).as_str().map(str::to_string),
                items: rep.arg(3).ref_ids(),
            })
            .collect()
    }

    fn create_entity(&mut self, kind: &str, args: Vec<AttributeValue>) -> Result<EntityId> {
        self.add(kind, args)
    }

    fn styled_item(&self, item: EntityId) -> Option<EntityId> {
        self.styled_items_of(item).first().copied()
    }

    fn styles(&self, styled_item: EntityId) -> Vec<EntityId> {
        self.get(styled_item)
            .map(|instance| instance.arg(1).ref_ids())
            .unwrap_or_default()
    }

    fn set_styles(&mut self, styled_item: EntityId, styles: Vec<EntityId>) -> Result<()> {
        if self.get_kind(styled_item, kinds::STYLED_ITEM).is_none() {
            bail!("{styled_item} is not a styled item");
        }
        self.set_attribute(styled_item, 1, AttributeValue::refs(styles))
    }

    fn existing_styles(&self) -> Vec<ExistingStyle> {
        self.instances_of(kinds::PRESENTATION_STYLE_ASSIGNMENT)
            .filter_map(|(id, assignment)| {
                let (color, transparency) = self.surface_style_chain(assignment)?;
                Some(ExistingStyle {
                    color,
                    transparency,
                    handle: StyleHandle(id),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::host::find_body_item;

    const PLANT: &str = "ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [CoordinationView]'),'2;1');
FILE_NAME('plant.ifc','2024-01-01T00:00:00',(''),(''),'x','x','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('0001',$,'Plant',$,$,$,$,$,$);
#2=IFCBUILDINGSTOREY('0002',$,'Level 1',$,$,$,$,$,.ELEMENT.,0.);
#3=IFCRELAGGREGATES('0003',$,$,$,#1,(#2));
#10=IFCPUMP('0010',$,'Pump:1234567',$,$,$,#11,$,.NOTDEFINED.);
#11=IFCPRODUCTDEFINITIONSHAPE($,$,(#12,#13));
#12=IFCSHAPEREPRESENTATION(#99,'Axis','Curve3D',(#14));
#13=IFCSHAPEREPRESENTATION(#99,'Body','SweptSolid',(#15,#16));
#20=IFCFLOWSEGMENT('0020',$,'Pipe:7654321',$,$,$,$,$);
#21=IFCRELCONTAINEDINSPATIALSTRUCTURE('0021',$,$,$,(#10,#20,#404),#2);
#30=IFCPROPERTYSINGLEVALUE('System Type',$,IFCLABEL('Chilled Water'),$);
#31=IFCPROPERTYSINGLEVALUE('Flow',$,IFCVOLUMETRICFLOWRATEMEASURE(2.5),$);
#32=IFCPROPERTYSET('0032',$,'Mechanical',$,(#30,#31));
#33=IFCRELDEFINESBYPROPERTIES('0033',$,$,$,(#10),#32);
#40=IFCPROPERTYSINGLEVALUE('System Type',$,IFCLABEL('Type Default'),$);
#41=IFCPROPERTYSINGLEVALUE('Material',$,IFCLABEL('Steel'),$);
#42=IFCPROPERTYSET('0042',$,'Mechanical',$,(#40,#41));
#43=IFCPUMPTYPE('0043',$,'Pump Type',$,$,(#42),$,$,$,.CIRCULATOR.);
#44=IFCRELDEFINESBYTYPE('0044',$,$,$,(#10,#20),#43);
#50=IFCPROPERTYENUMERATEDVALUE('Grade',$,(IFCLABEL('A'),IFCLABEL('B')),$);
#51=IFCPROPERTYSINGLEVALUE('Insulated',$,IFCBOOLEAN(.T.),$);
#52=IFCPROPERTYSINGLEVALUE('Checked',$,IFCLOGICAL(.U.),$);
#53=IFCPROPERTYSET('0053',$,'Pset_Extra',$,(#50,#51,#52));
#54=IFCELEMENTQUANTITY('0054',$,'Qto',$,$,());
#55=IFCRELDEFINESBYPROPERTIES('0055',$,$,$,(#20),(#53,#54));
#60=IFCCOLOURRGB($,0.,0.,1.);
#61=IFCSURFACESTYLERENDERING(#60,0.,$,$,$,$,$,$,.NOTDEFINED.);
#62=IFCSURFACESTYLE($,.BOTH.,(#61));
#63=IFCPRESENTATIONSTYLEASSIGNMENT((#62));
#64=IFCSTYLEDITEM(#15,(#63),$);
#65=IFCPRESENTATIONSTYLEASSIGNMENT((#62,#62));
ENDSEC;
END-ISO-10303-21;
";

    fn plant() -> IfcDocument {
        IfcDocument::parse(PLANT).unwrap()
    }

    #[test]
    fn test_objects_follow_spatial_tree() {
        let objects = plant().objects();
        let entities: Vec<_> = objects.iter().map(|o| o.entity).collect();
        assert_eq!(
            entities,
            vec![
                Some(EntityId(2)),
                Some(EntityId(10)),
                Some(EntityId(20)),
                None,
            ]
        );
        assert_eq!(objects[1].label, "IFCPUMP/Pump:1234567");
        assert_eq!(objects[3].label, "#404");
    }

    #[test]
    fn test_objects_outside_spatial_tree_follow_in_id_order() {
        let text = PLANT.replace(
            "ENDSEC;\nEND-ISO-10303-21;",
            "#70=IFCPIPESEGMENT('0070',$,'Pipe:7654000',$,$,$,$,$,.RIGIDSEGMENT.);\n\
             #71=IFCRELNESTS('0071',$,$,$,#10,(#70));\n\
             ENDSEC;\nEND-ISO-10303-21;",
        );
        let doc = IfcDocument::parse(&text).unwrap();
        let entities: Vec<_> = doc.objects().iter().map(|o| o.entity).collect();
        assert_eq!(
            entities,
            vec![
                Some(EntityId(2)),
                Some(EntityId(10)),
                Some(EntityId(20)),
                None,
                Some(EntityId(70)),
            ]
        );
    }

    #[test]
    fn test_objects_without_project() {
        let text = PLANT.replace("#1=IFCPROJECT('0001',$,'Plant',$,$,$,$,$,$);\n", "");
        let doc = IfcDocument::parse(&text).unwrap();
        let entities: Vec<_> = doc.objects().into_iter().filter_map(|o| o.entity).collect();
        assert_eq!(entities, vec![EntityId(2), EntityId(10), EntityId(20)]);
    }

    #[test]
    fn test_occurrence_properties_override_type() {
        let props = plant().properties(EntityId(10));
        let mechanical = &props["Mechanical"];
        assert_eq!(
            mechanical["System Type"],
            PropertyValue::Text("Chilled Water".to_string())
        );
        assert_eq!(mechanical["Material"], PropertyValue::Text("Steel".to_string()));
        assert_eq!(mechanical["Flow"], PropertyValue::Real(2.5));
    }

    #[test]
    fn test_type_properties_and_value_forms() {
        let props = plant().properties(EntityId(20));
        assert_eq!(
            props["Mechanical"]["System Type"],
            PropertyValue::Text("Type Default".to_string())
        );
        let extra = &props["Pset_Extra"];
        assert_eq!(extra["Grade"], PropertyValue::Text("A, B".to_string()));
        assert_eq!(extra["Insulated"], PropertyValue::Boolean(true));
        assert!(!extra.contains_key("Checked"));
        assert!(!props.contains_key("Qto"));
    }

    #[test]
    fn test_body_item_lookup() {
        let doc = plant();
        let reps = doc.shape_representations(EntityId(10));
        assert_eq!(reps.len(), 2);
        assert_eq!(reps[0].identifier.as_deref(), Some("Axis"));
        assert_eq!(find_body_item(&doc, EntityId(10), "Body"), Some(EntityId(15)));
        assert_eq!(find_body_item(&doc, EntityId(20), "Body"), None);
    }

    #[test]
    fn test_only_shape_representations_are_listed() {
        let text = PLANT.replace(
            "#12=IFCSHAPEREPRESENTATION(#99,'Axis'",
            "#12=IFCTOPOLOGYREPRESENTATION(#99,'Axis'",
        );
        let doc = IfcDocument::parse(&text).unwrap();
        let reps = doc.shape_representations(EntityId(10));
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].identifier.as_deref(), Some("Body"));
    }

    #[test]
    fn test_styled_item_lookup_and_update() {
        let mut doc = plant();
        assert_eq!(doc.entity_name(EntityId(10)).as_deref(), Some("Pump:1234567"));
        assert_eq!(doc.styled_item(EntityId(15)), Some(EntityId(64)));
        assert_eq!(doc.styled_item(EntityId(16)), None);
        assert_eq!(doc.styles(EntityId(64)), vec![EntityId(63)]);

        doc.set_styles(EntityId(64), vec![EntityId(63), EntityId(65)])
            .unwrap();
        assert_eq!(doc.styles(EntityId(64)), vec![EntityId(63), EntityId(65)]);
        assert!(doc.set_styles(EntityId(63), Vec::new()).is_err());

        let created = doc.create_styled_item(EntityId(16), vec![EntityId(63)]).unwrap();
        assert_eq!(created, EntityId(66));
        assert_eq!(doc.styled_item(EntityId(16)), Some(created));
    }

    #[test]
    fn test_existing_styles_recognizes_single_chain() {
        let styles = plant().existing_styles();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].handle, StyleHandle(EntityId(63)));
        assert_eq!(styles[0].color, RgbTriple::new(0.0, 0.0, 1.0));
        assert!(styles[0].transparency.abs() < f64::EPSILON);
    }
}
