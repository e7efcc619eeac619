//! In-memory IFC model backed by an IFC-SPF file.
//!
//! [`IfcDocument`] stores the instances of a parsed file and implements
//! [`ModelHost`](crate::services::host::ModelHost) over them.

pub mod document;
pub mod host;

pub use document::IfcDocument;

/// Uppercase entity type names used when navigating a model.
#[allow(missing_docs)]
pub mod kinds {
    pub const PROJECT: &str = "IFCPROJECT";
    pub const REL_AGGREGATES: &str = "IFCRELAGGREGATES";
    pub const REL_CONTAINED_IN_SPATIAL_STRUCTURE: &str = "IFCRELCONTAINEDINSPATIALSTRUCTURE";
    pub const REL_DEFINES_BY_PROPERTIES: &str = "IFCRELDEFINESBYPROPERTIES";
    pub const REL_DEFINES_BY_TYPE: &str = "IFCRELDEFINESBYTYPE";
    pub const PROPERTY_SET: &str = "IFCPROPERTYSET";
    pub const PROPERTY_SINGLE_VALUE: &str = "IFCPROPERTYSINGLEVALUE";
    pub const PROPERTY_ENUMERATED_VALUE: &str = "IFCPROPERTYENUMERATEDVALUE";
    pub const PRODUCT_DEFINITION_SHAPE: &str = "IFCPRODUCTDEFINITIONSHAPE";
    pub const SHAPE_REPRESENTATION: &str = "IFCSHAPEREPRESENTATION";
    pub const STYLED_ITEM: &str = "IFCSTYLEDITEM";
    pub const PRESENTATION_STYLE_ASSIGNMENT: &str = "IFCPRESENTATIONSTYLEASSIGNMENT";
    pub const SURFACE_STYLE: &str = "IFCSURFACESTYLE";
    pub const SURFACE_STYLE_RENDERING: &str = "IFCSURFACESTYLERENDERING";
    pub const COLOUR_RGB: &str = "IFCCOLOURRGB";
}
