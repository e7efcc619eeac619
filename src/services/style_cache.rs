//! Shared surface-style factory.
//!
//! Creates at most one style record per distinct rounded color and
//! transparency for the lifetime of a run.

use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::{debug, info};

use super::host::{ExistingStyle, ModelHost};
use crate::models::{AttributeValue, RgbTriple, StyleHandle, StyleKey};

/// Cache of style handles keyed by rounded color.
///
/// Grows monotonically and never evicts. The handles point at records owned
/// by the document; the cache only remembers which record belongs to which
/// color.
#[derive(Debug, Default)]
pub struct StyleCache {
    styles: HashMap<StyleKey, StyleHandle>,
    created: usize,
}

impl StyleCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the cache with styles already present in the document.
    ///
    /// The first record found for a key wins.
    pub fn prime(&mut self, existing: impl IntoIterator<Item = ExistingStyle>) {
        for style in existing {
            let key = StyleKey::new(style.color, style.transparency);
            self.styles.entry(key).or_insert(style.handle);
        }
    }

    /// Number of distinct styles known to the cache.
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Number of style records this cache created in the document.
    #[must_use]
    pub const fn created(&self) -> usize {
        self.created
    }

    /// Returns `true` if the cache holds no style.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Looks up a previously created style without touching the document.
    #[must_use]
    pub fn get(&self, color: RgbTriple, transparency: f64) -> Option<StyleHandle> {
        self.styles.get(&StyleKey::new(color, transparency)).copied()
    }

    /// Returns the style for `color`, creating it on first request.
    ///
    /// A new style is built as colour -> rendering -> surface style (both
    /// sides) -> presentation style assignment; the assignment is the handle.
    pub fn resolve<H: ModelHost + ?Sized>(
        &mut self,
        host: &mut H,
        color: RgbTriple,
        transparency: f64,
    ) -> Result<StyleHandle> {
        let key = StyleKey::new(color, transparency);
        if let Some(handle) = self.styles.get(&key) {
            debug!(%key, style = %handle.entity(), "Reusing cached style");
            return Ok(*handle);
        }

        let handle = create_style(host, color, transparency)
            .with_context(|| format!("Failed to create style for color {key}"))?;
        info!(%key, style = %handle.entity(), hex = %color.to_hex(), "Created surface style");
        self.styles.insert(key, handle);
        self.created += 1;
        Ok(handle)
    }
}

fn create_style<H: ModelHost + ?Sized>(
    host: &mut H,
    color: RgbTriple,
    transparency: f64,
) -> Result<StyleHandle> {
    let colour = host.create_entity(
        "IfcColourRgb",
        vec![
            AttributeValue::Null,
            AttributeValue::Real(color.r),
            AttributeValue::Real(color.g),
            AttributeValue::Real(color.b),
        ],
    )?;

    // SurfaceColour, Transparency, six optional shading parameters, ReflectanceMethod
    let mut rendering_args = vec![AttributeValue::Ref(colour), AttributeValue::Real(transparency)];
    rendering_args.extend(vec![AttributeValue::Null; 6]);
    rendering_args.push(AttributeValue::enumeration("NOTDEFINED"));
    let rendering = host.create_entity("IfcSurfaceStyleRendering", rendering_args)?;

    let surface = host.create_entity(
        "IfcSurfaceStyle",
        vec![
            AttributeValue::Null,
            AttributeValue::enumeration("BOTH"),
            AttributeValue::refs([rendering]),
        ],
    )?;

    let assignment = host.create_entity(
        "IfcPresentationStyleAssignment",
        vec![AttributeValue::refs([surface])],
    )?;

    Ok(StyleHandle(assignment))
}
