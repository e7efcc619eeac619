//! Cache keys and handles for shared surface styles.

// Allow intentional type casts for fixed-point rounding
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use serde::Serialize;
use std::fmt;

use super::{EntityId, RgbTriple};
use crate::constants::STYLE_KEY_DECIMALS;

fn scale() -> f64 {
    10f64.powi(STYLE_KEY_DECIMALS)
}

fn to_fixed(value: f64) -> i64 {
    (value * scale()).round() as i64
}

/// Color + transparency rounded to a fixed number of decimals.
///
/// Components are stored as scaled integers so equality and hashing never
/// depend on floating-point comparison. Two requests that round to the same
/// key share one style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleKey {
    r: i64,
    g: i64,
    b: i64,
    transparency: i64,
}

impl StyleKey {
    /// Builds a key by rounding each component.
    #[must_use]
    pub fn new(color: RgbTriple, transparency: f64) -> Self {
        Self {
            r: to_fixed(color.r),
            g: to_fixed(color.g),
            b: to_fixed(color.b),
            transparency: to_fixed(transparency),
        }
    }

    /// The rounded color this key stands for.
    #[must_use]
    pub fn color(&self) -> RgbTriple {
        RgbTriple::new(
            self.r as f64 / scale(),
            self.g as f64 / scale(),
            self.b as f64 / scale(),
        )
    }

    /// The rounded transparency this key stands for.
    #[must_use]
    pub fn transparency(&self) -> f64 {
        self.transparency as f64 / scale()
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.color();
        write!(
            f,
            "({}, {}, {}, {})",
            c.r,
            c.g,
            c.b,
            self.transparency()
        )
    }
}

/// Reference to a style-assignment record owned by the model document.
///
/// Shared by every item styled with the same color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StyleHandle(pub EntityId);

impl StyleHandle {
    /// The document entity behind this handle.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.0
    }
}
