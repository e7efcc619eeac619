//! Unit-interval RGB colors and ARGB hex decoding.

// Allow intentional type casts for color math
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// ARGB value spreadsheets use for "no explicit fill".
///
/// A zero alpha channel with zero color reads as black, but the cell is
/// really uncolored, so rows carrying this value are never decoded.
pub const UNSET_ARGB: &str = "00000000";

/// RGB color with each channel in the unit interval `[0, 1]`.
///
/// This is the representation IFC colour records use (`IfcColourRgb`), so
/// values are kept as `f64` rather than bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbTriple {
    /// Red channel (0.0-1.0)
    pub r: f64,
    /// Green channel (0.0-1.0)
    pub g: f64,
    /// Blue channel (0.0-1.0)
    pub b: f64,
}

impl RgbTriple {
    /// Creates a new `RgbTriple` from individual channel values.
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Creates an `RgbTriple` from byte channels (0-255 each).
    #[must_use]
    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
        }
    }

    /// Decodes an alpha-red-green-blue hex string into an `RgbTriple`.
    ///
    /// Supports formats: "#AARRGGBB", "AARRGGBB" (case-insensitive). The alpha
    /// channel is validated but dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use ifc_colorize::models::RgbTriple;
    ///
    /// let blue = RgbTriple::from_argb_hex("#FF0000FF").unwrap();
    /// assert_eq!(blue, RgbTriple::new(0.0, 0.0, 1.0));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error unless the string holds exactly 8 hex digits.
    pub fn from_argb_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);

        if hex.len() != 8 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            anyhow::bail!("Invalid argb hex string '{hex}'. Expected 8 hex digits (AARRGGBB)");
        }

        let r = u8::from_str_radix(&hex[2..4], 16)
            .context(format!("Invalid red channel in argb color '{hex}'"))?;
        let g = u8::from_str_radix(&hex[4..6], 16)
            .context(format!("Invalid green channel in argb color '{hex}'"))?;
        let b = u8::from_str_radix(&hex[6..8], 16)
            .context(format!("Invalid blue channel in argb color '{hex}'"))?;

        Ok(Self::from_bytes(r, g, b))
    }

    /// Returns `true` when `hex` is the "no fill" sentinel rather than a color.
    #[must_use]
    pub fn is_unset_argb(hex: &str) -> bool {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        hex.is_empty() || hex == UNSET_ARGB
    }

    /// Converts the color to a hex string in the format "#RRGGBB" (uppercase).
    ///
    /// # Examples
    ///
    /// ```
    /// use ifc_colorize::models::RgbTriple;
    ///
    /// assert_eq!(RgbTriple::new(1.0, 0.0, 0.5).to_hex(), "#FF0080");
    /// ```
    #[must_use]
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// Converts the channels back to bytes, clamping out-of-range values.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 3] {
        let byte = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        [byte(self.r), byte(self.g), byte(self.b)]
    }
}

impl fmt::Display for RgbTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6}, {:.6})", self.r, self.g, self.b)
    }
}
