//! Mapping loader: builds a [`ColorMapping`] from a spreadsheet color legend.
//!
//! The legend is located by the literal header cell `Color`. Names are read
//! from the column to its left and colors from the header column's cell
//! fills, starting on the row below the header.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

use crate::constants::COLOR_HEADER;
use crate::models::{ColorMapping, RgbTriple};
use crate::parser::xlsx::{self, FillColor, Worksheet};

/// Position of the legend's header cell (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendHeader {
    /// Row holding the `Color` header
    pub row: u32,
    /// Column holding the `Color` header (the color column)
    pub col: u32,
}

impl LegendHeader {
    /// Column holding the classification names.
    #[must_use]
    pub const fn name_col(&self) -> u32 {
        self.col - 1
    }

    /// First row of legend data.
    #[must_use]
    pub const fn first_data_row(&self) -> u32 {
        self.row + 1
    }
}

/// Loads the color mapping from the named sheet of an `.xlsx` file.
///
/// # Errors
///
/// Fails if the workbook or sheet cannot be read, or if a legend row carries
/// a malformed fill color.
pub fn load_color_mapping(path: &Path, sheet: &str) -> Result<ColorMapping> {
    let worksheet = xlsx::read_worksheet(path, sheet)
        .with_context(|| format!("Failed to read sheet '{sheet}' from {}", path.display()))?;
    mapping_from_worksheet(&worksheet)
}

/// Scans rows top-to-bottom, left-to-right for the `Color` header cell.
#[must_use]
pub fn find_legend_header(sheet: &Worksheet) -> Option<LegendHeader> {
    sheet
        .cells()
        .find(|(_, cell)| cell.value.as_deref() == Some(COLOR_HEADER))
        .map(|((row, col), _)| LegendHeader { row, col })
}

/// Builds the mapping from an already parsed worksheet.
///
/// A missing header yields an empty mapping with a warning. Rows with an
/// empty name, no fill, or the "no fill" sentinel are skipped; later rows
/// overwrite earlier rows with the same normalized name.
pub fn mapping_from_worksheet(sheet: &Worksheet) -> Result<ColorMapping> {
    let mut mapping = ColorMapping::new();

    let Some(header) = find_legend_header(sheet) else {
        warn!(sheet = %sheet.name, "'{COLOR_HEADER}' header not found");
        return Ok(mapping);
    };
    if header.col == 1 {
        warn!(sheet = %sheet.name, "'{COLOR_HEADER}' header is in the first column; no name column");
        return Ok(mapping);
    }
    debug!(row = header.row, col = header.col, "Found legend header");

    for row in header.first_data_row()..=sheet.max_row() {
        let name = sheet
            .cell(row, header.name_col())
            .and_then(|cell| cell.value.as_deref())
            .unwrap_or_default()
            .trim();
        if name.is_empty() {
            continue;
        }

        let Some(fill) = sheet.cell(row, header.col).and_then(|cell| cell.fill.as_ref()) else {
            continue;
        };
        let Some(argb) = fill.to_argb() else {
            if let FillColor::Theme { index, .. } = fill {
                warn!(row, name, theme = index, "Skipping theme-colored legend entry");
            }
            continue;
        };
        if RgbTriple::is_unset_argb(&argb) {
            continue;
        }

        let color = RgbTriple::from_argb_hex(&argb)
            .with_context(|| format!("Malformed fill color on row {row} ('{name}')"))?;
        mapping.insert(name, color);
    }

    Ok(mapping)
}
