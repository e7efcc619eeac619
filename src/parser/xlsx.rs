//! Minimal `.xlsx` reader for cell text and cell fill colors.
//!
//! Only what the color legend needs is read: the workbook's sheet list and
//! relationships, shared strings, fills and cell formats from the stylesheet,
//! and the `sheetData` of one worksheet. Rows and columns are 1-based.

use roxmltree::{Document, Node};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use thiserror::Error;
use zip::ZipArchive;

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const STYLES_PART: &str = "xl/styles.xml";

/// Legacy indexed palette (indices 0-63) as RGB hex.
const INDEXED_PALETTE: [&str; 64] = [
    "000000", "FFFFFF", "FF0000", "00FF00", "0000FF", "FFFF00", "FF00FF", "00FFFF", // 0-7
    "000000", "FFFFFF", "FF0000", "00FF00", "0000FF", "FFFF00", "FF00FF", "00FFFF", // 8-15
    "800000", "008000", "000080", "808000", "800080", "008080", "C0C0C0", "808080", // 16-23
    "9999FF", "993366", "FFFFCC", "CCFFFF", "660066", "FF8080", "0066CC", "CCCCFF", // 24-31
    "000080", "FF00FF", "FFFF00", "00FFFF", "800080", "800000", "008080", "0000FF", // 32-39
    "00CCFF", "CCFFFF", "CCFFCC", "FFFF99", "99CCFF", "FF99CC", "CC99FF", "FFCC99", // 40-47
    "3366FF", "33CCCC", "99CC00", "FFCC00", "FF9900", "FF6600", "666699", "969696", // 48-55
    "003366", "339966", "003300", "333300", "993300", "993366", "333399", "333333", // 56-63
];

/// Errors raised while reading a workbook package.
#[derive(Debug, Error)]
pub enum XlsxError {
    /// The file is not a readable zip package
    #[error("failed to open workbook package: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// A part could not be read
    #[error("failed to read part {part}: {source}")]
    Io {
        /// Part name inside the package
        part: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// A required part is absent
    #[error("missing part: {0}")]
    MissingPart(String),
    /// A part is not well-formed XML
    #[error("failed to parse XML in {part}: {source}")]
    Xml {
        /// Part name inside the package
        part: String,
        /// Underlying parser error
        #[source]
        source: roxmltree::Error,
    },
    /// No sheet with the requested name
    #[error("worksheet '{name}' not found (available: {})", available.join(", "))]
    SheetNotFound {
        /// Requested sheet name
        name: String,
        /// Sheet names present in the workbook
        available: Vec<String>,
    },
    /// The workbook relationships do not resolve the sheet
    #[error("worksheet '{0}' has no resolvable part")]
    SheetPartUnresolved(String),
}

/// Fill color of a cell as stored in the stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub enum FillColor {
    /// Explicit `AARRGGBB` value (kept verbatim, may be malformed)
    Argb(String),
    /// Legacy palette index
    Indexed(u32),
    /// Theme color index with optional tint
    Theme {
        /// Index into the theme's color scheme
        index: u32,
        /// Lightness adjustment (-1.0 to 1.0)
        tint: Option<f64>,
    },
}

impl FillColor {
    /// Resolves the fill to an `AARRGGBB` string where possible.
    ///
    /// Palette indices resolve to opaque colors; the system foreground and
    /// background indices (64, 65) and theme colors do not resolve.
    #[must_use]
    pub fn to_argb(&self) -> Option<String> {
        match self {
            Self::Argb(argb) => Some(argb.clone()),
            Self::Indexed(index) => INDEXED_PALETTE
                .get(*index as usize)
                .map(|rgb| format!("FF{rgb}")),
            Self::Theme { .. } => None,
        }
    }
}

/// One worksheet cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    /// Cell value rendered as text, `None` for empty cells
    pub value: Option<String>,
    /// Pattern fill foreground color, `None` when unfilled
    pub fill: Option<FillColor>,
}

/// Sparse grid of cells from one worksheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    /// Sheet name as listed in the workbook
    pub name: String,
    cells: BTreeMap<(u32, u32), Cell>,
    max_row: u32,
    max_col: u32,
}

impl Worksheet {
    /// Creates an empty worksheet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Stores a cell at `(row, col)`, growing the sheet bounds.
    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
        self.cells.insert((row, col), cell);
    }

    /// Convenience for tests and fixtures: stores a text cell with an
    /// optional ARGB fill.
    pub fn set_text(&mut self, row: u32, col: u32, text: &str, argb: Option<&str>) {
        self.set_cell(
            row,
            col,
            Cell {
                value: Some(text.to_string()),
                fill: argb.map(|a| FillColor::Argb(a.to_string())),
            },
        );
    }

    /// The cell at `(row, col)`, if present.
    #[must_use]
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Highest row index holding a cell (0 for an empty sheet).
    #[must_use]
    pub const fn max_row(&self) -> u32 {
        self.max_row
    }

    /// Highest column index holding a cell (0 for an empty sheet).
    #[must_use]
    pub const fn max_col(&self) -> u32 {
        self.max_col
    }

    /// Iterates present cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &Cell)> {
        self.cells.iter().map(|(pos, cell)| (*pos, cell))
    }
}

/// Reads one named worksheet from an `.xlsx` file.
pub fn read_worksheet(path: &Path, sheet_name: &str) -> Result<Worksheet, XlsxError> {
    let file = File::open(path).map_err(|source| XlsxError::Io {
        part: path.display().to_string(),
        source,
    })?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    read_worksheet_from_archive(&mut archive, sheet_name)
}

/// Reads one named worksheet from an already opened package.
pub fn read_worksheet_from_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_name: &str,
) -> Result<Worksheet, XlsxError> {
    let sheet_part = resolve_sheet_part(archive, sheet_name)?;
    let shared_strings = match read_part(archive, SHARED_STRINGS_PART) {
        Ok(xml) => parse_shared_strings(&xml)?,
        Err(XlsxError::MissingPart(_)) => Vec::new(),
        Err(err) => return Err(err),
    };
    let styles = match read_part(archive, STYLES_PART) {
        Ok(xml) => parse_styles(&xml)?,
        Err(XlsxError::MissingPart(_)) => CellFills::default(),
        Err(err) => return Err(err),
    };

    let sheet_xml = read_part(archive, &sheet_part)?;
    parse_sheet(&sheet_xml, &sheet_part, sheet_name, &shared_strings, &styles)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, part: &str) -> Result<String, XlsxError> {
    let mut entry = match archive.by_name(part) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(XlsxError::MissingPart(part.to_string()))
        }
        Err(err) => return Err(err.into()),
    };
    let mut xml = String::new();
    entry.read_to_string(&mut xml).map_err(|source| XlsxError::Io {
        part: part.to_string(),
        source,
    })?;
    Ok(xml)
}

fn parse_xml<'a>(xml: &'a str, part: &str) -> Result<Document<'a>, XlsxError> {
    Document::parse(xml).map_err(|source| XlsxError::Xml {
        part: part.to_string(),
        source,
    })
}

fn child<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == local)
}

fn children_by_local<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    local: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == local)
}

fn resolve_sheet_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_name: &str,
) -> Result<String, XlsxError> {
    let workbook_xml = read_part(archive, WORKBOOK_PART)?;
    let workbook = parse_xml(&workbook_xml, WORKBOOK_PART)?;
    let sheets: Vec<Node<'_, '_>> = workbook
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "sheet")
        .collect();
    let sheet = sheets
        .iter()
        .find(|n| n.attribute("name") == Some(sheet_name))
        .ok_or_else(|| XlsxError::SheetNotFound {
            name: sheet_name.to_string(),
            available: sheets
                .iter()
                .filter_map(|n| n.attribute("name").map(str::to_string))
                .collect(),
        })?;
    let rel_id = sheet
        .attribute((REL_NS, "id"))
        .ok_or_else(|| XlsxError::SheetPartUnresolved(sheet_name.to_string()))?;

    let rels_xml = read_part(archive, WORKBOOK_RELS_PART)?;
    let rels = parse_xml(&rels_xml, WORKBOOK_RELS_PART)?;
    let target = rels
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
        .find(|n| n.attribute("Id") == Some(rel_id))
        .and_then(|n| n.attribute("Target"))
        .ok_or_else(|| XlsxError::SheetPartUnresolved(sheet_name.to_string()))?;

    Ok(resolve_target(target))
}

/// Resolves a relationship target relative to the `xl/` folder.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = vec!["xl"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>, XlsxError> {
    let doc = parse_xml(xml, SHARED_STRINGS_PART)?;
    Ok(children_by_local(doc.root_element(), "si")
        .map(rich_text)
        .collect())
}

/// Concatenates the `<t>` runs of a string item, skipping phonetic runs.
fn rich_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "t")
        .filter(|t| {
            !t.ancestors()
                .any(|a| a.is_element() && a.tag_name().name() == "rPh")
        })
        .filter_map(|t| t.text())
        .collect()
}

/// Fill lookup derived from the stylesheet: cell format index -> fill.
#[derive(Debug, Default)]
struct CellFills {
    fills: Vec<Option<FillColor>>,
    xf_fill_ids: Vec<usize>,
}

impl CellFills {
    fn fill_for_style(&self, style_index: usize) -> Option<FillColor> {
        let fill_id = *self.xf_fill_ids.get(style_index)?;
        self.fills.get(fill_id).cloned().flatten()
    }
}

fn parse_styles(xml: &str) -> Result<CellFills, XlsxError> {
    let doc = parse_xml(xml, STYLES_PART)?;
    let root = doc.root_element();

    let fills = child(root, "fills")
        .map(|fills| children_by_local(fills, "fill").map(parse_fill).collect())
        .unwrap_or_default();

    let xf_fill_ids = child(root, "cellXfs")
        .map(|xfs| {
            children_by_local(xfs, "xf")
                .map(|xf| {
                    xf.attribute("fillId")
                        .and_then(|id| id.parse().ok())
                        .unwrap_or(0)
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(CellFills { fills, xf_fill_ids })
}

fn parse_fill(fill: Node<'_, '_>) -> Option<FillColor> {
    let pattern = child(fill, "patternFill")?;
    if pattern.attribute("patternType").unwrap_or("none") == "none" {
        return None;
    }
    parse_color(child(pattern, "fgColor")?)
}

fn parse_color(color: Node<'_, '_>) -> Option<FillColor> {
    if let Some(rgb) = color.attribute("rgb") {
        return Some(FillColor::Argb(rgb.to_string()));
    }
    if let Some(index) = color.attribute("indexed").and_then(|i| i.parse().ok()) {
        return Some(FillColor::Indexed(index));
    }
    if let Some(index) = color.attribute("theme").and_then(|i| i.parse().ok()) {
        let tint = color.attribute("tint").and_then(|t| t.parse().ok());
        return Some(FillColor::Theme { index, tint });
    }
    None
}

fn parse_sheet(
    xml: &str,
    part: &str,
    sheet_name: &str,
    shared_strings: &[String],
    styles: &CellFills,
) -> Result<Worksheet, XlsxError> {
    let doc = parse_xml(xml, part)?;
    let mut sheet = Worksheet::new(sheet_name);

    let Some(sheet_data) = child(doc.root_element(), "sheetData") else {
        return Ok(sheet);
    };

    let mut row_index = 0;
    for row in children_by_local(sheet_data, "row") {
        row_index = row
            .attribute("r")
            .and_then(|r| r.parse().ok())
            .unwrap_or(row_index + 1);

        let mut col_index = 0;
        for c in children_by_local(row, "c") {
            let (row_ref, col_ref) = c
                .attribute("r")
                .and_then(parse_cell_ref)
                .unwrap_or((row_index, col_index + 1));
            col_index = col_ref;

            let fill = c
                .attribute("s")
                .and_then(|s| s.parse().ok())
                .and_then(|s| styles.fill_for_style(s));
            let value = cell_value(c, shared_strings);
            sheet.set_cell(row_ref, col_ref, Cell { value, fill });
        }

        sheet.max_row = sheet.max_row.max(row_index);
    }

    Ok(sheet)
}

fn cell_value(c: Node<'_, '_>, shared_strings: &[String]) -> Option<String> {
    match c.attribute("t") {
        Some("inlineStr") => child(c, "is").map(rich_text),
        Some("s") => {
            let index: usize = child(c, "v")?.text()?.trim().parse().ok()?;
            shared_strings.get(index).cloned()
        }
        Some("b") => child(c, "v")?
            .text()
            .map(|v| if v.trim() == "1" { "TRUE" } else { "FALSE" }.to_string()),
        _ => child(c, "v")?.text().map(str::to_string),
    }
}

/// Column count of a worksheet (`XFD`).
const MAX_COLUMNS: u32 = 16_384;

/// Parses an A1-style reference into 1-based `(row, col)`.
///
/// Columns past `XFD` are rejected.
fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
        if col > MAX_COLUMNS {
            return None;
        }
    }
    let row = digits.parse().ok()?;
    Some((row, col))
}
