//! Worksheet part parsing for geometry the value reader does not expose

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ConvertResult;

/// Displayed column width in character units when a sheet defines none
pub const DEFAULT_COL_WIDTH_CHARS: f64 = 8.43;

/// Row height in points when a sheet defines none
pub const DEFAULT_ROW_HEIGHT_PT: f64 = 15.0;

/// Maximum digit width in pixels for the standard font at 96 dpi
const CHAR_WIDTH_PX: f64 = 7.0;

/// Horizontal padding pixels around a column of characters
const CELL_PADDING_PX: f64 = 5.0;

/// A `<col>` entry covering an inclusive zero-based column range
#[derive(Debug, Clone, PartialEq)]
pub struct ColRange {
    pub first: u32,
    pub last: u32,
    pub width_chars: f64,
}

/// A stored cell reference with its optional style index
#[derive(Debug, Clone, PartialEq)]
pub struct CellRef {
    pub column: u32,
    pub style: Option<usize>,
}

/// A `<row>` element as stored, including rows that carry no cells
#[derive(Debug, Clone, PartialEq)]
pub struct RowGeometry {
    pub index: u32,
    pub height_pt: Option<f64>,
    pub cells: Vec<CellRef>,
}

/// Geometry of one worksheet: column widths, row heights, stored cells
#[derive(Debug)]
pub struct SheetGeometry {
    /// `defaultColWidth` in stored character units, absent in most files
    pub default_col_width_chars: Option<f64>,
    pub default_row_height_pt: f64,
    pub col_ranges: Vec<ColRange>,
    pub rows: Vec<RowGeometry>,
}

impl Default for SheetGeometry {
    fn default() -> Self {
        Self {
            default_col_width_chars: None,
            default_row_height_pt: DEFAULT_ROW_HEIGHT_PT,
            col_ranges: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl SheetGeometry {
    /// Parse one worksheet XML part
    pub fn parse<R: BufRead>(src: R) -> ConvertResult<Self> {
        let mut reader = Reader::from_reader(src);
        reader.config_mut().trim_text(true);

        let mut geometry = SheetGeometry::default();
        let mut current_row: Option<RowGeometry> = None;
        // Fallback positions for writers that omit r attributes
        let mut next_row_index = 0u32;
        let mut next_col_index = 0u32;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                    b"sheetFormatPr" => {
                        if let Some(width) = attr_f64(&e, b"defaultColWidth") {
                            geometry.default_col_width_chars = Some(width);
                        }
                        if let Some(height) = attr_f64(&e, b"defaultRowHeight") {
                            geometry.default_row_height_pt = height;
                        }
                    }
                    b"col" => {
                        if let Some(range) = parse_col(&e) {
                            geometry.col_ranges.push(range);
                        }
                    }
                    b"row" => {
                        // Self-closing rows get no End event, flush here
                        if let Some(done) = current_row.take() {
                            geometry.rows.push(done);
                        }
                        let row = parse_row(&e, next_row_index);
                        next_row_index = row.index + 1;
                        next_col_index = 0;
                        current_row = Some(row);
                    }
                    b"c" => {
                        let cell = parse_cell(&e, next_col_index);
                        next_col_index = cell.column + 1;
                        if let Some(row) = current_row.as_mut() {
                            row.cells.push(cell);
                        }
                    }
                    _ => {}
                },
                Event::End(e) => {
                    if e.name().as_ref() == b"row" {
                        if let Some(done) = current_row.take() {
                            geometry.rows.push(done);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        if let Some(done) = current_row.take() {
            geometry.rows.push(done);
        }

        Ok(geometry)
    }

    /// Width in pixels for a zero-based column index.
    ///
    /// Stored widths (`<col>` entries and `defaultColWidth`) carry the cell
    /// padding baked in, the built-in default is a displayed character width.
    pub fn column_width_px(&self, column: u32) -> f64 {
        for range in &self.col_ranges {
            if column >= range.first && column <= range.last {
                return stored_width_px(range.width_chars);
            }
        }
        match self.default_col_width_chars {
            Some(chars) => stored_width_px(chars),
            None => display_width_px(DEFAULT_COL_WIDTH_CHARS),
        }
    }

    /// Height in points for a stored row, default when the row sets none
    pub fn row_height_pt(&self, row: &RowGeometry) -> f64 {
        row.height_pt.unwrap_or(self.default_row_height_pt)
    }
}

/// Pixels from a stored width, inverting `trunc(px / MDW * 256) / 256`
fn stored_width_px(chars: f64) -> f64 {
    ((256.0 * chars + (128.0 / CHAR_WIDTH_PX).floor()) / 256.0 * CHAR_WIDTH_PX).floor()
}

/// Pixels from a displayed character width, padding added
fn display_width_px(chars: f64) -> f64 {
    (chars * CHAR_WIDTH_PX + 0.5).floor() + CELL_PADDING_PX
}

fn attr_f64(e: &BytesStart<'_>, key: &[u8]) -> Option<f64> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            if let Ok(value) = attr.unescape_value() {
                return value.parse::<f64>().ok();
            }
        }
    }
    None
}

fn parse_col(e: &BytesStart<'_>) -> Option<ColRange> {
    let mut min = None;
    let mut max = None;
    let mut width = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"min" => min = attr.unescape_value().ok().and_then(|v| v.parse::<u32>().ok()),
            b"max" => max = attr.unescape_value().ok().and_then(|v| v.parse::<u32>().ok()),
            b"width" => width = attr.unescape_value().ok().and_then(|v| v.parse::<f64>().ok()),
            _ => {}
        }
    }
    // min and max are one-based in the file
    Some(ColRange {
        first: min?.saturating_sub(1),
        last: max?.saturating_sub(1),
        width_chars: width?,
    })
}

fn parse_row(e: &BytesStart<'_>, fallback_index: u32) -> RowGeometry {
    let mut index = fallback_index;
    let mut height = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                if let Some(r) = attr.unescape_value().ok().and_then(|v| v.parse::<u32>().ok()) {
                    index = r.saturating_sub(1);
                }
            }
            b"ht" => height = attr.unescape_value().ok().and_then(|v| v.parse::<f64>().ok()),
            _ => {}
        }
    }
    RowGeometry {
        index,
        height_pt: height,
        cells: Vec::new(),
    }
}

fn parse_cell(e: &BytesStart<'_>, fallback_column: u32) -> CellRef {
    let mut column = fallback_column;
    let mut style = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                if let Some(parsed) = attr
                    .unescape_value()
                    .ok()
                    .and_then(|v| parse_column_letters(&v))
                {
                    column = parsed;
                }
            }
            b"s" => style = attr.unescape_value().ok().and_then(|v| v.parse::<usize>().ok()),
            _ => {}
        }
    }
    CellRef { column, style }
}

/// Zero-based column index from a reference like `B7` or `AA12`
///
/// References without letters, or with too many to fit a `u32`, yield
/// `None` and the caller keeps its sequential position.
fn parse_column_letters(cell_ref: &str) -> Option<u32> {
    let mut column = 0u32;
    let mut letters = 0;
    for ch in cell_ref.chars() {
        if !ch.is_ascii_alphabetic() {
            break;
        }
        let value = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        column = column.checked_mul(26)?.checked_add(value)?;
        letters += 1;
    }
    if letters == 0 {
        return None;
    }
    Some(column - 1)
}
