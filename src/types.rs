use std::path::PathBuf;

use crate::error::ConvertResult;

//==============================================================================
// Conversion Options
//==============================================================================

/// Unit conversion factors applied during rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertOptions {
    /// Column widths arrive in pixels and leave in points
    pub pixel_to_point: f64,
    /// Row heights are reported in centimetres for diagnostics only
    pub point_to_cm: f64,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvertOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pixel_to_point: 0.75,
            point_to_cm: 0.0352778,
        }
    }
}

//==============================================================================
// Workbook Data Model
//==============================================================================

/// A cell carrying its text and the font size of its cell style
#[derive(Debug, Clone, PartialEq)]
pub struct CellData {
    pub text: String,
    pub font_size: f64,
}

impl CellData {
    pub fn new(text: impl Into<String>, font_size: f64) -> Self {
        Self {
            text: text.into(),
            font_size,
        }
    }
}

/// A row that is physically present in the worksheet
#[derive(Debug, Clone)]
pub struct RowData {
    /// Zero-based row index within the sheet
    pub index: u32,
    pub height_pt: f64,
    pub cells: Vec<CellData>,
}

impl RowData {
    pub fn new(index: u32, height_pt: f64) -> Self {
        Self {
            index,
            height_pt,
            cells: Vec::new(),
        }
    }
}

/// One worksheet with its geometry and cell contents
#[derive(Debug, Clone)]
pub struct SheetGrid {
    pub name: String,
    /// Column count derived from the row scan, None when no row reports one
    pub column_count: Option<usize>,
    /// Per-column widths in pixels, indexed from column zero
    pub column_widths_px: Vec<f64>,
    pub rows: Vec<RowData>,
    /// Font size used for cells without an explicit style
    pub default_font_size: f64,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_count: None,
            column_widths_px: Vec::new(),
            rows: Vec::new(),
            default_font_size: 11.0,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(|row| row.cells.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column count from the first row that stores any cells.
    ///
    /// The scan walks rows in index order and stops before the last stored
    /// row, except when the sheet holds a single row, which is scanned.
    /// Rows without cells are skipped, None means no row reported a count.
    pub fn derive_column_count(&self) -> Option<usize> {
        let first_index = self.rows.first()?.index;
        let last_index = self.rows.last()?.index;
        let scan_end = if first_index == last_index {
            last_index + 1
        } else {
            last_index
        };
        self.rows
            .iter()
            .take_while(|row| row.index < scan_end)
            .find(|row| !row.cells.is_empty())
            .map(|row| row.cells.len())
    }
}

//==============================================================================
// Prepared Table Model
//==============================================================================

/// A row ready for rendering, heights still in points
#[derive(Debug, Clone)]
pub struct TableRow {
    pub height_pt: f64,
    pub cells: Vec<CellData>,
}

/// A sheet laid out as a table, widths already converted to points
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub sheet_name: String,
    pub column_widths_pt: Vec<f64>,
    pub rows: Vec<TableRow>,
}

impl TableSpec {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            column_widths_pt: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.column_widths_pt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//==============================================================================
// Conversion Summary
//==============================================================================

/// Totals reported after a successful conversion
#[derive(Debug, Clone)]
pub struct ConvertSummary {
    pub sheets: usize,
    pub rows: usize,
    pub cells: usize,
    pub pages: usize,
    pub output: PathBuf,
}

//==============================================================================
// Capability Traits
//==============================================================================

/// Anything that can produce worksheets with geometry and cell text
pub trait SpreadsheetSource {
    fn sheets(&mut self) -> ConvertResult<Vec<SheetGrid>>;
}

/// Anything that can accept prepared tables and emit a document
pub trait DocumentSink {
    /// Write one table, starting a fresh page for every table after the first
    fn write_table(&mut self, table: &TableSpec) -> ConvertResult<()>;

    /// Consume the sink and return the finished document bytes
    fn finish(self) -> ConvertResult<Vec<u8>>
    where
        Self: Sized;
}
