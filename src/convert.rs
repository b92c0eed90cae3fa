//! Workbook to PDF conversion pipeline

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{ConvertError, ConvertResult};
use crate::pdf::PdfSink;
use crate::types::{
    CellData, ConvertOptions, ConvertSummary, DocumentSink, SheetGrid, SpreadsheetSource,
    TableRow, TableSpec,
};
use crate::xlsx::XlsxSource;

/// Totals accumulated while feeding tables to a sink
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub sheets: usize,
    pub rows: usize,
    pub cells: usize,
}

/// Turns sheets into tables and feeds them to a document sink
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    #[must_use]
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Lay one sheet out as a table, widths converted to points.
    ///
    /// Every row is padded or truncated to the sheet column count, padded
    /// cells read blank at the sheet default font. A sheet without a column
    /// count becomes an empty table, which renders as a blank page.
    pub fn prepare_table(&self, grid: &SheetGrid) -> TableSpec {
        let mut table = TableSpec::new(grid.name.as_str());

        let Some(count) = grid.column_count else {
            warn!(
                "Sheet '{}' has no scannable column count, leaving its page blank",
                grid.name
            );
            return table;
        };

        table.column_widths_pt = grid
            .column_widths_px
            .iter()
            .map(|px| px * self.options.pixel_to_point)
            .collect();

        for row in &grid.rows {
            debug!(
                "Row {}: {}pt = {}cm",
                row.index + 1,
                row.height_pt,
                row.height_pt * self.options.point_to_cm
            );
            let cells = (0..count)
                .map(|column| {
                    row.cells
                        .get(column)
                        .cloned()
                        .unwrap_or_else(|| CellData::new("", grid.default_font_size))
                })
                .collect();
            table.rows.push(TableRow {
                height_pt: row.height_pt,
                cells,
            });
        }
        table
    }

    /// Convert every sheet the source yields, one table per sheet
    pub fn run<S, D>(&self, source: &mut S, sink: &mut D) -> ConvertResult<RunStats>
    where
        S: SpreadsheetSource,
        D: DocumentSink,
    {
        let mut stats = RunStats::default();
        for grid in source.sheets()? {
            let table = self.prepare_table(&grid);
            stats.sheets += 1;
            stats.rows += table.rows.len();
            stats.cells += table.rows.iter().map(|row| row.cells.len()).sum::<usize>();
            sink.write_table(&table)?;
        }
        Ok(stats)
    }
}

/// Convert a workbook file to a PDF file
pub fn convert_file<P, Q>(
    input: P,
    output: Q,
    options: &ConvertOptions,
) -> ConvertResult<ConvertSummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let input = input.as_ref();
    let output = output.as_ref();
    info!(
        "Converting {} to {}",
        input.display(),
        output.display()
    );

    let mut source = XlsxSource::open(input)?;
    let mut sink = PdfSink::new();
    let converter = Converter::new(*options);
    let stats = converter.run(&mut source, &mut sink)?;
    let pages = sink.page_count();

    let bytes = sink.finish()?;
    write_output(output, &bytes)?;

    info!(
        "Wrote {} pages to {}",
        pages,
        output.display()
    );
    Ok(ConvertSummary {
        sheets: stats.sheets,
        rows: stats.rows,
        cells: stats.cells,
        pages,
        output: output.to_path_buf(),
    })
}

/// Write document bytes, creating missing parent directories first
pub fn write_output(path: &Path, bytes: &[u8]) -> ConvertResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| ConvertError::OutputCreation {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
    }
    fs::write(path, bytes).map_err(|e| ConvertError::OutputCreation {
        path: path.to_path_buf(),
        source: e,
    })
}
