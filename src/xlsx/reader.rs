//! Workbook reading, merging cell values with worksheet geometry

use std::fs::File;
use std::io::{BufReader, Read as _};
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{NaiveDateTime, NaiveTime};
use quick_xml::events::Event;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{ConvertError, ConvertResult};
use crate::types::{CellData, RowData, SheetGrid, SpreadsheetSource};
use crate::xlsx::sheet_xml::SheetGeometry;
use crate::xlsx::styles::StyleTable;

/// Reads workbooks through two passes over the same file: the value reader
/// for cell contents and the raw archive for geometry and styles.
pub struct XlsxSource {
    workbook: Xlsx<BufReader<File>>,
    archive: ZipArchive<File>,
    styles: StyleTable,
    /// Sheet name and worksheet part path, in workbook order
    sheet_parts: Vec<(String, String)>,
}

impl XlsxSource {
    /// Open a workbook for conversion
    pub fn open<P: AsRef<Path>>(path: P) -> ConvertResult<Self> {
        let path = path.as_ref();
        debug!("Opening workbook: {}", path.display());

        let workbook: Xlsx<_> = open_workbook(path)?;
        let mut archive = ZipArchive::new(File::open(path)?)?;

        let styles = match archive.by_name("xl/styles.xml") {
            Ok(part) => StyleTable::parse(BufReader::new(part))?,
            Err(zip::result::ZipError::FileNotFound) => StyleTable::default(),
            Err(e) => return Err(e.into()),
        };

        let sheet_parts = resolve_sheet_parts(&mut archive)?;

        Ok(Self {
            workbook,
            archive,
            styles,
            sheet_parts,
        })
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheet_parts
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn read_sheet(&mut self, name: &str, part: &str) -> ConvertResult<SheetGrid> {
        let part_data = read_part(&mut self.archive, part)?;
        let geometry = SheetGeometry::parse(&part_data[..])?;
        let range = self.workbook.worksheet_range(name)?;

        let mut grid = SheetGrid::new(name);
        grid.default_font_size = self.styles.default_font_size();

        for row_geom in &geometry.rows {
            let mut row = RowData::new(row_geom.index, geometry.row_height_pt(row_geom));
            // Stored cells define the row extent, gaps between them read blank
            if let Some(last_column) = row_geom.cells.iter().map(|c| c.column).max() {
                for column in 0..=last_column {
                    let stored = row_geom.cells.iter().find(|c| c.column == column);
                    let font_size = stored
                        .and_then(|c| c.style)
                        .map(|s| self.styles.font_size_for_style(s))
                        .unwrap_or(grid.default_font_size);
                    let text = match stored {
                        Some(_) => range
                            .get_value((row_geom.index, column))
                            .map(cell_text)
                            .unwrap_or_default(),
                        None => String::new(),
                    };
                    row.cells.push(CellData::new(text, font_size));
                }
            }
            grid.rows.push(row);
        }
        grid.rows.sort_by_key(|row| row.index);

        grid.column_count = grid.derive_column_count();
        if let Some(count) = grid.column_count {
            grid.column_widths_px = (0..count)
                .map(|col| geometry.column_width_px(col as u32))
                .collect();
        }

        Ok(grid)
    }
}

impl SpreadsheetSource for XlsxSource {
    fn sheets(&mut self) -> ConvertResult<Vec<SheetGrid>> {
        let parts = self.sheet_parts.clone();
        let mut grids = Vec::with_capacity(parts.len());
        for (name, part) in &parts {
            grids.push(self.read_sheet(name, part)?);
        }
        Ok(grids)
    }
}

/// Map workbook sheet entries to their worksheet part paths via the rels part
fn resolve_sheet_parts(archive: &mut ZipArchive<File>) -> ConvertResult<Vec<(String, String)>> {
    let workbook_part = read_part(archive, "xl/workbook.xml")?;
    let sheets = parse_workbook_sheets(&workbook_part[..])?;
    let rels_part = read_part(archive, "xl/_rels/workbook.xml.rels")?;
    let rels = parse_relationships(&rels_part[..])?;

    let mut parts = Vec::with_capacity(sheets.len());
    for (name, rid) in sheets {
        let target = rels
            .iter()
            .find(|(id, _)| *id == rid)
            .map(|(_, target)| target.clone())
            .ok_or_else(|| ConvertError::MissingPart(format!("worksheet part for '{name}'")))?;
        // Relative targets resolve against the workbook part directory
        let part = match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("xl/{target}"),
        };
        parts.push((name, part));
    }
    Ok(parts)
}

/// Read a required archive part into memory
fn read_part(archive: &mut ZipArchive<File>, name: &str) -> ConvertResult<Vec<u8>> {
    match archive.by_name(name) {
        Ok(mut part) => {
            let mut data = Vec::new();
            part.read_to_end(&mut data)?;
            Ok(data)
        }
        Err(zip::result::ZipError::FileNotFound) => {
            Err(ConvertError::MissingPart(name.to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Sheet names and relationship ids from xl/workbook.xml, in document order
fn parse_workbook_sheets<R: std::io::BufRead>(src: R) -> ConvertResult<Vec<(String, String)>> {
    let mut reader = quick_xml::Reader::from_reader(src);
    reader.config_mut().trim_text(true);

    let mut sheets = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                if e.name().as_ref() == b"sheet" {
                    let mut name = None;
                    let mut rid = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => name = attr.unescape_value().ok().map(|v| v.to_string()),
                            b"r:id" => rid = attr.unescape_value().ok().map(|v| v.to_string()),
                            _ => {}
                        }
                    }
                    if let (Some(name), Some(rid)) = (name, rid) {
                        sheets.push((name, rid));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(sheets)
}

/// Relationship id to target pairs from a .rels part
fn parse_relationships(src: impl std::io::BufRead) -> ConvertResult<Vec<(String, String)>> {
    let mut reader = quick_xml::Reader::from_reader(src);
    reader.config_mut().trim_text(true);

    let mut rels = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                if e.name().as_ref() == b"Relationship" {
                    let mut id = None;
                    let mut target = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = attr.unescape_value().ok().map(|v| v.to_string()),
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|v| v.to_string())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(target)) = (id, target) {
                        rels.push((id, target));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rels)
}

/// Cell value rendered as display text
fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            // Integral floats print without a trailing .0
            if *f == (*f as i64) as f64 && f.abs() < 1e10 {
                format!("{}", *f as i64)
            } else {
                format!("{f}")
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("Error: {e:?}"),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(datetime_text)
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Date cells without a time component print as a bare date
fn datetime_text(dt: NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
