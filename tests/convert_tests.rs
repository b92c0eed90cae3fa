//! End-to-end conversion tests over generated workbooks

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Format, Workbook};
use tempfile::TempDir;

use xlsx2pdf::convert::convert_file;
use xlsx2pdf::types::{ConvertOptions, SpreadsheetSource};
use xlsx2pdf::xlsx::XlsxSource;
use xlsx2pdf::Converter;

fn save_fixture(dir: &TempDir, workbook: &mut Workbook) -> PathBuf {
    let path = dir.path().join("fixture.xlsx");
    workbook.save(&path).unwrap();
    path
}

fn load_pdf(path: &PathBuf) -> lopdf::Document {
    lopdf::Document::load(path).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// PAGE STRUCTURE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_single_sheet_renders_one_page() {
    let dir = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    let format = Format::new().set_font_size(12.0);
    let sheet = workbook.add_worksheet();
    sheet.write_string_with_format(0, 0, "A", &format).unwrap();
    sheet.write_string_with_format(0, 1, "B", &format).unwrap();
    let input = save_fixture(&dir, &mut workbook);
    let output = dir.path().join("out.pdf");

    let summary = convert_file(&input, &output, &ConvertOptions::default()).unwrap();

    assert_eq!(summary.sheets, 1);
    assert_eq!(summary.rows, 1);
    assert_eq!(summary.cells, 2);
    assert_eq!(summary.pages, 1);
    let doc = load_pdf(&output);
    assert_eq!(doc.get_pages().len(), 1);
    let text = doc.extract_text(&[1]).unwrap();
    assert!(text.contains('A'), "first cell should be rendered");
    assert!(text.contains('B'), "second cell should be rendered");
}

#[test]
fn test_each_sheet_starts_a_new_page() {
    let dir = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    for name in ["First", "Second", "Third"] {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).unwrap();
        sheet.write_string(0, 0, name).unwrap();
    }
    let input = save_fixture(&dir, &mut workbook);
    let output = dir.path().join("out.pdf");

    let summary = convert_file(&input, &output, &ConvertOptions::default()).unwrap();

    assert_eq!(summary.sheets, 3);
    assert_eq!(summary.pages, 3);
    let doc = load_pdf(&output);
    assert_eq!(doc.get_pages().len(), 3);
    assert!(doc.extract_text(&[1]).unwrap().contains("First"));
    assert!(doc.extract_text(&[2]).unwrap().contains("Second"));
    assert!(doc.extract_text(&[3]).unwrap().contains("Third"));
}

#[test]
fn test_overflowing_sheet_continues_on_extra_pages() {
    let dir = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for row in 0..60 {
        sheet.write_string(row, 0, format!("row {row}")).unwrap();
    }
    let input = save_fixture(&dir, &mut workbook);
    let output = dir.path().join("out.pdf");

    let summary = convert_file(&input, &output, &ConvertOptions::default()).unwrap();

    assert_eq!(summary.sheets, 1);
    assert_eq!(summary.pages, 2, "60 default rows exceed one page");
    let doc = load_pdf(&output);
    assert!(doc.extract_text(&[1]).unwrap().contains("row 0"));
    assert!(doc.extract_text(&[2]).unwrap().contains("row 59"));
}

#[test]
fn test_empty_sheet_keeps_its_blank_page() {
    let dir = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    workbook
        .add_worksheet()
        .set_name("Data")
        .unwrap()
        .write_string(0, 0, "data")
        .unwrap();
    workbook.add_worksheet().set_name("Empty").unwrap();
    workbook
        .add_worksheet()
        .set_name("Tail")
        .unwrap()
        .write_string(0, 0, "tail")
        .unwrap();
    let input = save_fixture(&dir, &mut workbook);
    let output = dir.path().join("out.pdf");

    let summary = convert_file(&input, &output, &ConvertOptions::default()).unwrap();

    assert_eq!(summary.pages, 3, "empty sheet still occupies a page");
    let doc = load_pdf(&output);
    assert!(doc.extract_text(&[1]).unwrap().contains("data"));
    assert!(doc.extract_text(&[2]).unwrap().trim().is_empty());
    assert!(doc.extract_text(&[3]).unwrap().contains("tail"));
}

#[test]
fn test_sheet_with_unknown_column_count_renders_blank() {
    let dir = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    // Only the last stored row has cells, so the scan finds none
    sheet.set_row_height(0, 20).unwrap();
    sheet.write_string(2, 0, "invisible").unwrap();
    let input = save_fixture(&dir, &mut workbook);
    let output = dir.path().join("out.pdf");

    let summary = convert_file(&input, &output, &ConvertOptions::default()).unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.cells, 0);
    let doc = load_pdf(&output);
    assert!(doc.extract_text(&[1]).unwrap().trim().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// GEOMETRY AND STYLE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_column_widths_convert_at_three_quarters() {
    let dir = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "wide").unwrap();
    sheet.write_string(0, 1, "plain").unwrap();
    sheet.set_column_width(0, 20).unwrap();
    let input = save_fixture(&dir, &mut workbook);

    let mut source = XlsxSource::open(&input).unwrap();
    let grids = source.sheets().unwrap();
    let table = Converter::default().prepare_table(&grids[0]);

    // 20 chars -> 145px -> 108.75pt, default 8.43 chars -> 64px -> 48pt
    assert_eq!(table.column_widths_pt, vec![108.75, 48.0]);
}

#[test]
fn test_pixel_to_point_factor_is_configurable() {
    let dir = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    workbook.add_worksheet().write_string(0, 0, "x").unwrap();
    let input = save_fixture(&dir, &mut workbook);

    let mut source = XlsxSource::open(&input).unwrap();
    let grids = source.sheets().unwrap();
    let options = ConvertOptions {
        pixel_to_point: 1.0,
        ..ConvertOptions::default()
    };
    let table = Converter::new(options).prepare_table(&grids[0]);

    assert_eq!(table.column_widths_pt, vec![64.0]);
}

#[test]
fn test_row_heights_survive_into_the_table() {
    let dir = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "tall").unwrap();
    sheet.write_string(1, 0, "short").unwrap();
    sheet.set_row_height(0, 30).unwrap();
    let input = save_fixture(&dir, &mut workbook);

    let mut source = XlsxSource::open(&input).unwrap();
    let grids = source.sheets().unwrap();
    let table = Converter::default().prepare_table(&grids[0]);

    assert_eq!(table.rows[0].height_pt, 30.0);
    assert_eq!(table.rows[1].height_pt, 15.0);
}

#[test]
fn test_cell_font_sizes_reach_the_page_stream() {
    let dir = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    let format = Format::new().set_font_size(12.0);
    let sheet = workbook.add_worksheet();
    sheet.write_string_with_format(0, 0, "sized", &format).unwrap();
    let input = save_fixture(&dir, &mut workbook);
    let output = dir.path().join("out.pdf");

    convert_file(&input, &output, &ConvertOptions::default()).unwrap();

    let doc = load_pdf(&output);
    let page_id = *doc.get_pages().get(&1).unwrap();
    let content = doc.get_page_content(page_id).unwrap();
    let content = String::from_utf8_lossy(&content);
    assert!(
        content.contains("/F1 12 Tf"),
        "cell text should use its style font size"
    );
}

#[test]
fn test_missing_rows_are_skipped() {
    let dir = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "first").unwrap();
    sheet.write_string(4, 0, "fifth").unwrap();
    let input = save_fixture(&dir, &mut workbook);
    let output = dir.path().join("out.pdf");

    let summary = convert_file(&input, &output, &ConvertOptions::default()).unwrap();

    assert_eq!(summary.rows, 2, "absent rows do not render");
    let doc = load_pdf(&output);
    let text = doc.extract_text(&[1]).unwrap();
    assert!(text.contains("first"));
    assert!(text.contains("fifth"));
}

// ═══════════════════════════════════════════════════════════════════════════
// OUTPUT HANDLING TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_output_parent_directories_are_created() {
    let dir = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    workbook.add_worksheet().write_string(0, 0, "x").unwrap();
    let input = save_fixture(&dir, &mut workbook);
    let output = dir.path().join("nested").join("deep").join("out.pdf");

    let summary = convert_file(&input, &output, &ConvertOptions::default()).unwrap();

    assert!(output.exists(), "output file should exist");
    assert_eq!(summary.output, output);
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pdf");

    let result = convert_file(
        dir.path().join("absent.xlsx"),
        &output,
        &ConvertOptions::default(),
    );

    assert!(result.is_err(), "missing workbook should fail");
    assert!(!output.exists(), "no output should be written on failure");
}

#[test]
fn test_workbook_without_sheets_still_produces_a_pdf() {
    let dir = TempDir::new().unwrap();
    let mut workbook = Workbook::new();
    workbook.add_worksheet();
    let input = save_fixture(&dir, &mut workbook);
    let output = dir.path().join("out.pdf");

    let summary = convert_file(&input, &output, &ConvertOptions::default()).unwrap();

    assert_eq!(summary.sheets, 1);
    assert_eq!(summary.pages, 1);
    let doc = load_pdf(&output);
    assert_eq!(doc.get_pages().len(), 1);
}
