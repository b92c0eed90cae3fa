//! PDF document assembly

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use tracing::debug;

use crate::error::ConvertResult;
use crate::pdf::layout::{
    cell_required_height, scale_column_widths, wrap_text, A4_HEIGHT_PT, A4_WIDTH_PT,
    ASCENDER_RATIO, BORDER_WIDTH_PT, CELL_PADDING_PT, LINE_HEIGHT_FACTOR, PAGE_MARGIN_PT,
    PRINTABLE_WIDTH_PT,
};
use crate::types::{DocumentSink, TableSpec};

/// Accumulates one A4 page per table and assembles the document on finish.
///
/// Content streams are written uncompressed and all text uses the built in
/// Helvetica font, so no font program is embedded.
pub struct PdfSink {
    /// Finished content streams, one per page
    pages: Vec<Content>,
    current: Content,
    /// Next row top, measured from the page bottom edge
    cursor_y: f64,
    started: bool,
}

impl Default for PdfSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfSink {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Content::new(),
            cursor_y: A4_HEIGHT_PT - PAGE_MARGIN_PT,
            started: false,
        }
    }

    /// Number of pages started so far
    pub fn page_count(&self) -> usize {
        self.pages.len() + 1
    }

    fn break_page(&mut self) {
        let finished = std::mem::replace(&mut self.current, Content::new());
        self.pages.push(finished);
        self.cursor_y = A4_HEIGHT_PT - PAGE_MARGIN_PT;
    }

    fn page_is_empty(&self) -> bool {
        self.cursor_y >= A4_HEIGHT_PT - PAGE_MARGIN_PT
    }

    fn draw_row(&mut self, widths: &[f64], cells: &[(Vec<String>, f64)], height: f64) {
        let top = self.cursor_y;
        let bottom = top - height;

        self.current.save_state();
        self.current.set_line_width(BORDER_WIDTH_PT as f32);
        let mut x = PAGE_MARGIN_PT;
        for width in widths {
            self.current
                .rect(x as f32, bottom as f32, *width as f32, height as f32);
            x += width;
        }
        self.current.stroke();
        self.current.restore_state();

        let mut x = PAGE_MARGIN_PT;
        for (column, width) in widths.iter().enumerate() {
            if let Some((lines, font_size)) = cells.get(column) {
                let text_x = x + CELL_PADDING_PT;
                for (line_no, line) in lines.iter().enumerate() {
                    let baseline = top
                        - CELL_PADDING_PT
                        - font_size * ASCENDER_RATIO
                        - line_no as f64 * font_size * LINE_HEIGHT_FACTOR;
                    self.current
                        .begin_text()
                        .set_font(Name(b"F1"), *font_size as f32)
                        .next_line(text_x as f32, baseline as f32)
                        .show(Str(&winansi_bytes(line)))
                        .end_text();
                }
            }
            x += width;
        }

        self.cursor_y = bottom;
    }
}

impl DocumentSink for PdfSink {
    fn write_table(&mut self, table: &TableSpec) -> ConvertResult<()> {
        if self.started {
            self.break_page();
        }
        self.started = true;
        debug!(
            "Rendering sheet '{}' with {} rows over {} columns",
            table.sheet_name,
            table.rows.len(),
            table.column_count()
        );

        // Degenerate tables leave their page blank
        let widths = scale_column_widths(&table.column_widths_pt, PRINTABLE_WIDTH_PT);
        if widths.iter().sum::<f64>() <= 0.0 {
            return Ok(());
        }

        for row in &table.rows {
            let cells: Vec<(Vec<String>, f64)> = row
                .cells
                .iter()
                .zip(widths.iter())
                .map(|(cell, width)| {
                    let available = (width - 2.0 * CELL_PADDING_PT).max(1.0);
                    (
                        wrap_text(&cell.text, available, cell.font_size),
                        cell.font_size,
                    )
                })
                .collect();

            let needed = cells
                .iter()
                .map(|(lines, font_size)| cell_required_height(*font_size, lines.len()))
                .fold(0.0, f64::max);
            let height = row.height_pt.max(needed);

            // Rows taller than a whole page still render, overflowing below
            if self.cursor_y - height < PAGE_MARGIN_PT && !self.page_is_empty() {
                self.break_page();
            }
            self.draw_row(&widths, &cells, height);
        }
        Ok(())
    }

    fn finish(mut self) -> ConvertResult<Vec<u8>> {
        self.pages.push(self.current);
        let page_count = self.pages.len();

        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let font_id = alloc();
        let page_ids: Vec<Ref> = (0..page_count).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..page_count).map(|_| alloc()).collect();

        for (i, content) in self.pages.into_iter().enumerate() {
            pdf.stream(content_ids[i], &content.finish());
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(page_count as i32);
        // Declared encoding must match the bytes winansi_bytes emits
        pdf.type1_font(font_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        for i in 0..page_count {
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, A4_WIDTH_PT as f32, A4_HEIGHT_PT as f32))
                .parent(pages_id)
                .contents(content_ids[i]);
            page.resources().fonts().pair(Name(b"F1"), font_id);
        }

        debug!("Assembled {} page PDF", page_count);
        Ok(pdf.finish())
    }
}

/// Map text to WinAnsi bytes, unmappable characters become question marks
fn winansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '\u{20ac}' => 0x80,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201c}' => 0x93,
            '\u{201d}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\u{2122}' => 0x99,
            '\u{2026}' => 0x85,
            _ => b'?',
        })
        .collect()
}
