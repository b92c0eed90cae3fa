//! Font size resolution from the workbook styles part

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ConvertResult;

/// Font size applied when a cell or workbook carries no explicit style
pub const DEFAULT_FONT_SIZE: f64 = 11.0;

/// Cell style lookup backed by xl/styles.xml
///
/// Cells reference a style index into `cellXfs`, each entry of which names a
/// font. Only the font size is kept here.
#[derive(Debug, Default)]
pub struct StyleTable {
    /// Sizes indexed by font id, in document order of `<font>` elements
    font_sizes: Vec<f64>,
    /// Font id per cell format, in document order of `<cellXfs>` entries
    xf_font_ids: Vec<usize>,
}

impl StyleTable {
    /// Parse a styles part, keeping font sizes and the cellXfs font mapping
    pub fn parse<R: BufRead>(src: R) -> ConvertResult<Self> {
        let mut reader = Reader::from_reader(src);
        reader.config_mut().trim_text(true);

        let mut table = StyleTable::default();
        let mut in_fonts = false;
        let mut in_cell_xfs = false;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                    b"fonts" => in_fonts = true,
                    b"cellXfs" => in_cell_xfs = true,
                    b"font" if in_fonts => table.font_sizes.push(DEFAULT_FONT_SIZE),
                    b"sz" if in_fonts => {
                        if let Some(size) = attr_value(&e, b"val") {
                            if let Some(last) = table.font_sizes.last_mut() {
                                *last = size;
                            }
                        }
                    }
                    // cellStyleXfs also holds <xf> entries, only cellXfs counts
                    b"xf" if in_cell_xfs => {
                        let font_id = attr_value(&e, b"fontId").unwrap_or(0.0) as usize;
                        table.xf_font_ids.push(font_id);
                    }
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"fonts" => in_fonts = false,
                    b"cellXfs" => in_cell_xfs = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(table)
    }

    /// Size of the workbook default font (font id zero)
    pub fn default_font_size(&self) -> f64 {
        self.font_sizes.first().copied().unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Resolve a cell style index to a font size, falling back to the default
    pub fn font_size_for_style(&self, style_index: usize) -> f64 {
        let font_id = self.xf_font_ids.get(style_index).copied().unwrap_or(0);
        self.font_sizes
            .get(font_id)
            .copied()
            .unwrap_or_else(|| self.default_font_size())
    }
}

fn attr_value(e: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> Option<f64> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            if let Ok(value) = attr.unescape_value() {
                return value.parse::<f64>().ok();
            }
        }
    }
    None
}
