//! Workbook reading module
//!
//! Cell values come from the calamine reader, while column widths, row
//! heights and cell font sizes come from the raw worksheet XML parts,
//! which the value reader does not surface.

mod reader;
mod sheet_xml;
mod styles;

pub use reader::XlsxSource;
