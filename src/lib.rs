//! xlsx2pdf - Excel workbook to paginated PDF conversion
//!
//! This library reads .xlsx workbooks and renders each worksheet as a
//! bordered table on its own A4 page, preserving the workbook's column
//! widths, row heights and font sizes.
//!
//! # Features
//!
//! - One page per worksheet, continuation pages for overflowing rows
//! - Column widths from workbook pixels converted to points
//! - Row heights and per-cell font sizes taken from the workbook
//! - Swappable source and sink traits for other formats
//!
//! # Example
//!
//! ```no_run
//! use xlsx2pdf::convert::convert_file;
//! use xlsx2pdf::types::ConvertOptions;
//!
//! let options = ConvertOptions::default();
//! let summary = convert_file("report.xlsx", "report.pdf", &options)?;
//!
//! println!("Sheets: {}", summary.sheets);
//! println!("Pages: {}", summary.pages);
//! # Ok::<(), xlsx2pdf::error::ConvertError>(())
//! ```

pub mod cli;
pub mod convert;
pub mod error;
pub mod pdf;
pub mod types;
pub mod xlsx;

// Re-export commonly used types
pub use convert::{convert_file, Converter};
pub use error::{ConvertError, ConvertResult};
pub use types::{ConvertOptions, ConvertSummary, DocumentSink, SheetGrid, SpreadsheetSource};
