//! PDF rendering module
//!
//! Tables arrive laid out in points and leave as A4 pages, one page per
//! table plus continuation pages when rows overflow.

pub mod layout;
mod writer;

pub use writer::PdfSink;
