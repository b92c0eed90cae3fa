use std::path::PathBuf;

use thiserror::Error;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Worksheet XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Workbook part not found: {0}")]
    MissingPart(String),

    #[error("Cannot create output file {path}: {source}")]
    OutputCreation {
        path: PathBuf,
        source: std::io::Error,
    },
}
