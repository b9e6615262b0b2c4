//! Errors surfaced by the processing services.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::ocr::ExtractionError;

/// Errors that escape per-page containment.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("{}", no_text_message(*forced_ocr))]
    NoExtractableText { forced_ocr: bool },

    #[error("No data could be structured from {0}")]
    EmptyStructuringResult(String),

    #[error("No structured data could be created from any PDF")]
    BatchEmpty,

    #[error("PDF file not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("Input directory not found: {}", .0.display())]
    InputDirNotFound(PathBuf),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn no_text_message(forced_ocr: bool) -> String {
    let mut msg = "No text could be extracted from the PDF. ".to_string();
    if !forced_ocr {
        msg.push_str("This might be a scanned PDF. Try using --ocr flag. ");
    }
    msg.push_str("Ensure Tesseract and Poppler are properly installed.");
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_text_message_suggests_ocr_flag() {
        let err = ProcessingError::NoExtractableText { forced_ocr: false };
        let msg = err.to_string();
        assert!(msg.contains("--ocr"));
        assert!(msg.ends_with("Ensure Tesseract and Poppler are properly installed."));
    }

    #[test]
    fn test_no_text_message_when_forced() {
        let err = ProcessingError::NoExtractableText { forced_ocr: true };
        assert!(!err.to_string().contains("--ocr"));
    }
}
