//! OCR and text extraction module.
//!
//! Extracts text from PDFs using:
//! - pdftotext (Poppler) for embedded text, page by page
//! - pdftoppm (Poppler) to render pages for OCR
//! - Tesseract OCR on preprocessed page images, with a fallback pass
//!
//! Both strategies tolerate partial failure: a bad page is logged and
//! skipped, never fatal for the document.

mod backend;
mod extractor;
mod pdf_utils;
mod preprocess;
mod recognizer;
mod tesseract;
mod tools;

pub use backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, RecognitionPass};
pub use extractor::{
    join_pages, DirectExtractor, ExtractionError, ExtractionMethod, ExtractionResult,
    TextExtractor,
};
pub use pdf_utils::{find_page_image, pdf_page_count};
pub use preprocess::Preprocessor;
pub use recognizer::{OcrRecognizer, RecognitionStats, Recognizer};
pub use tesseract::TesseractBackend;
pub use tools::check_binary;
