//! Direct text extraction from PDFs using pdftotext.

use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pdf_utils::pdf_page_count;
use super::tools::{check_binary, PDFTOTEXT_NOT_FOUND, REQUIRED_TOOLS};
use crate::analysis::quality::{assess_scan_sample, ScanVerdict, SCAN_SAMPLE_PAGES};

/// Handle command output, extracting stdout on success or returning appropriate error.
fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ExtractionError::ExtractionFailed(format!(
                    "{}: {}",
                    error_prefix,
                    stderr.trim()
                )))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Page {page} failed: {reason}")]
    PageFailed { page: u32, reason: String },

    #[error("Cannot read document {path}: {source}")]
    DocumentUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Method used to obtain a document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// Embedded text, read without rendering.
    TextExtraction,
    /// OCR in single-document mode when forced.
    Ocr,
    /// OCR in batch mode when forced.
    ForcedOcr,
    /// OCR chosen because direct extraction was poor.
    OcrFallback,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::TextExtraction => "text_extraction",
            ExtractionMethod::Ocr => "ocr",
            ExtractionMethod::ForcedOcr => "forced_ocr",
            ExtractionMethod::OcrFallback => "ocr_fallback",
        }
    }

    pub fn is_ocr(&self) -> bool {
        !matches!(self, ExtractionMethod::TextExtraction)
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text kept for a document and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Extracted text content.
    pub text: String,
    /// Method used for extraction.
    pub method: ExtractionMethod,
    /// Trimmed character count of `text`.
    pub character_count: usize,
    /// Verdict of the scan check run before extraction, if it ran.
    pub likely_scanned: Option<bool>,
}

impl ExtractionResult {
    pub fn new(text: String, method: ExtractionMethod) -> Self {
        let character_count = text.trim().chars().count();
        Self {
            text,
            method,
            character_count,
            likely_scanned: None,
        }
    }

    pub fn with_scan_verdict(mut self, likely_scanned: bool) -> Self {
        self.likely_scanned = Some(likely_scanned);
        self
    }
}

/// Anything that can read embedded text from a document.
pub trait DirectExtractor {
    /// Concatenated page text, trimmed; empty if no page yielded text.
    ///
    /// Only fails when the document itself cannot be opened.
    fn extract_text(&self, pdf_path: &Path) -> Result<String, ExtractionError>;

    /// Whether the document looks like a scan. Failures count as scanned.
    fn is_likely_scanned(&self, pdf_path: &Path) -> bool;
}

/// Text extractor backed by Poppler's pdftotext.
pub struct TextExtractor {
    /// Keep physical layout of columns (`-layout`).
    layout: bool,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self { layout: true }
    }
}

impl TextExtractor {
    /// Create a new text extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle pdftotext's layout mode.
    pub fn with_layout(mut self, layout: bool) -> Self {
        self.layout = layout;
        self
    }

    fn base_args(&self) -> Vec<&'static str> {
        let mut args = Vec::with_capacity(3);
        if self.layout {
            args.push("-layout");
        }
        args.extend(["-enc", "UTF-8"]);
        args
    }

    /// Run pdftotext on a whole PDF file.
    fn run_pdftotext(&self, file_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new("pdftotext")
            .args(self.base_args())
            .arg(file_path)
            .arg("-") // Output to stdout
            .output();

        handle_cmd_output(output, PDFTOTEXT_NOT_FOUND, "pdftotext failed")
    }

    /// Run pdftotext on a single page of a PDF file.
    pub fn extract_pdf_page_text(
        &self,
        file_path: &Path,
        page: u32,
    ) -> Result<String, ExtractionError> {
        let page_str = page.to_string();
        let output = Command::new("pdftotext")
            .args(self.base_args())
            .args(["-f", &page_str, "-l", &page_str])
            .arg(file_path)
            .arg("-") // Output to stdout
            .output();

        handle_cmd_output(output, PDFTOTEXT_NOT_FOUND, "pdftotext failed").map_err(|e| match e {
            ExtractionError::ExtractionFailed(reason) => ExtractionError::PageFailed { page, reason },
            other => other,
        })
    }

    /// Sample the first pages and judge whether the document is a scan.
    pub fn scan_verdict(&self, file_path: &Path) -> ScanVerdict {
        let Some(page_count) = pdf_page_count(file_path) else {
            return ScanVerdict::Unreadable;
        };

        let mut pages = Vec::new();
        for page in 1..=page_count.min(SCAN_SAMPLE_PAGES) {
            match self.extract_pdf_page_text(file_path, page) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    tracing::warn!(page, "Error sampling page for scan detection: {}", e);
                    return ScanVerdict::Unreadable;
                }
            }
        }
        assess_scan_sample(&pages)
    }

    /// Check if required tools are available.
    pub fn check_tools() -> Vec<(String, bool)> {
        REQUIRED_TOOLS
            .iter()
            .map(|tool| (tool.to_string(), check_binary(tool)))
            .collect()
    }
}

/// Join non-blank page texts, each followed by a newline, and trim the result.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut text = String::new();
    for page in pages {
        let page = page.as_ref();
        if !page.trim().is_empty() {
            text.push_str(page);
            text.push('\n');
        }
    }
    text.trim().to_string()
}

impl DirectExtractor for TextExtractor {
    fn extract_text(&self, pdf_path: &Path) -> Result<String, ExtractionError> {
        let is_pdf = pdf_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(ExtractionError::UnsupportedFileType(
                pdf_path.display().to_string(),
            ));
        }

        std::fs::File::open(pdf_path).map_err(|source| ExtractionError::DocumentUnreadable {
            path: pdf_path.display().to_string(),
            source,
        })?;

        let Some(page_count) = pdf_page_count(pdf_path) else {
            tracing::warn!("Could not determine page count, extracting whole document");
            return Ok(match self.run_pdftotext(pdf_path) {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    tracing::error!("Error reading PDF {}: {}", pdf_path.display(), e);
                    String::new()
                }
            });
        };

        tracing::info!(pages = page_count, "Extracting embedded text");
        let mut pages = Vec::with_capacity(page_count as usize);
        for page in 1..=page_count {
            match self.extract_pdf_page_text(pdf_path, page) {
                Ok(text) if text.trim().is_empty() => {
                    tracing::warn!(page, "No text found on page");
                }
                Ok(text) => pages.push(text),
                Err(e @ ExtractionError::ToolNotFound(_)) => {
                    tracing::error!("{}", e);
                    break;
                }
                Err(e) => {
                    tracing::error!(page, "Error extracting text from page: {}", e);
                }
            }
        }

        Ok(join_pages(pages))
    }

    fn is_likely_scanned(&self, pdf_path: &Path) -> bool {
        let verdict = self.scan_verdict(pdf_path);
        if verdict.is_scanned() {
            tracing::info!("PDF appears to be scanned ({})", verdict.describe());
        } else {
            tracing::info!("PDF appears to contain searchable text");
        }
        verdict.is_scanned()
    }
}
