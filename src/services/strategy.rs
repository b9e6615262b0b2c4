//! Choosing between direct extraction and OCR for a document.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ProcessingError;
use crate::analysis::quality;
use crate::ocr::{DirectExtractor, ExtractionMethod, ExtractionResult, Recognizer};

/// Which caller is asking; decides thresholds and method labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    /// One document, one spreadsheet.
    Single,
    /// Many documents combined into one spreadsheet.
    Batch,
}

/// Thresholds for accepting direct extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Direct text must be longer than this in single-document mode.
    pub single_min_chars: usize,
    /// Direct text must be longer than this in batch mode.
    pub batch_min_chars: usize,
    /// OCR replaces direct text only when longer by more than this factor.
    pub ocr_improvement_ratio: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            single_min_chars: 50,
            batch_min_chars: 100,
            ocr_improvement_ratio: 1.5,
        }
    }
}

impl StrategyConfig {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    fn min_chars(&self, mode: ProcessingMode) -> usize {
        match mode {
            ProcessingMode::Single => self.single_min_chars,
            ProcessingMode::Batch => self.batch_min_chars,
        }
    }
}

/// Orchestrates direct extraction, OCR and the quality check.
pub struct StrategySelector<'a> {
    extractor: &'a dyn DirectExtractor,
    recognizer: &'a dyn Recognizer,
    config: StrategyConfig,
}

impl<'a> StrategySelector<'a> {
    pub fn new(
        extractor: &'a dyn DirectExtractor,
        recognizer: &'a dyn Recognizer,
        config: StrategyConfig,
    ) -> Self {
        Self {
            extractor,
            recognizer,
            config,
        }
    }

    /// Decide which text to keep for a document.
    pub fn select(
        &self,
        pdf_path: &Path,
        mode: ProcessingMode,
        force_ocr: bool,
    ) -> Result<ExtractionResult, ProcessingError> {
        if force_ocr {
            tracing::info!("OCR processing forced by user");
            let text = self.recognizer.recognize(pdf_path);
            if text.trim().is_empty() {
                return Err(ProcessingError::NoExtractableText { forced_ocr: true });
            }
            let method = match mode {
                ProcessingMode::Single => ExtractionMethod::Ocr,
                ProcessingMode::Batch => ExtractionMethod::ForcedOcr,
            };
            return Ok(ExtractionResult::new(text, method));
        }

        let likely_scanned = self.extractor.is_likely_scanned(pdf_path);

        tracing::info!("Attempting text extraction");
        let direct = self.extractor.extract_text(pdf_path)?;
        let direct_len = direct.trim().chars().count();
        let min_chars = self.config.min_chars(mode);

        if direct_len > min_chars && !quality::is_low_quality(&direct) {
            tracing::info!(chars = direct_len, "Good quality text extracted, proceeding without OCR");
            return Ok(
                ExtractionResult::new(direct, ExtractionMethod::TextExtraction)
                    .with_scan_verdict(likely_scanned),
            );
        }

        tracing::info!(
            chars = direct_len,
            "Text extraction failed or produced poor results, trying OCR"
        );
        let ocr = self.recognizer.recognize(pdf_path);
        let ocr_len = ocr.trim().chars().count();

        let result = if ocr_len > 0
            && (direct_len == 0
                || ocr_len as f64 > direct_len as f64 * self.config.ocr_improvement_ratio)
        {
            tracing::info!(chars = ocr_len, "OCR produced better results, using OCR text");
            ExtractionResult::new(ocr, ExtractionMethod::OcrFallback)
        } else if direct_len > 0 {
            tracing::info!(
                direct = direct_len,
                ocr = ocr_len,
                "Using original text extraction (OCR didn't improve results)"
            );
            ExtractionResult::new(direct, ExtractionMethod::TextExtraction)
        } else {
            tracing::warn!("OCR also failed to extract text");
            return Err(ProcessingError::NoExtractableText { forced_ocr: false });
        };

        Ok(result.with_scan_verdict(likely_scanned))
    }
}
