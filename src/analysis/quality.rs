//! Heuristics for judging extracted text.
//!
//! Two checks live here:
//! - [`is_low_quality`] scores a block of extracted text, deciding whether
//!   OCR should be attempted.
//! - [`assess_scan_sample`] inspects text sampled from the first pages of a
//!   document, deciding whether the document is likely a scan.

/// Minimum trimmed length for text to be considered usable.
pub const MIN_QUALITY_CHARS: usize = 50;
/// Minimum share of alphabetic characters.
pub const MIN_ALPHA_RATIO: f64 = 0.30;
/// Maximum share of garble characters.
pub const MAX_GARBLE_RATIO: f64 = 0.05;

/// Minimum trimmed sample length for a document to count as text-based.
pub const MIN_SAMPLE_CHARS: usize = 100;
/// Minimum share of readable characters in a sample.
pub const MIN_READABLE_RATIO: f64 = 0.50;
/// Maximum share of OCR artifacts in a sample.
pub const MAX_ARTIFACT_RATIO: f64 = 0.02;
/// Pages sampled by the scan check.
pub const SCAN_SAMPLE_PAGES: u32 = 3;

const GARBLE_CHARS: [char; 3] = ['\u{FFFD}', '\\', '|'];
const READABLE_PUNCTUATION: &str = ".,()-_:+=%";
const OCR_ARTIFACTS: [&str; 8] = ["\u{FFFD}", "|", "\\", "//", "]]", "[[", "{{", "}}"];

/// Why a block of text was judged low quality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LowQualityReason {
    TooShort { chars: usize },
    LowAlphaRatio { ratio: f64 },
    Garbled { count: usize },
}

/// Classify a block of text, returning the first rule that fires.
pub fn classify(text: &str) -> Option<LowQualityReason> {
    let trimmed_len = text.trim().chars().count();
    if trimmed_len < MIN_QUALITY_CHARS {
        return Some(LowQualityReason::TooShort {
            chars: trimmed_len,
        });
    }

    let total = text.chars().count();
    let alpha = text.chars().filter(|c| c.is_alphabetic()).count();
    let ratio = alpha as f64 / total as f64;
    if ratio < MIN_ALPHA_RATIO {
        return Some(LowQualityReason::LowAlphaRatio { ratio });
    }

    let garbled = text.chars().filter(|c| GARBLE_CHARS.contains(c)).count();
    if garbled as f64 > total as f64 * MAX_GARBLE_RATIO {
        return Some(LowQualityReason::Garbled { count: garbled });
    }

    None
}

/// True when extracted text looks too sparse or noisy to trust.
pub fn is_low_quality(text: &str) -> bool {
    classify(text).is_some()
}

/// Result of the scanned-document check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanVerdict {
    Searchable,
    NoPages,
    MinimalText { chars: usize },
    LowReadableRatio { ratio: f64 },
    OcrArtifacts { count: usize },
    /// Sampling itself failed.
    Unreadable,
}

impl ScanVerdict {
    pub fn is_scanned(&self) -> bool {
        !matches!(self, ScanVerdict::Searchable)
    }

    pub fn describe(&self) -> String {
        match self {
            ScanVerdict::Searchable => "document contains searchable text".to_string(),
            ScanVerdict::NoPages => "no pages to sample".to_string(),
            ScanVerdict::MinimalText { chars } => {
                format!("minimal text extracted ({} chars)", chars)
            }
            ScanVerdict::LowReadableRatio { ratio } => {
                format!("readable ratio {:.2}", ratio)
            }
            ScanVerdict::OcrArtifacts { count } => {
                format!("{} OCR artifacts detected", count)
            }
            ScanVerdict::Unreadable => "sampling failed".to_string(),
        }
    }
}

fn is_readable(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || READABLE_PUNCTUATION.contains(c)
}

/// Decide whether text sampled from the first pages indicates a scan.
pub fn assess_scan_sample<S: AsRef<str>>(pages: &[S]) -> ScanVerdict {
    if pages.is_empty() {
        return ScanVerdict::NoPages;
    }

    let sample: String = pages.iter().map(AsRef::as_ref).collect();

    let trimmed_len = sample.trim().chars().count();
    if trimmed_len < MIN_SAMPLE_CHARS {
        return ScanVerdict::MinimalText {
            chars: trimmed_len,
        };
    }

    let total = sample.chars().count();
    let readable = sample.chars().filter(|c| is_readable(*c)).count();
    let ratio = readable as f64 / total as f64;
    if ratio < MIN_READABLE_RATIO {
        return ScanVerdict::LowReadableRatio { ratio };
    }

    let artifacts: usize = OCR_ARTIFACTS
        .iter()
        .map(|marker| sample.matches(marker).count())
        .sum();
    if artifacts as f64 > total as f64 * MAX_ARTIFACT_RATIO {
        return ScanVerdict::OcrArtifacts { count: artifacts };
    }

    ScanVerdict::Searchable
}
