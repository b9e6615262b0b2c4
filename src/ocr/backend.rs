//! OCR backend abstraction.
//!
//! Tesseract is the only shipped engine; the trait keeps the recognizer
//! independent of how glyphs are actually recognized.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from OCR backends and the page recognizer.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("Rasterization failed: {0}")]
    Rasterization(String),

    #[error("Recognition failed on page {page}: {reason}")]
    Recognition { page: u32, reason: String },

    #[error("No pages could be recognized")]
    NoPagesRecognized,

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Available OCR backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrBackendType {
    /// Tesseract OCR via command-line.
    Tesseract,
}

impl OcrBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "tesseract",
        }
    }
}

impl std::fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which recognition configuration to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionPass {
    /// Restricted character set, uniform text block layout.
    Primary,
    /// Looser settings used once when the primary pass yields nothing.
    Fallback,
}

impl RecognitionPass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecognitionPass::Primary => "primary",
            RecognitionPass::Fallback => "fallback",
        }
    }
}

/// Trait for OCR backends.
pub trait OcrBackend: Send + Sync {
    /// Get the backend type.
    fn backend_type(&self) -> OcrBackendType;

    /// Check if this backend is available (binaries installed).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Recognize text in an image file using the given pass.
    fn run_ocr(&self, image_path: &Path, pass: RecognitionPass) -> Result<String, OcrError>;
}

/// OCR settings: rendering, preprocessing and recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Language for OCR (e.g., "eng").
    pub language: String,
    /// Rasterization resolution.
    pub dpi: u32,
    /// Worker threads used to render pages.
    pub render_threads: usize,
    /// Contrast enhancement factor (1.0 = unchanged).
    pub contrast: f32,
    /// Sharpness enhancement factor (1.0 = unchanged).
    pub sharpness: f32,
    /// Median filter radius; 1 means a 3x3 window, 0 disables the filter.
    pub median_radius: u32,
    /// Characters the primary pass may emit.
    pub char_whitelist: String,
    /// Engine arguments for the primary pass.
    pub primary_args: Vec<String>,
    /// Engine arguments for the fallback pass.
    pub fallback_args: Vec<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            dpi: 300,
            render_threads: 2,
            contrast: 1.5,
            sharpness: 2.0,
            median_radius: 1,
            char_whitelist:
                "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz.,()-_/:+=%°µ "
                    .to_string(),
            primary_args: ["--oem", "3", "--psm", "6"].map(String::from).to_vec(),
            fallback_args: ["--oem", "1", "--psm", "3"].map(String::from).to_vec(),
        }
    }
}

impl OcrConfig {
    /// Check if this is the default config.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
