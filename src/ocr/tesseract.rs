//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line for text extraction.

use std::path::Path;
use std::process::Command;

use super::backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, RecognitionPass};
use super::tools::{check_binary, check_pdftoppm_hint, TESSERACT_NOT_FOUND};

/// Tesseract OCR backend.
pub struct TesseractBackend {
    config: OcrConfig,
}

impl TesseractBackend {
    /// Create a new Tesseract backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: OcrConfig::default(),
        }
    }

    /// Create a new Tesseract backend with custom configuration.
    pub fn with_config(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Command-line arguments following `<image> stdout` for a pass.
    fn pass_args(&self, pass: RecognitionPass) -> Vec<String> {
        let mut args = vec!["-l".to_string(), self.config.language.clone()];
        match pass {
            RecognitionPass::Primary => {
                args.extend(self.config.primary_args.iter().cloned());
                if !self.config.char_whitelist.is_empty() {
                    args.push("-c".to_string());
                    args.push(format!(
                        "tessedit_char_whitelist={}",
                        self.config.char_whitelist
                    ));
                }
            }
            RecognitionPass::Fallback => {
                args.extend(self.config.fallback_args.iter().cloned());
            }
        }
        args
    }

    /// Run Tesseract on an image file.
    fn run_tesseract(&self, image_path: &Path, pass: RecognitionPass) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(self.pass_args(pass))
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!(
                        "tesseract {} pass failed: {}",
                        pass.as_str(),
                        stderr.trim()
                    )))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                OcrError::BackendNotAvailable(TESSERACT_NOT_FOUND.to_string()),
            ),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrBackend for TesseractBackend {
    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        if !check_binary("tesseract") {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        } else if let Some(hint) = check_pdftoppm_hint() {
            hint
        } else {
            "Tesseract is available".to_string()
        }
    }

    fn run_ocr(&self, image_path: &Path, pass: RecognitionPass) -> Result<String, OcrError> {
        self.run_tesseract(image_path, pass)
    }
}
