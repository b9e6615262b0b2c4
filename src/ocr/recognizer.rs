//! Document-level OCR: render pages, clean them up, recognize, aggregate.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::backend::{OcrBackend, OcrConfig, OcrError, RecognitionPass};
use super::pdf_utils::{pdf_page_count, render_document, render_pages};
use super::preprocess::Preprocessor;
use super::tesseract::TesseractBackend;

/// Anything that can turn a document into recognized text.
///
/// Implementations never fail outright: problems are logged and an empty
/// string is returned, leaving the caller to decide what "no text" means.
pub trait Recognizer {
    fn recognize(&self, pdf_path: &Path) -> String;
}

/// Per-page recognition counts for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognitionStats {
    pub pages: usize,
    pub succeeded: usize,
    pub used_fallback: usize,
}

/// OCR pipeline over an [`OcrBackend`].
pub struct OcrRecognizer {
    backend: Box<dyn OcrBackend>,
    preprocessor: Preprocessor,
    dpi: u32,
    render_threads: usize,
}

impl OcrRecognizer {
    /// Tesseract-backed recognizer.
    pub fn new(config: &OcrConfig) -> Self {
        Self::with_backend(Box::new(TesseractBackend::with_config(config.clone())), config)
    }

    pub fn with_backend(backend: Box<dyn OcrBackend>, config: &OcrConfig) -> Self {
        Self {
            backend,
            preprocessor: Preprocessor::from_config(config),
            dpi: config.dpi,
            render_threads: config.render_threads,
        }
    }

    /// Run OCR over every page of a PDF.
    pub fn recognize_pdf(&self, pdf_path: &Path) -> Result<(String, RecognitionStats), OcrError> {
        let temp_dir = TempDir::new()?;

        tracing::info!(dpi = self.dpi, "Converting PDF pages to images");
        let images = match pdf_page_count(pdf_path) {
            Some(count) => render_pages(
                pdf_path,
                count,
                self.dpi,
                self.render_threads,
                temp_dir.path(),
            )?,
            None => render_document(pdf_path, self.dpi, temp_dir.path())?,
        };
        tracing::info!(pages = images.len(), "Converted pages to images");

        self.recognize_images(&images, temp_dir.path())
    }

    /// Recognize already-rendered page images, in order.
    pub fn recognize_images(
        &self,
        images: &[PathBuf],
        scratch_dir: &Path,
    ) -> Result<(String, RecognitionStats), OcrError> {
        let mut text = String::new();
        let mut stats = RecognitionStats {
            pages: images.len(),
            succeeded: 0,
            used_fallback: 0,
        };

        for (i, image_path) in images.iter().enumerate() {
            let page = (i + 1) as u32;
            let prepared = self.prepare_image(image_path, page, scratch_dir);

            match self.recognize_page(&prepared, page) {
                Ok((page_text, pass)) => {
                    tracing::info!(
                        page,
                        pass = pass.as_str(),
                        chars = page_text.trim().chars().count(),
                        "Page recognized"
                    );
                    text.push_str(&page_text);
                    text.push('\n');
                    stats.succeeded += 1;
                    if pass == RecognitionPass::Fallback {
                        stats.used_fallback += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(page, "{}", e);
                }
            }
        }

        tracing::info!(
            "OCR processing complete: {}/{} pages processed successfully",
            stats.succeeded,
            stats.pages
        );

        if stats.succeeded == 0 {
            return Err(OcrError::NoPagesRecognized);
        }
        if (stats.succeeded as f64) < stats.pages as f64 / 2.0 {
            tracing::warn!(
                "Only {} out of {} pages were processed successfully",
                stats.succeeded,
                stats.pages
            );
        }

        Ok((text.trim().to_string(), stats))
    }

    /// Preprocess a page image into the scratch dir, or fall back to the raw image.
    fn prepare_image(&self, image_path: &Path, page: u32, scratch_dir: &Path) -> PathBuf {
        let prepared_path = scratch_dir.join(format!("prepared-{:05}.png", page));
        let result = image::open(image_path)
            .and_then(|img| self.preprocessor.apply(&img).save(&prepared_path));

        match result {
            Ok(()) => prepared_path,
            Err(e) => {
                tracing::warn!(page, "Image preprocessing failed: {}, using original image", e);
                image_path.to_path_buf()
            }
        }
    }

    /// Primary pass, then the fallback pass once if the primary yields nothing.
    fn recognize_page(
        &self,
        image_path: &Path,
        page: u32,
    ) -> Result<(String, RecognitionPass), OcrError> {
        match self.backend.run_ocr(image_path, RecognitionPass::Primary) {
            Ok(text) if !text.trim().is_empty() => return Ok((text, RecognitionPass::Primary)),
            Ok(_) => tracing::warn!(page, "No text extracted, trying alternative OCR settings"),
            Err(e) => tracing::warn!(page, "Primary OCR pass failed: {}", e),
        }

        match self.backend.run_ocr(image_path, RecognitionPass::Fallback) {
            Ok(text) if !text.trim().is_empty() => Ok((text, RecognitionPass::Fallback)),
            Ok(_) => Err(OcrError::Recognition {
                page,
                reason: "no text extracted".to_string(),
            }),
            Err(e) => Err(OcrError::Recognition {
                page,
                reason: e.to_string(),
            }),
        }
    }
}

impl Recognizer for OcrRecognizer {
    fn recognize(&self, pdf_path: &Path) -> String {
        match self.recognize_pdf(pdf_path) {
            Ok((text, _)) => text,
            Err(OcrError::BackendNotAvailable(hint)) => {
                tracing::error!("{}", hint);
                tracing::error!("OCR requires Poppler (pdftoppm) and Tesseract on PATH");
                String::new()
            }
            Err(e) => {
                tracing::error!("OCR failed for {}: {}", pdf_path.display(), e);
                String::new()
            }
        }
    }
}
