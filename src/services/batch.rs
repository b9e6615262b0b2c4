//! Batch and combined processing of many documents.
//!
//! Separated from UI concerns: progress is reported through an observer
//! callback so the CLI can drive a progress bar.

use std::path::{Path, PathBuf};

use super::strategy::{ProcessingMode, StrategyConfig, StrategySelector};
use super::structuring::StructuringEngine;
use super::ProcessingError;
use crate::models::{DocumentRows, ProcessingStatus, ProcessingSummary};
use crate::ocr::{DirectExtractor, Recognizer};
use crate::output::XlsxWriter;

/// Method label for rows taken from the sample table.
const FALLBACK_METHOD: &str = "fallback";
const NO_METHOD: &str = "none";

/// Events emitted while working through a list of documents.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    DocumentStarted {
        index: usize,
        total: usize,
        name: String,
    },
    DocumentFinished {
        index: usize,
        total: usize,
        name: String,
        rows: usize,
        error: Option<String>,
    },
}

/// Result of a combined run.
#[derive(Debug, Clone, Default)]
pub struct CombineOutcome {
    /// Rows per document, in input order. Documents with no rows are absent.
    pub documents: Vec<DocumentRows>,
    /// One summary per input document, in input order.
    pub summaries: Vec<ProcessingSummary>,
}

impl CombineOutcome {
    pub fn total_rows(&self) -> usize {
        self.documents.iter().map(DocumentRows::len).sum()
    }

    /// Counts of (successful, with sample data, failed) documents.
    pub fn tally(&self) -> (usize, usize, usize) {
        let successful = self
            .summaries
            .iter()
            .filter(|s| s.status == ProcessingStatus::Success)
            .count();
        let with_sample = self
            .summaries
            .iter()
            .filter(|s| s.status.used_sample())
            .count();
        let failed = self.summaries.len() - successful - with_sample;
        (successful, with_sample, failed)
    }
}

/// Outcome of one file in directory mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchFileStatus {
    Success { rows: usize },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFileResult {
    pub file: String,
    pub output: PathBuf,
    pub status: BatchFileStatus,
}

/// Runs extraction, strategy selection and structuring for documents.
pub struct DocumentProcessor {
    extractor: Box<dyn DirectExtractor>,
    recognizer: Box<dyn Recognizer>,
    strategy: StrategyConfig,
    engine: StructuringEngine,
    force_ocr: bool,
}

impl DocumentProcessor {
    pub fn new(
        extractor: Box<dyn DirectExtractor>,
        recognizer: Box<dyn Recognizer>,
        strategy: StrategyConfig,
        engine: StructuringEngine,
    ) -> Self {
        Self {
            extractor,
            recognizer,
            strategy,
            engine,
            force_ocr: false,
        }
    }

    /// Skip direct extraction and always OCR.
    pub fn with_force_ocr(mut self, force_ocr: bool) -> Self {
        self.force_ocr = force_ocr;
        self
    }

    pub fn engine(&self) -> &StructuringEngine {
        &self.engine
    }

    fn selector(&self) -> StrategySelector<'_> {
        StrategySelector::new(
            self.extractor.as_ref(),
            self.recognizer.as_ref(),
            self.strategy.clone(),
        )
    }

    /// Process one document into rows for its own spreadsheet.
    pub fn process_single(&self, pdf_path: &Path) -> Result<DocumentRows, ProcessingError> {
        if !pdf_path.exists() {
            return Err(ProcessingError::DocumentNotFound(pdf_path.to_path_buf()));
        }

        let name = document_name(pdf_path);
        let span = tracing::info_span!("document", name = %name);
        let _enter = span.enter();

        let extraction = self
            .selector()
            .select(pdf_path, ProcessingMode::Single, self.force_ocr)?;
        tracing::info!(
            method = extraction.method.as_str(),
            chars = extraction.character_count,
            "Text selected"
        );

        let structured = self.engine.structure_or_sample(&extraction.text, &name)?;
        Ok(DocumentRows::new(name, structured.rows))
    }

    /// Process documents for one combined spreadsheet.
    ///
    /// A failing document never stops the run; it contributes sample rows
    /// where possible and is reported in its summary.
    pub fn process_combined<F>(
        &self,
        pdf_paths: &[PathBuf],
        mut observer: F,
    ) -> Result<CombineOutcome, ProcessingError>
    where
        F: FnMut(&BatchEvent),
    {
        let total = pdf_paths.len();
        let mut outcome = CombineOutcome::default();

        for (index, pdf_path) in pdf_paths.iter().enumerate() {
            let name = document_name(pdf_path);
            observer(&BatchEvent::DocumentStarted {
                index,
                total,
                name: name.clone(),
            });

            let (rows, summary) = self.combine_one(pdf_path, &name);

            observer(&BatchEvent::DocumentFinished {
                index,
                total,
                name: name.clone(),
                rows: summary.rows,
                error: summary.error.clone(),
            });

            if let Some(rows) = rows.filter(|r| !r.is_empty()) {
                outcome.documents.push(rows);
            }
            outcome.summaries.push(summary);
        }

        let (successful, with_sample, failed) = outcome.tally();
        tracing::info!(
            successful,
            with_sample,
            failed,
            rows = outcome.total_rows(),
            "Combined processing complete"
        );
        for summary in &outcome.summaries {
            tracing::info!(
                "{} {}: {} ({} rows)",
                summary.icon(),
                summary.file,
                summary.status,
                summary.rows
            );
        }

        if outcome.total_rows() == 0 {
            return Err(ProcessingError::BatchEmpty);
        }
        Ok(outcome)
    }

    fn combine_one(&self, pdf_path: &Path, name: &str) -> (Option<DocumentRows>, ProcessingSummary) {
        let file = file_name(pdf_path);

        if !pdf_path.exists() {
            tracing::error!(path = %pdf_path.display(), "PDF file not found");
            let error = ProcessingError::DocumentNotFound(pdf_path.to_path_buf());
            return (
                None,
                summary(
                    file,
                    ProcessingStatus::CompleteFailure,
                    NO_METHOD,
                    0,
                    0,
                    Some(error.to_string()),
                ),
            );
        }

        let span = tracing::info_span!("document", name = %name);
        let _enter = span.enter();
        tracing::info!("Processing document");

        match self
            .selector()
            .select(pdf_path, ProcessingMode::Batch, self.force_ocr)
        {
            Ok(extraction) => {
                let rows = self.engine.structure(&extraction.text, Some(name));
                if !rows.is_empty() {
                    tracing::info!(
                        rows = rows.len(),
                        method = extraction.method.as_str(),
                        "Structured document"
                    );
                    let s = summary(
                        file,
                        ProcessingStatus::Success,
                        extraction.method.as_str(),
                        rows.len(),
                        extraction.character_count,
                        None,
                    );
                    return (Some(DocumentRows::new(name, rows)), s);
                }

                tracing::warn!("No structured data extracted, generating sample data");
                self.with_sample(file, name, ProcessingStatus::SampleData, None)
            }
            Err(e @ ProcessingError::NoExtractableText { .. }) => {
                tracing::warn!(error = %e, "No text extracted, generating sample data");
                self.with_sample(
                    file,
                    name,
                    ProcessingStatus::FailedWithSample,
                    Some(e.to_string()),
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "Processing failed, generating sample data");
                self.with_sample(
                    file,
                    name,
                    ProcessingStatus::ErrorWithSample,
                    Some(e.to_string()),
                )
            }
        }
    }

    fn with_sample(
        &self,
        file: String,
        name: &str,
        status: ProcessingStatus,
        error: Option<String>,
    ) -> (Option<DocumentRows>, ProcessingSummary) {
        let rows = self.engine.sample_rows(name);
        if rows.is_empty() {
            tracing::error!("Could not generate sample data");
            let error = error.unwrap_or_else(|| {
                ProcessingError::EmptyStructuringResult(name.to_string()).to_string()
            });
            return (
                None,
                summary(
                    file,
                    ProcessingStatus::CompleteFailure,
                    NO_METHOD,
                    0,
                    0,
                    Some(error),
                ),
            );
        }

        tracing::info!(rows = rows.len(), "Generated sample data");
        // sample rows carry no extracted text
        let s = summary(file, status, FALLBACK_METHOD, rows.len(), 0, error);
        (Some(DocumentRows::new(name, rows)), s)
    }

    /// Process every PDF in a directory into its own spreadsheet.
    pub fn process_directory<F>(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        writer: &XlsxWriter,
        mut observer: F,
    ) -> Result<Vec<BatchFileResult>, ProcessingError>
    where
        F: FnMut(&BatchEvent),
    {
        if !input_dir.is_dir() {
            return Err(ProcessingError::InputDirNotFound(input_dir.to_path_buf()));
        }
        std::fs::create_dir_all(output_dir)?;

        let pdfs = collect_pdfs(input_dir)?;
        if pdfs.is_empty() {
            tracing::warn!(dir = %input_dir.display(), "No PDF files found");
            return Ok(Vec::new());
        }
        tracing::info!(count = pdfs.len(), "Found PDF files to process");

        let total = pdfs.len();
        let mut results = Vec::with_capacity(total);

        for (index, pdf_path) in pdfs.iter().enumerate() {
            let name = document_name(pdf_path);
            let output = output_dir.join(format!("{}.xlsx", name));
            observer(&BatchEvent::DocumentStarted {
                index,
                total,
                name: name.clone(),
            });

            let written = self.process_single(pdf_path).and_then(|rows| {
                writer.write_attributes(&rows.rows, &output)?;
                Ok(rows)
            });
            let status = match written {
                Ok(rows) => {
                    tracing::info!(file = %file_name(pdf_path), output = %output.display(), "Processed");
                    BatchFileStatus::Success { rows: rows.len() }
                }
                Err(e) => {
                    tracing::error!(file = %file_name(pdf_path), error = %e, "Failed to process");
                    BatchFileStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };

            let (rows, error) = match &status {
                BatchFileStatus::Success { rows } => (*rows, None),
                BatchFileStatus::Failed { error } => (0, Some(error.clone())),
            };
            observer(&BatchEvent::DocumentFinished {
                index,
                total,
                name,
                rows,
                error,
            });

            results.push(BatchFileResult {
                file: file_name(pdf_path),
                output,
                status,
            });
        }

        let successful = results
            .iter()
            .filter(|r| matches!(r.status, BatchFileStatus::Success { .. }))
            .count();
        tracing::info!(
            successful,
            failed = results.len() - successful,
            "Batch processing complete"
        );

        Ok(results)
    }
}

fn summary(
    file: String,
    status: ProcessingStatus,
    method: &str,
    rows: usize,
    text_length: usize,
    error: Option<String>,
) -> ProcessingSummary {
    ProcessingSummary {
        file,
        status,
        method: method.to_string(),
        rows,
        text_length,
        error,
    }
}

/// File stem used to name a document's rows and outputs.
pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// PDFs directly inside a directory (`.pdf` or `.PDF`), sorted by path.
pub fn collect_pdfs(dir: &Path) -> Result<Vec<PathBuf>, ProcessingError> {
    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "pdf" || e == "PDF");
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AttributeCatalog;
    use crate::ocr::ExtractionError;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const GOOD_TEXT: &str = "\
Gas detector data sheet for the offshore platform module
Tag 11-18-XTGD-5403 located at the wellhead area
Range 0-50 ppm hydrogen sulphide detection
Supply 24 VDC nominal
";

    /// Direct text keyed by file stem; `None` means the document cannot be opened.
    struct FakeExtractor(HashMap<String, Option<String>>);

    impl DirectExtractor for FakeExtractor {
        fn extract_text(&self, pdf_path: &Path) -> Result<String, ExtractionError> {
            match self.0.get(&document_name(pdf_path)) {
                Some(Some(text)) => Ok(text.clone()),
                Some(None) => Err(ExtractionError::ExtractionFailed("corrupt".to_string())),
                None => Ok(String::new()),
            }
        }

        fn is_likely_scanned(&self, _pdf_path: &Path) -> bool {
            false
        }
    }

    struct SilentRecognizer;

    impl Recognizer for SilentRecognizer {
        fn recognize(&self, _pdf_path: &Path) -> String {
            String::new()
        }
    }

    fn processor(texts: &[(&str, Option<&str>)], catalog: AttributeCatalog) -> DocumentProcessor {
        let map = texts
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect();
        DocumentProcessor::new(
            Box::new(FakeExtractor(map)),
            Box::new(SilentRecognizer),
            StrategyConfig::default(),
            StructuringEngine::new(catalog).unwrap(),
        )
    }

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        path
    }

    #[test]
    fn test_process_single_success() {
        let temp = TempDir::new().unwrap();
        let pdf = touch(&temp, "P11569-11-99-40-2619.pdf");
        let processor = processor(
            &[("P11569-11-99-40-2619", Some(GOOD_TEXT))],
            AttributeCatalog::default(),
        );

        let rows = processor.process_single(&pdf).unwrap();
        assert_eq!(rows.source, "P11569-11-99-40-2619");
        assert!(rows.len() > 15);
        assert!(rows
            .rows
            .iter()
            .all(|r| r.document_reference == "P11569-11-99-40-2619-1"));
    }

    #[test]
    fn test_process_single_no_text_surfaces() {
        let temp = TempDir::new().unwrap();
        let pdf = touch(&temp, "scan.pdf");
        let processor = processor(&[], AttributeCatalog::default());

        assert!(matches!(
            processor.process_single(&pdf),
            Err(ProcessingError::NoExtractableText { forced_ocr: false })
        ));
    }

    #[test]
    fn test_process_single_missing_file() {
        let processor = processor(&[], AttributeCatalog::default());
        assert!(matches!(
            processor.process_single(Path::new("/nonexistent/doc.pdf")),
            Err(ProcessingError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_process_single_falls_back_to_sample() {
        let temp = TempDir::new().unwrap();
        let pdf = touch(&temp, "doc.pdf");
        let catalog = AttributeCatalog {
            templates: Vec::new(),
            ..AttributeCatalog::default()
        };
        // long enough to pass the threshold, no keywords so nothing is scanned
        let text = "This brochure describes nothing in particular about the product line at all.";
        let processor = processor(&[("doc", Some(text))], catalog);

        let rows = processor.process_single(&pdf).unwrap();
        assert_eq!(rows.len(), 15);
        assert_eq!(rows.rows[0].functional_location, "11-18-XTGD-5404");
    }

    #[test]
    fn test_combined_statuses() {
        let temp = TempDir::new().unwrap();
        let good = touch(&temp, "good.pdf");
        let scan = touch(&temp, "scan.pdf");
        let broken = touch(&temp, "broken.pdf");
        let missing = temp.path().join("missing.pdf");

        let processor = processor(
            &[("good", Some(GOOD_TEXT)), ("broken", None)],
            AttributeCatalog::default(),
        );

        let mut events = Vec::new();
        let outcome = processor
            .process_combined(&[good, scan, broken, missing], |e| events.push(e.clone()))
            .unwrap();

        let statuses: Vec<ProcessingStatus> =
            outcome.summaries.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            [
                ProcessingStatus::Success,
                ProcessingStatus::FailedWithSample,
                ProcessingStatus::ErrorWithSample,
                ProcessingStatus::CompleteFailure,
            ]
        );

        assert_eq!(outcome.summaries[0].method, "text_extraction");
        assert_eq!(outcome.summaries[1].method, "fallback");
        assert_eq!(outcome.summaries[1].rows, 15);
        assert!(outcome.summaries[2].error.as_deref().unwrap().contains("corrupt"));
        assert_eq!(outcome.summaries[3].rows, 0);
        assert!(outcome.summaries[3].error.is_some());

        let sources: Vec<&str> = outcome.documents.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(sources, ["good", "scan", "broken"]);
        assert_eq!(outcome.tally(), (1, 2, 1));
        assert_eq!(events.len(), 8);
    }

    #[test]
    fn test_combined_sample_data_status() {
        let temp = TempDir::new().unwrap();
        let pdf = touch(&temp, "plain.pdf");
        let catalog = AttributeCatalog {
            templates: Vec::new(),
            ..AttributeCatalog::default()
        };
        let text = "This brochure describes nothing in particular about the product line at all, \
                    and it keeps going for a while so the text is long enough to be accepted.";
        let processor = processor(&[("plain", Some(text))], catalog);

        let outcome = processor.process_combined(&[pdf], |_| {}).unwrap();
        let summary = &outcome.summaries[0];
        assert_eq!(summary.status, ProcessingStatus::SampleData);
        assert_eq!(summary.method, "fallback");
        assert_eq!(summary.text_length, 0);
        assert_eq!(summary.rows, 15);
    }

    #[test]
    fn test_combined_batch_empty() {
        let temp = TempDir::new().unwrap();
        let pdf = touch(&temp, "scan.pdf");
        let catalog = AttributeCatalog {
            sample_templates: Vec::new(),
            ..AttributeCatalog::default()
        };
        let processor = processor(&[], catalog);

        assert!(matches!(
            processor.process_combined(&[pdf], |_| {}),
            Err(ProcessingError::BatchEmpty)
        ));
    }

    #[test]
    fn test_collect_pdfs_sorted_both_cases() {
        let temp = TempDir::new().unwrap();
        touch(&temp, "b.pdf");
        touch(&temp, "A.PDF");
        touch(&temp, "notes.txt");
        std::fs::create_dir(temp.path().join("dir.pdf")).unwrap();

        let names: Vec<String> = collect_pdfs(temp.path())
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, ["A.PDF", "b.pdf"]);
    }

    #[test]
    fn test_process_directory() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        touch(&input, "good.pdf");
        touch(&input, "scan.pdf");
        let out_dir = output.path().join("xlsx");

        let processor = processor(&[("good", Some(GOOD_TEXT))], AttributeCatalog::default());
        let results = processor
            .process_directory(input.path(), &out_dir, &XlsxWriter::default(), |_| {})
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(matches!(results[0].status, BatchFileStatus::Success { rows } if rows > 15));
        assert!(results[0].output.exists());
        assert!(matches!(results[1].status, BatchFileStatus::Failed { .. }));
        assert!(!results[1].output.exists());
    }

    #[test]
    fn test_process_directory_missing_input() {
        let output = TempDir::new().unwrap();
        let processor = processor(&[], AttributeCatalog::default());
        assert!(matches!(
            processor.process_directory(
                Path::new("/nonexistent/input"),
                output.path(),
                &XlsxWriter::default(),
                |_| {}
            ),
            Err(ProcessingError::InputDirNotFound(_))
        ));
    }

    #[test]
    fn test_process_directory_empty() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let processor = processor(&[], AttributeCatalog::default());
        let results = processor
            .process_directory(input.path(), output.path(), &XlsxWriter::default(), |_| {})
            .unwrap();
        assert!(results.is_empty());
    }
}
