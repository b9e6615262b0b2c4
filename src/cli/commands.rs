//! CLI commands implementation.

use std::path::{Path, PathBuf};

use anyhow::Context;
use console::style;

use datasheet_extract::config::Config;
use datasheet_extract::models::ProcessingStatus;
use datasheet_extract::ocr::{OcrBackend, OcrRecognizer, TesseractBackend, TextExtractor};
use datasheet_extract::output::XlsxWriter;
use datasheet_extract::services::{
    BatchEvent, BatchFileStatus, DocumentProcessor, ProcessingError, StructuringEngine,
};

use super::helpers::{
    collect_inputs, default_single_output, document_progress, spinner, truncate,
};

const DEFAULT_COMBINED_OUTPUT: &str = "combined_output.xlsx";
const DEFAULT_BATCH_OUTPUT_DIR: &str = "output";

/// Wire the Poppler extractor, Tesseract recognizer and catalog together.
pub fn build_processor(config: &Config, force_ocr: bool) -> anyhow::Result<DocumentProcessor> {
    let catalog = config
        .load_catalog()
        .context("Failed to load attribute catalog")?;
    let engine = StructuringEngine::new(catalog).context("Invalid attribute catalog")?;

    Ok(DocumentProcessor::new(
        Box::new(TextExtractor::new()),
        Box::new(OcrRecognizer::new(&config.ocr)),
        config.extraction.clone(),
        engine,
    )
    .with_force_ocr(force_ocr))
}

/// Process one PDF into one spreadsheet.
pub fn cmd_single(
    processor: &DocumentProcessor,
    writer: &XlsxWriter,
    input: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let pdf_path = Path::new(input);
    let output = output.unwrap_or_else(|| default_single_output(pdf_path));

    let pb = spinner(format!("Processing {}", pdf_path.display()));
    let result = processor.process_single(pdf_path);
    pb.finish_and_clear();

    let rows = result.with_context(|| format!("Failed to process {}", pdf_path.display()))?;
    writer
        .write_attributes(&rows.rows, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} Wrote {} rows to {}",
        style("✓").green(),
        rows.len(),
        output.display()
    );
    Ok(())
}

/// Process every PDF in a directory into its own spreadsheet.
pub fn cmd_batch(
    processor: &DocumentProcessor,
    writer: &XlsxWriter,
    input: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let input_dir = Path::new(input);
    let output_dir = output.unwrap_or_else(|| PathBuf::from(DEFAULT_BATCH_OUTPUT_DIR));

    let pb = document_progress(0);
    let results = processor.process_directory(input_dir, &output_dir, writer, |event| {
        progress_observer(&pb, event)
    })?;
    pb.finish_and_clear();

    if results.is_empty() {
        println!(
            "{} No PDF files found in {}",
            style("!").yellow(),
            input_dir.display()
        );
        return Ok(());
    }

    println!("\n{}", style("Batch Results").bold());
    println!("{}", "-".repeat(50));
    let mut successful = 0;
    for result in &results {
        match &result.status {
            BatchFileStatus::Success { rows } => {
                successful += 1;
                println!(
                    "  {} {} → {} ({} rows)",
                    style("✓").green(),
                    result.file,
                    result.output.display(),
                    rows
                );
            }
            BatchFileStatus::Failed { error } => {
                println!("  {} {}: {}", style("✗").red(), result.file, error);
            }
        }
    }
    println!(
        "\n{} successful, {} failed",
        style(successful).green(),
        style(results.len() - successful).red()
    );
    Ok(())
}

/// Process many PDFs into one combined spreadsheet.
pub fn cmd_combine(
    processor: &DocumentProcessor,
    writer: &XlsxWriter,
    input: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let pdfs = collect_inputs(input)?;
    if pdfs.is_empty() {
        anyhow::bail!("No PDF files found in {}", input);
    }
    let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_COMBINED_OUTPUT));

    println!("Combining {} PDF files", style(pdfs.len()).cyan());

    let pb = document_progress(pdfs.len());
    let result = processor.process_combined(&pdfs, |event| progress_observer(&pb, event));
    pb.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(ProcessingError::BatchEmpty) => {
            anyhow::bail!("No structured data could be created from any PDF")
        }
        Err(e) => return Err(e.into()),
    };

    writer
        .write_combined(&outcome.documents, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("\n{}", style("Processing Summary").bold());
    println!("{}", "-".repeat(50));
    for summary in &outcome.summaries {
        let icon = match summary.status {
            ProcessingStatus::Success => style(summary.icon()).green(),
            s if s.used_sample() => style(summary.icon()).yellow(),
            _ => style(summary.icon()).red(),
        };
        let detail = match summary.status {
            ProcessingStatus::Success => {
                format!("{} rows via {}", summary.rows, summary.method)
            }
            ProcessingStatus::CompleteFailure => {
                summary.error.clone().unwrap_or_else(|| "failed".to_string())
            }
            _ => format!("{} sample rows", summary.rows),
        };
        println!(
            "  {} {:<40} {:<20} {}",
            icon,
            truncate(&summary.file, 40),
            summary.status,
            detail
        );
    }

    let (successful, with_sample, failed) = outcome.tally();
    println!(
        "\n{} successful, {} with sample data, {} failed",
        style(successful).green(),
        style(with_sample).yellow(),
        style(failed).red()
    );
    println!(
        "{} Wrote {} rows to {}",
        style("✓").green(),
        outcome.total_rows(),
        output.display()
    );
    Ok(())
}

fn progress_observer(pb: &indicatif::ProgressBar, event: &BatchEvent) {
    match event {
        BatchEvent::DocumentStarted { total, name, .. } => {
            pb.set_length(*total as u64);
            pb.set_message(truncate(name, 40));
        }
        BatchEvent::DocumentFinished { name, error, .. } => {
            if let Some(error) = error {
                pb.println(format!(
                    "  {} {}: {}",
                    style("!").yellow(),
                    name,
                    truncate(error, 80)
                ));
            }
            pb.inc(1);
        }
    }
}

/// Print the status of the external tools.
pub fn cmd_check_tools() -> anyhow::Result<()> {
    println!("\n{}", style("Tool Status").bold());
    println!("{}", "-".repeat(50));

    let mut all_found = true;
    for (tool, available) in TextExtractor::check_tools() {
        let status = if available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool, status);
    }

    let tesseract = TesseractBackend::new();
    if !tesseract.is_available() {
        println!("\n  {}", style(tesseract.availability_hint()).dim());
    }

    if all_found {
        println!("\n{}", style("All tools available.").green());
    } else {
        println!(
            "\n{}",
            style("Text extraction needs poppler-utils; OCR also needs tesseract-ocr.").yellow()
        );
    }
    Ok(())
}
