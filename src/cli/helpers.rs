//! Shared helper functions for CLI commands.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use datasheet_extract::services::{collect_pdfs, document_name};

/// Resolve the combine input: a directory of PDFs or a comma-separated list.
pub fn collect_inputs(input: &str) -> anyhow::Result<Vec<PathBuf>> {
    let path = Path::new(input);
    if path.is_dir() {
        return Ok(collect_pdfs(path)?);
    }

    Ok(input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Single-document output: `<stem>.xlsx` in the working directory.
pub fn default_single_output(pdf_path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.xlsx", document_name(pdf_path)))
}

/// Truncate a string for display, appending "..." when cut.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Progress bar in the style used across commands.
pub fn document_progress(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb
}

/// Spinner for single-document work.
pub fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
