//! CLI parser and dispatch.

mod commands;
mod helpers;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use datasheet_extract::config::Config;
use datasheet_extract::output::XlsxWriter;

#[derive(Parser)]
#[command(name = "dsx")]
#[command(about = "Extract equipment attribute tables from PDF data sheets into spreadsheets")]
#[command(version)]
pub struct Cli {
    /// PDF file, directory of PDFs, or comma-separated PDFs (with --combine)
    #[arg(required_unless_present = "check_tools")]
    input: Option<String>,

    /// Output spreadsheet (or directory with --batch)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force OCR even when the PDF has a text layer
    #[arg(long)]
    ocr: bool,

    /// Write one spreadsheet per PDF in the input directory
    #[arg(long, conflicts_with = "combine")]
    batch: bool,

    /// Combine all input PDFs into a single spreadsheet
    #[arg(long)]
    combine: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, env = "DSX_CONFIG")]
    config: Option<PathBuf>,

    /// Report which external tools are installed and exit
    #[arg(long)]
    check_tools: bool,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.check_tools {
        return commands::cmd_check_tools();
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .await
            .map_err(anyhow::Error::msg)?,
        None => Config::load().await,
    };

    let input = cli.input.context("No input given")?;
    let processor = commands::build_processor(&config, cli.ocr)?;
    let writer = XlsxWriter::new(config.output.clone());

    if cli.combine {
        commands::cmd_combine(&processor, &writer, &input, cli.output)
    } else if cli.batch {
        commands::cmd_batch(&processor, &writer, &input, cli.output)
    } else {
        commands::cmd_single(&processor, &writer, &input, cli.output)
    }
}
