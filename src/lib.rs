//! datasheet-extract - equipment data sheet extraction.
//!
//! Turns vendor data sheets (text-based or scanned PDFs) into equipment
//! attribute tables and writes them as spreadsheets.

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod models;
pub mod ocr;
pub mod output;
pub mod services;
