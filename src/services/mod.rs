//! Service layer for datasheet processing.
//!
//! This module contains domain logic separated from UI concerns.
//! Services report progress through events and never print.

pub mod batch;
mod error;
pub mod strategy;
pub mod structuring;

pub use batch::{
    collect_pdfs, document_name, BatchEvent, BatchFileResult, BatchFileStatus, CombineOutcome,
    DocumentProcessor,
};
pub use error::ProcessingError;
pub use strategy::{ProcessingMode, StrategyConfig, StrategySelector};
pub use structuring::{StructuredRows, StructuringEngine};
