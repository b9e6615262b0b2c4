//! Text quality analysis.

pub mod quality;

pub use quality::{assess_scan_sample, is_low_quality, LowQualityReason, ScanVerdict};
