//! Per-document processing summaries for combined runs.

use serde::{Deserialize, Serialize};

/// Outcome of processing one document in a combined run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Success,
    SampleData,
    FailedWithSample,
    ErrorWithSample,
    CompleteFailure,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::SampleData => "sample_data",
            Self::FailedWithSample => "failed_with_sample",
            Self::ErrorWithSample => "error_with_sample",
            Self::CompleteFailure => "complete_failure",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "sample_data" => Some(Self::SampleData),
            "failed_with_sample" => Some(Self::FailedWithSample),
            "error_with_sample" => Some(Self::ErrorWithSample),
            "complete_failure" => Some(Self::CompleteFailure),
            _ => None,
        }
    }

    /// Whether rows for this document came from the sample table.
    pub fn used_sample(&self) -> bool {
        matches!(
            self,
            Self::SampleData | Self::FailedWithSample | Self::ErrorWithSample
        )
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary line for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub file: String,
    pub status: ProcessingStatus,
    /// Extraction method label, `fallback` for sample rows or `none`.
    pub method: String,
    pub rows: usize,
    pub text_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingSummary {
    /// Status icon used in the end-of-run report.
    pub fn icon(&self) -> &'static str {
        match self.status {
            ProcessingStatus::Success => "✓",
            s if s.used_sample() => "⚠",
            _ => "✗",
        }
    }
}
