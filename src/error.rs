use chrono::NaiveDate;
use thiserror::Error;

/// Failures raised while producing a sales report.
///
/// Every variant carries a message that is safe to surface verbatim to the
/// dashboard user; the orchestrator additionally logs the error for
/// operators before converting it to a flash message.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The dataset declares no column matching the candidate list.
    #[error("no {kind} column found; expected one of: {candidates:?}")]
    ColumnNotFound {
        kind: &'static str,
        candidates: &'static [&'static str],
    },

    /// A cell in the filtered range could not be coerced.
    #[error("cannot parse {column} value {value:?} in row {row}")]
    BadCell {
        row: usize,
        column: String,
        value: String,
    },

    /// A submitted date string was not ISO `YYYY-MM-DD`.
    #[error("invalid date {0:?}; expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The requested range is reversed. Reversed ranges are rejected
    /// rather than silently swapped.
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The sheet source was unreachable or yielded no rows.
    #[error("the sheet source returned no data")]
    EmptyDataset,

    /// Aggregation produced blank report text.
    #[error("the generated report is empty")]
    EmptyReport,

    /// Reading the spreadsheet source failed.
    #[error("failed to read sheet source: {0}")]
    Ingest(String),

    /// Persisting the dataset snapshot failed.
    #[error("failed to save dataset snapshot: {0}")]
    Snapshot(#[source] std::io::Error),

    /// Chart image generation failed.
    #[error("failed to render chart: {0}")]
    Chart(String),

    /// PDF generation failed or its inputs were missing.
    #[error("failed to render report document: {0}")]
    Render(String),
}
