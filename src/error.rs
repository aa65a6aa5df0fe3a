//! Error types.
//!
//! Ingestion failures are fatal: the caller surfaces the `Display` message and
//! must not run any downstream analysis on partial results. Undetected spread
//! legs are not an error (see `analysis::spread::SpreadOutcome`).

use thiserror::Error;

/// Result type for ingestion.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors raised while reconciling the price and quantity sheets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// No price or quantity sheet could be resolved from the workbook.
    #[error("Could not resolve a price or quantity sheet from the workbook.")]
    MissingSheet,

    /// A resolved sheet has no rows at all.
    #[error("Sheet '{sheet}' is empty.")]
    EmptyData {
        /// Name of the empty sheet.
        sheet: String,
    },

    /// Fewer than two date columns are shared by the two sheets.
    #[error(
        "Price and quantity sheets need at least two common date columns (found {}: [{}]).",
        common.len(),
        common.join(", ")
    )]
    InsufficientDates {
        /// The common columns that were found.
        common: Vec<String>,
    },

    /// A tenor label appears twice under `MergePolicy::RejectDuplicates`.
    #[error("Duplicate tenor '{tenor}' in sheet '{sheet}'.")]
    DuplicateTenor {
        /// Sheet containing the duplicate.
        sheet: String,
        /// The repeated tenor label.
        tenor: String,
    },

    /// The CSV adapter could not read a sheet.
    #[error("Failed to read sheet '{sheet}' as CSV: {message}")]
    Csv {
        /// Sheet being read.
        sheet: String,
        /// Underlying parser message.
        message: String,
    },
}

/// Errors raised while resolving configuration overrides.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment override could not be parsed.
    #[error("Invalid value '{value}' for {key} (expected {expected}).")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Errors raised while rendering a report.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write report JSON: {0}")]
    Json(#[from] serde_json::Error),
}
