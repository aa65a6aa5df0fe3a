//! Render an analysis report as JSON for the presentation layer.
//!
//! Undefined attribution cells (the diagonal) come out as `null`.

use std::io::Write;

use crate::error::ExportError;
use crate::pipeline::AnalysisReport;

/// Write the report as pretty-printed JSON.
pub fn write_report_json<W: Write>(writer: W, report: &AnalysisReport) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Render the report as a JSON value.
pub fn report_to_json(report: &AnalysisReport) -> Result<serde_json::Value, ExportError> {
    Ok(serde_json::to_value(report)?)
}
