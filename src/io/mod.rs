//! Input/output helpers.
//!
//! - workbook ingest + reconciliation (`ingest`)
//! - CSV text -> sheet (`sheet`)
//! - report JSON rendering (`export`)

pub mod export;
pub mod ingest;
pub mod sheet;

pub use export::*;
pub use ingest::*;
pub use sheet::*;
