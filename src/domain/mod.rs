//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw workbook input (`Workbook`, `Sheet`, `Cell`)
//! - the reconciled numeric model (`SheetTable`, `ComparisonPeriod`)
//! - value coercion and column ordering
//! - analysis outputs (`PlRow`, `PlTotals`, `SpreadRecord`)

pub mod coerce;
pub mod ordering;
pub mod types;

pub use coerce::*;
pub use ordering::*;
pub use types::*;
