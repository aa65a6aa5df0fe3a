//! `tenor-pnl` library crate.
//!
//! Reconciles a two-sheet price/quantity export into a date-indexed numeric
//! model and derives position P/L between two snapshot columns:
//!
//! - per-tenor hold vs actual P/L
//! - front vs 3-month spread P/L
//! - a tenor × tenor attribution matrix (placeholder distribution)
//!
//! Presentation is out of scope; `pipeline::AnalysisReport` is the hand-off.

pub mod analysis;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod pipeline;
