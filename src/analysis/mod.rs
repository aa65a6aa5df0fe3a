//! Analyses over the reconciled tables.
//!
//! - per-tenor hold/actual P/L and totals (`pnl`)
//! - front vs 3-month spread P/L (`spread`)
//! - tenor × tenor attribution matrix and pair ranking (`attribution`)

pub mod attribution;
pub mod pnl;
pub mod spread;

pub use attribution::*;
pub use pnl::*;
pub use spread::*;
