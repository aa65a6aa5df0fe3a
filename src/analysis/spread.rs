//! Front vs 3-month spread analysis.
//!
//! The two legs are found by substring match on the tenor labels. If either
//! leg is missing the outcome is `Undetected`, which is a display condition
//! and never stops the other analyses.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analysis::pnl::tenor_universe;
use crate::domain::{ComparisonPeriod, SheetTable, SpreadRecord, coerce};

/// Label patterns for the two legs (case-insensitive substrings).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegPatterns {
    pub front: String,
    pub three_month: String,
}

impl Default for LegPatterns {
    fn default() -> Self {
        Self {
            front: "cash".to_string(),
            three_month: "3m".to_string(),
        }
    }
}

/// Result of a spread analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpreadOutcome {
    Detected(SpreadRecord),
    /// At least one leg was not found; carries whichever leg was.
    Undetected {
        front: Option<String>,
        three_month: Option<String>,
    },
}

impl SpreadOutcome {
    pub fn record(&self) -> Option<&SpreadRecord> {
        match self {
            SpreadOutcome::Detected(r) => Some(r),
            SpreadOutcome::Undetected { .. } => None,
        }
    }

    /// Explanation for an empty spread view.
    pub fn message(&self) -> Option<String> {
        let SpreadOutcome::Undetected { front, three_month } = self else {
            return None;
        };
        let missing: Vec<&str> = [("front (cash)", front), ("3-month", three_month)]
            .into_iter()
            .filter(|(_, found)| found.is_none())
            .map(|(name, _)| name)
            .collect();
        Some(format!(
            "Spread legs not found: {}. Check the tenor labels.",
            missing.join(", ")
        ))
    }
}

/// Find the (front, 3-month) tenors. The last matching tenor wins for each leg.
pub fn detect_legs(
    price: &SheetTable,
    qty: &SheetTable,
    patterns: &LegPatterns,
) -> (Option<String>, Option<String>) {
    let front_pat = patterns.front.trim().to_lowercase();
    let m3_pat = patterns.three_month.trim().to_lowercase();

    let mut front = None;
    let mut three_month = None;
    for tenor in tenor_universe(price, qty) {
        let lower = tenor.to_lowercase();
        if label_matches(&lower, &front_pat) {
            front = Some(tenor.to_string());
        }
        if label_matches(&lower, &m3_pat) {
            three_month = Some(tenor.to_string());
        }
    }
    (front, three_month)
}

/// A blank pattern matches nothing.
fn label_matches(label: &str, pattern: &str) -> bool {
    !pattern.is_empty() && label.contains(pattern)
}

/// Hedged spread size: `min(|front|, |3m|)` when the legs oppose each other, else 0.
pub fn spread_quantity(front_qty: f64, three_month_qty: f64) -> f64 {
    if front_qty * three_month_qty < 0.0 {
        front_qty.abs().min(three_month_qty.abs())
    } else {
        0.0
    }
}

/// Compute spread P/L between the detected legs.
pub fn analyze_spread(
    price: &SheetTable,
    qty: &SheetTable,
    period: &ComparisonPeriod,
    patterns: &LegPatterns,
) -> SpreadOutcome {
    let (front, three_month) = match detect_legs(price, qty, patterns) {
        (Some(f), Some(m)) => (f, m),
        (front, three_month) => {
            warn!(
                front = ?front,
                three_month = ?three_month,
                "spread legs not detected"
            );
            return SpreadOutcome::Undetected { front, three_month };
        }
    };

    let spread_at = |date: &str| coerce(price, &front, date, 0.0) - coerce(price, &three_month, date, 0.0);
    let qty_at = |date: &str| spread_quantity(coerce(qty, &front, date, 0.0), coerce(qty, &three_month, date, 0.0));

    let spread_start = spread_at(&period.start);
    let spread_end = spread_at(&period.end);
    let spread_change = spread_end - spread_start;
    let spread_qty_start = qty_at(&period.start);
    let spread_qty_end = qty_at(&period.end);

    SpreadOutcome::Detected(SpreadRecord {
        front,
        three_month,
        spread_start,
        spread_end,
        spread_change,
        spread_qty_start,
        spread_qty_end,
        pl_hold: spread_qty_start * spread_change,
        pl_actual: spread_qty_end * spread_change,
    })
}
