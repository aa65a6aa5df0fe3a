//! Column ordering used to pick the comparison period.
//!
//! The default is plain string ordering over the column labels: "Feb" sorts
//! before "Jan". `Calendar` is available for exports whose headers are real
//! dates.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A total order over column labels.
pub trait ColumnOrdering {
    fn compare(&self, a: &str, b: &str) -> Ordering;

    fn sort(&self, columns: &mut [String]) {
        columns.sort_by(|a, b| self.compare(a, b));
    }
}

/// Selectable built-in orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnOrder {
    #[default]
    Lexicographic,
    Calendar,
}

impl ColumnOrdering for ColumnOrder {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            ColumnOrder::Lexicographic => a.cmp(b),
            ColumnOrder::Calendar => calendar_compare(a, b),
        }
    }
}

impl std::str::FromStr for ColumnOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexicographic" | "lexical" | "string" => Ok(ColumnOrder::Lexicographic),
            "calendar" | "date" => Ok(ColumnOrder::Calendar),
            other => Err(format!("unknown column order '{other}'")),
        }
    }
}

/// Parseable labels first (by date), then the rest by string order.
fn calendar_compare(a: &str, b: &str) -> Ordering {
    match (parse_column_date(a), parse_column_date(b)) {
        (Some(da), Some(db)) => da.cmp(&db).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Best-effort date parse for a column header.
///
/// Full dates are tried first; month labels such as `Jan-25` or `Jan 2025`
/// resolve to the first of the month.
pub fn parse_column_date(label: &str) -> Option<NaiveDate> {
    const FULL: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%Y%m%d"];
    const MONTH: [&str; 4] = ["%d-%b-%y", "%d-%b-%Y", "%d %b %Y", "%d %B %Y"];

    let label = label.trim();
    for fmt in FULL {
        if let Ok(d) = NaiveDate::parse_from_str(label, fmt) {
            return Some(d);
        }
    }
    // Timestamp headers ("2025-01-31 00:00:00") from pandas-style exports.
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(label, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    let with_day = format!("01-{label}");
    let with_day_space = format!("01 {label}");
    for fmt in MONTH {
        let candidate = if fmt.contains('-') { &with_day } else { &with_day_space };
        if let Ok(d) = NaiveDate::parse_from_str(candidate, fmt) {
            return Some(d);
        }
    }
    None
}
