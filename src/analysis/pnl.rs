//! Per-tenor hold vs actual P/L.
//!
//! For each tenor present in both tables:
//!
//! `hold   = qty(start) × (price(end) − price(start))`
//! `actual = qty(end)   × (price(end) − price(start))`
//!
//! Rows come back in price-table order; nothing is sorted.

use tracing::warn;

use crate::domain::{ComparisonPeriod, NetPositionCheck, PlRow, PlTotals, SheetTable, coerce};

/// Tenors present in both tables, in price-table order.
pub fn tenor_universe<'a>(price: &'a SheetTable, qty: &SheetTable) -> Vec<&'a str> {
    price.tenors().filter(|t| qty.contains(t)).collect()
}

/// Compute one `PlRow` per shared tenor.
pub fn calculate_pl_rows(price: &SheetTable, qty: &SheetTable, period: &ComparisonPeriod) -> Vec<PlRow> {
    tenor_universe(price, qty)
        .into_iter()
        .map(|tenor| {
            let qty_start = coerce(qty, tenor, &period.start, 0.0);
            let qty_end = coerce(qty, tenor, &period.end, 0.0);
            let price_start = coerce(price, tenor, &period.start, 0.0);
            let price_end = coerce(price, tenor, &period.end, 0.0);

            let price_change = price_end - price_start;

            PlRow {
                tenor: tenor.to_string(),
                qty_start,
                qty_end,
                price_start,
                price_end,
                price_change,
                hold_pl: qty_start * price_change,
                actual_pl: qty_end * price_change,
            }
        })
        .collect()
}

/// Sum quantities and P/L over all rows.
pub fn totals(rows: &[PlRow]) -> PlTotals {
    rows.iter().fold(PlTotals::default(), |acc, r| PlTotals {
        qty_start: acc.qty_start + r.qty_start,
        qty_end: acc.qty_end + r.qty_end,
        hold_pl: acc.hold_pl + r.hold_pl,
        actual_pl: acc.actual_pl + r.actual_pl,
    })
}

/// Check whether the book nets to zero at both dates (a calendar-spread book should).
pub fn check_net_position(rows: &[PlRow], tolerance: f64) -> NetPositionCheck {
    let t = totals(rows);
    let balanced = t.qty_start.abs() <= tolerance && t.qty_end.abs() <= tolerance;
    if !balanced {
        warn!(
            qty_start = t.qty_start,
            qty_end = t.qty_end,
            "summed position quantity does not net to zero"
        );
    }
    NetPositionCheck {
        qty_start: t.qty_start,
        qty_end: t.qty_end,
        balanced,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn tables() -> (SheetTable, SheetTable) {
        let price = SheetTable::from_rows([
            ("Cash", vec![("Jan", 100.0), ("Feb", 110.0)]),
            ("3M", vec![("Jan", 95.0), ("Feb", 108.0)]),
            ("Jun-25", vec![("Jan", 90.0)]),
        ]);
        let qty = SheetTable::from_rows([
            ("3M", vec![("Jan", -50.0), ("Feb", 30.0)]),
            ("Cash", vec![("Jan", 50.0), ("Feb", -20.0)]),
            ("Dec-25", vec![("Jan", 5.0)]),
        ]);
        (price, qty)
    }

    #[test]
    fn universe_is_intersection_in_price_order() {
        let (price, qty) = tables();
        assert_eq!(tenor_universe(&price, &qty), vec!["Cash", "3M"]);
    }

    #[test]
    fn rows_follow_the_formulas() {
        let (price, qty) = tables();
        let period = ComparisonPeriod::new("Jan", "Feb");
        let rows = calculate_pl_rows(&price, &qty, &period);

        let cash = &rows[0];
        assert_eq!(cash.tenor, "Cash");
        assert_relative_eq!(cash.price_change, 10.0);
        assert_relative_eq!(cash.hold_pl, 500.0);
        assert_relative_eq!(cash.actual_pl, -200.0);
        assert_relative_eq!(cash.strategy_effect(), -700.0);

        let m3 = &rows[1];
        assert_relative_eq!(m3.hold_pl, -650.0);
        assert_relative_eq!(m3.actual_pl, 390.0);
    }

    #[test]
    fn missing_cells_default_to_zero() {
        let price = SheetTable::from_rows([("X", vec![("Jan", 10.0)])]);
        let qty = SheetTable::from_rows([("X", vec![("Feb", 3.0)])]);
        let rows = calculate_pl_rows(&price, &qty, &ComparisonPeriod::new("Jan", "Feb"));

        assert_eq!(rows[0].qty_start, 0.0);
        assert_eq!(rows[0].price_end, 0.0);
        assert_relative_eq!(rows[0].price_change, -10.0);
        assert_relative_eq!(rows[0].actual_pl, -30.0);
        assert_eq!(rows[0].hold_pl, 0.0);
    }

    #[test]
    fn totals_sum_rows() {
        let (price, qty) = tables();
        let rows = calculate_pl_rows(&price, &qty, &ComparisonPeriod::new("Jan", "Feb"));
        let t = totals(&rows);

        assert_relative_eq!(t.hold_pl, rows.iter().map(|r| r.hold_pl).sum::<f64>());
        assert_relative_eq!(t.actual_pl, rows.iter().map(|r| r.actual_pl).sum::<f64>());
        assert_relative_eq!(t.strategy_effect(), t.actual_pl - t.hold_pl);
        assert_relative_eq!(t.qty_start, 0.0);
        assert_relative_eq!(t.qty_end, 10.0);
    }

    #[test]
    fn net_position_flags_imbalance() {
        let (price, qty) = tables();
        let rows = calculate_pl_rows(&price, &qty, &ComparisonPeriod::new("Jan", "Feb"));
        let check = check_net_position(&rows, 0.01);
        assert!(!check.balanced);
        assert_relative_eq!(check.qty_end, 10.0);

        assert!(check_net_position(&rows[..0], 0.01).balanced);
    }
}
