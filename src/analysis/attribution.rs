//! Tenor × tenor P/L attribution matrix.
//!
//! The cell values are a **placeholder**: each off-diagonal cell redistributes
//! the average of the two tenors' P/L with a random scale in `[0.3, 1.5)` and a
//! random sign. It is not an economic hedge attribution. The formula sits
//! behind `AttributionStrategy` so a real algorithm can replace it without
//! touching callers.
//!
//! Every build draws fresh values. `Diff` is the element-wise difference of an
//! independently drawn `Actual` matrix and an independently drawn `Hold`
//! matrix, so it is not consistent with the other two views.

use std::cmp::Ordering;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{PlBasis, PlRow, Strategy};

/// Fills the off-diagonal cells of an attribution matrix.
pub trait AttributionStrategy {
    /// Value attributed to the pair (`from`, `to`) under `basis`. Never called with `from == to`.
    fn pair_value(&mut self, from: &PlRow, to: &PlRow, basis: PlBasis) -> f64;
}

/// The random redistribution placeholder, driven by an injected generator.
#[derive(Debug, Clone)]
pub struct RandomRedistribution<R> {
    rng: R,
}

impl<R: Rng> RandomRedistribution<R> {
    pub const FACTOR_MIN: f64 = 0.3;
    pub const FACTOR_MAX: f64 = 1.5;

    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: Rng> AttributionStrategy for RandomRedistribution<R> {
    fn pair_value(&mut self, from: &PlRow, to: &PlRow, basis: PlBasis) -> f64 {
        let base = (from.pl(basis) + to.pl(basis)) / 2.0;
        let factor = self.rng.gen_range(Self::FACTOR_MIN..Self::FACTOR_MAX);
        let sign = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        base * factor * sign
    }
}

/// Square matrix over the tenor order of the input rows. Diagonal cells are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionMatrix {
    pub strategy: Strategy,
    pub tenors: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
    /// Largest absolute defined cell, floored to 1 when there is none or it is 0.
    pub max_abs: f64,
}

/// One off-diagonal cell in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairAttribution {
    pub rank: usize,
    pub from: String,
    pub to: String,
    pub value: f64,
}

/// Pairs ranked by absolute value, plus the sum over *all* pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRanking {
    pub entries: Vec<PairAttribution>,
    pub total: f64,
}

impl AttributionMatrix {
    pub fn len(&self) -> usize {
        self.tenors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenors.is_empty()
    }

    pub fn get(&self, from: usize, to: usize) -> Option<f64> {
        self.cells.get(from)?.get(to).copied().flatten()
    }

    /// Defined cells as (from, to, value) in row-major order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.cells.iter().enumerate().flat_map(move |(i, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(j, v)| v.map(|v| (self.tenors[i].as_str(), self.tenors[j].as_str(), v)))
        })
    }

    /// Sum of every defined cell.
    pub fn total(&self) -> f64 {
        self.pairs().map(|(_, _, v)| v).sum()
    }

    /// Rank pairs by descending |value|, keeping the first `top_n`.
    pub fn rank_pairs(&self, top_n: usize) -> PairRanking {
        let mut pairs: Vec<(&str, &str, f64)> = self.pairs().collect();
        pairs.sort_by(|a, b| b.2.abs().partial_cmp(&a.2.abs()).unwrap_or(Ordering::Equal));

        let entries = pairs
            .into_iter()
            .take(top_n)
            .enumerate()
            .map(|(idx, (from, to, value))| PairAttribution {
                rank: idx + 1,
                from: from.to_string(),
                to: to.to_string(),
                value,
            })
            .collect();

        PairRanking {
            entries,
            total: self.total(),
        }
    }
}

/// Build the attribution matrix for `strategy`.
pub fn build_matrix<S>(rows: &[PlRow], strategy: Strategy, attribution: &mut S) -> AttributionMatrix
where
    S: AttributionStrategy + ?Sized,
{
    let cells = match strategy {
        Strategy::Actual => basis_cells(rows, PlBasis::Actual, attribution),
        Strategy::Hold => basis_cells(rows, PlBasis::Hold, attribution),
        Strategy::Diff => {
            let actual = basis_cells(rows, PlBasis::Actual, attribution);
            let hold = basis_cells(rows, PlBasis::Hold, attribution);
            actual
                .into_iter()
                .zip(hold)
                .map(|(a_row, h_row)| {
                    a_row
                        .into_iter()
                        .zip(h_row)
                        .map(|(a, h)| Some(a? - h?))
                        .collect()
                })
                .collect()
        }
    };

    let max_abs = max_abs(&cells);
    debug!(tenors = rows.len(), strategy = ?strategy, max_abs, "attribution matrix built");

    AttributionMatrix {
        strategy,
        tenors: rows.iter().map(|r| r.tenor.clone()).collect(),
        cells,
        max_abs,
    }
}

fn basis_cells<S>(rows: &[PlRow], basis: PlBasis, attribution: &mut S) -> Vec<Vec<Option<f64>>>
where
    S: AttributionStrategy + ?Sized,
{
    rows.iter()
        .enumerate()
        .map(|(i, from)| {
            rows.iter()
                .enumerate()
                .map(|(j, to)| (i != j).then(|| attribution.pair_value(from, to, basis)))
                .collect()
        })
        .collect()
}

/// Color-scale bound: max |cell| over defined cells, or 1 if that is 0.
pub fn max_abs(cells: &[Vec<Option<f64>>]) -> f64 {
    let max = cells
        .iter()
        .flatten()
        .flatten()
        .map(|v| v.abs())
        .fold(0.0, f64::max);
    if max > 0.0 { max } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn row(tenor: &str, hold_pl: f64, actual_pl: f64) -> PlRow {
        PlRow {
            tenor: tenor.to_string(),
            qty_start: 0.0,
            qty_end: 0.0,
            price_start: 0.0,
            price_end: 0.0,
            price_change: 0.0,
            hold_pl,
            actual_pl,
        }
    }

    fn rows() -> Vec<PlRow> {
        vec![row("Cash", 500.0, -200.0), row("3M", -650.0, 390.0), row("Jun", 100.0, 100.0)]
    }

    /// Deterministic stand-in: base value, no randomness.
    struct Average;

    impl AttributionStrategy for Average {
        fn pair_value(&mut self, from: &PlRow, to: &PlRow, basis: PlBasis) -> f64 {
            (from.pl(basis) + to.pl(basis)) / 2.0
        }
    }

    #[test]
    fn diagonal_is_always_undefined() {
        let mut attribution = RandomRedistribution::new(StdRng::seed_from_u64(7));
        for strategy in [Strategy::Actual, Strategy::Hold, Strategy::Diff] {
            let m = build_matrix(&rows(), strategy, &mut attribution);
            assert_eq!(m.len(), 3);
            for i in 0..m.len() {
                assert_eq!(m.get(i, i), None);
                for j in 0..m.len() {
                    if i != j {
                        assert!(m.get(i, j).is_some());
                    }
                }
            }
        }
    }

    #[test]
    fn single_tenor_has_no_defined_cells() {
        let mut attribution = RandomRedistribution::new(StdRng::seed_from_u64(1));
        let m = build_matrix(&rows()[..1], Strategy::Actual, &mut attribution);
        assert_eq!(m.cells, vec![vec![None]]);
        assert_eq!(m.max_abs, 1.0);
        assert_eq!(m.pairs().count(), 0);
    }

    #[test]
    fn empty_rows_give_empty_matrix() {
        let m = build_matrix(&[], Strategy::Diff, &mut Average);
        assert!(m.is_empty());
        assert_eq!(m.max_abs, 1.0);
    }

    #[test]
    fn random_cells_stay_within_scaled_bounds() {
        let rows = rows();
        let mut attribution = RandomRedistribution::new(StdRng::seed_from_u64(42));
        let m = build_matrix(&rows, Strategy::Hold, &mut attribution);

        for (i, from) in rows.iter().enumerate() {
            for (j, to) in rows.iter().enumerate() {
                let Some(v) = m.get(i, j) else { continue };
                let base = ((from.hold_pl + to.hold_pl) / 2.0).abs();
                assert!(v.abs() >= base * 0.3 - 1e-9 && v.abs() < base * 1.5 + 1e-9);
            }
        }
    }

    #[test]
    fn same_seed_reproduces_matrix() {
        let a = build_matrix(&rows(), Strategy::Diff, &mut RandomRedistribution::new(StdRng::seed_from_u64(9)));
        let b = build_matrix(&rows(), Strategy::Diff, &mut RandomRedistribution::new(StdRng::seed_from_u64(9)));
        assert_eq!(a, b);
    }

    #[test]
    fn diff_with_deterministic_strategy_is_effect_average() {
        let rows = rows();
        let m = build_matrix(&rows, Strategy::Diff, &mut Average);
        // (a_i + a_j)/2 - (h_i + h_j)/2 for Cash/3M: (-200 + 390)/2 - (500 - 650)/2 = 170
        assert_relative_eq!(m.get(0, 1).unwrap(), 170.0);
        // 3M/Jun: (390 + 100)/2 - (-650 + 100)/2 = 520
        assert_relative_eq!(m.max_abs, 520.0);
    }

    #[test]
    fn ranking_orders_by_absolute_value() {
        let m = build_matrix(&rows(), Strategy::Hold, &mut Average);
        let ranking = m.rank_pairs(2);

        assert_eq!(ranking.entries.len(), 2);
        assert_eq!(ranking.entries[0].rank, 1);
        assert!(ranking.entries[0].value.abs() >= ranking.entries[1].value.abs());
        assert_relative_eq!(ranking.entries[0].value.abs(), 300.0);
        // Total covers every pair, not just the kept ones.
        assert_relative_eq!(ranking.total, m.total());
        assert_relative_eq!(m.total(), 2.0 * (-75.0 + 300.0 - 275.0));
    }
}
