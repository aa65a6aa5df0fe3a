//! Shared domain types.
//!
//! Inputs (`Workbook`, `Sheet`, `Cell`) model the raw two-sheet export. The
//! reconciled `SheetTable` is the numeric model every analysis reads from, and
//! the remaining types are the immutable outputs handed to the presentation
//! layer. Nothing here is mutated after construction.

use std::collections::HashMap;

use serde::{Deserialize, Serialize, Serializer};

/// A single raw cell as read from a worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// True when the cell carries no content at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Render the cell as a row/column label.
    ///
    /// Falsy content (empty text, `0`, `false`, `NaN`) renders as `""`, which
    /// callers treat as "no label".
    pub fn label(&self) -> String {
        match self {
            Cell::Empty | Cell::Bool(false) => String::new(),
            Cell::Bool(true) => "true".to_string(),
            Cell::Number(n) if *n == 0.0 || n.is_nan() => String::new(),
            Cell::Number(n) => format_number_label(*n),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

fn format_number_label(n: f64) -> String {
    // Excel date serials and integer headers should read "45000", not "45000.0".
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// A named rectangular grid. Row 0 is the header row; column 0 holds tenor labels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> &[Cell] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// An ordered collection of named sheets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// How a repeated tenor label within one sheet is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// The later row replaces the earlier one but keeps its table position.
    #[default]
    LastWins,
    /// The first row is kept; later duplicates are ignored.
    FirstWins,
    /// A duplicate fails ingestion.
    RejectDuplicates,
}

/// Column label -> numeric value for one tenor.
pub type ColumnValues = HashMap<String, f64>;

/// What happened when a row was offered to a `SheetTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    Replaced,
    Ignored,
    Rejected,
}

/// Tenor label -> (column label -> value), in first-insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetTable {
    rows: Vec<(String, ColumnValues)>,
    index: HashMap<String, usize>,
}

impl SheetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from literal rows, merging duplicates last-wins.
    pub fn from_rows<T, C, K>(rows: impl IntoIterator<Item = (T, C)>) -> Self
    where
        T: Into<String>,
        C: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut table = Self::new();
        for (tenor, values) in rows {
            let values = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
            table.merge(tenor.into(), values, MergePolicy::LastWins);
        }
        table
    }

    /// Offer a row to the table under the given merge policy.
    pub fn merge(&mut self, tenor: String, values: ColumnValues, policy: MergePolicy) -> MergeOutcome {
        match self.index.get(&tenor) {
            None => {
                self.index.insert(tenor.clone(), self.rows.len());
                self.rows.push((tenor, values));
                MergeOutcome::Inserted
            }
            Some(&idx) => match policy {
                MergePolicy::LastWins => {
                    self.rows[idx].1 = values;
                    MergeOutcome::Replaced
                }
                MergePolicy::FirstWins => MergeOutcome::Ignored,
                MergePolicy::RejectDuplicates => MergeOutcome::Rejected,
            },
        }
    }

    pub fn get(&self, tenor: &str) -> Option<&ColumnValues> {
        self.index.get(tenor).map(|&idx| &self.rows[idx].1)
    }

    pub fn contains(&self, tenor: &str) -> bool {
        self.index.contains_key(tenor)
    }

    /// Raw stored value, if any.
    pub fn value(&self, tenor: &str, column: &str) -> Option<f64> {
        self.get(tenor)?.get(column).copied()
    }

    /// Tenor labels in table order.
    pub fn tenors(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(t, _)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Serializes as `{ tenor: { column: value } }` with tenors in table order.
impl Serialize for SheetTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.rows.iter().map(|(tenor, values)| (tenor, values)))
    }
}

/// The two columns being compared. `start <= end` under the ordering used to pick them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonPeriod {
    #[serde(rename = "dateStart")]
    pub start: String,
    #[serde(rename = "dateEnd")]
    pub end: String,
}

impl ComparisonPeriod {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Which position quantity a P/L figure assumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlBasis {
    /// Quantity at period start, held unchanged.
    Hold,
    /// Actual quantity at period end.
    Actual,
}

/// Attribution view selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Actual,
    Hold,
    /// Actual minus hold.
    Diff,
}

impl Strategy {
    pub fn display_name(self) -> &'static str {
        match self {
            Strategy::Actual => "Actual",
            Strategy::Hold => "Hold",
            Strategy::Diff => "Actual - Hold",
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "actual" => Ok(Strategy::Actual),
            "hold" => Ok(Strategy::Hold),
            "diff" => Ok(Strategy::Diff),
            other => Err(format!("unknown strategy '{other}'")),
        }
    }
}

/// Per-tenor P/L between the two comparison columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlRow {
    #[serde(rename = "prompt")]
    pub tenor: String,
    pub qty_start: f64,
    pub qty_end: f64,
    pub price_start: f64,
    pub price_end: f64,
    pub price_change: f64,
    #[serde(rename = "holdPL")]
    pub hold_pl: f64,
    #[serde(rename = "actualPL")]
    pub actual_pl: f64,
}

impl PlRow {
    pub fn pl(&self, basis: PlBasis) -> f64 {
        match basis {
            PlBasis::Hold => self.hold_pl,
            PlBasis::Actual => self.actual_pl,
        }
    }

    /// Actual minus hold: the effect of changing the position.
    pub fn strategy_effect(&self) -> f64 {
        self.actual_pl - self.hold_pl
    }
}

/// Column sums over a set of `PlRow`s.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlTotals {
    pub qty_start: f64,
    pub qty_end: f64,
    #[serde(rename = "holdPL")]
    pub hold_pl: f64,
    #[serde(rename = "actualPL")]
    pub actual_pl: f64,
}

impl PlTotals {
    pub fn strategy_effect(&self) -> f64 {
        self.actual_pl - self.hold_pl
    }

    /// `[hold, effect, actual]`: the steps of a hold-to-actual waterfall.
    pub fn waterfall(&self) -> [f64; 3] {
        [self.hold_pl, self.strategy_effect(), self.actual_pl]
    }
}

/// Summed quantities at both dates and whether they net to (about) zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetPositionCheck {
    pub qty_start: f64,
    pub qty_end: f64,
    pub balanced: bool,
}

/// Two-leg (front vs 3-month) spread P/L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadRecord {
    pub front: String,
    pub three_month: String,
    pub spread_start: f64,
    pub spread_end: f64,
    pub spread_change: f64,
    pub spread_qty_start: f64,
    pub spread_qty_end: f64,
    #[serde(rename = "spreadPLHold")]
    pub pl_hold: f64,
    #[serde(rename = "spreadPLActual")]
    pub pl_actual: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_truthiness() {
        assert_eq!(Cell::Empty.label(), "");
        assert_eq!(Cell::Number(0.0).label(), "");
        assert_eq!(Cell::Number(45000.0).label(), "45000");
        assert_eq!(Cell::Number(1.5).label(), "1.5");
        assert_eq!(Cell::text("Cash").label(), "Cash");
        assert_eq!(Cell::Bool(false).label(), "");
    }

    #[test]
    fn last_wins_keeps_first_position() {
        let mut table = SheetTable::new();
        let a: ColumnValues = [("Jan".to_string(), 1.0)].into_iter().collect();
        let b: ColumnValues = [("Jan".to_string(), 2.0)].into_iter().collect();
        let c: ColumnValues = [("Jan".to_string(), 3.0)].into_iter().collect();

        assert_eq!(table.merge("Cash".into(), a, MergePolicy::LastWins), MergeOutcome::Inserted);
        table.merge("3M".into(), b, MergePolicy::LastWins);
        assert_eq!(table.merge("Cash".into(), c, MergePolicy::LastWins), MergeOutcome::Replaced);

        assert_eq!(table.tenors().collect::<Vec<_>>(), vec!["Cash", "3M"]);
        assert_eq!(table.value("Cash", "Jan"), Some(3.0));
    }

    #[test]
    fn first_wins_ignores_later_rows() {
        let mut table = SheetTable::new();
        table.merge("Cash".into(), [("Jan".to_string(), 1.0)].into_iter().collect(), MergePolicy::FirstWins);
        let outcome = table.merge(
            "Cash".into(),
            [("Jan".to_string(), 9.0)].into_iter().collect(),
            MergePolicy::FirstWins,
        );
        assert_eq!(outcome, MergeOutcome::Ignored);
        assert_eq!(table.value("Cash", "Jan"), Some(1.0));
    }

    #[test]
    fn table_serializes_in_table_order() {
        let table = SheetTable::from_rows([("Cash", [("Jan", 100.0)]), ("3M", [("Jan", 95.0)])]);
        let text = serde_json::to_string(&table).unwrap();
        assert_eq!(text, r#"{"Cash":{"Jan":100.0},"3M":{"Jan":95.0}}"#);
    }

    #[test]
    fn period_uses_date_start_and_end_keys() {
        let json = serde_json::to_value(ComparisonPeriod::new("Feb", "Jan")).unwrap();
        assert_eq!(json, serde_json::json!({ "dateStart": "Feb", "dateEnd": "Jan" }));
    }

    #[test]
    fn totals_waterfall_sums_to_actual() {
        let totals = PlTotals {
            qty_start: 0.0,
            qty_end: 0.0,
            hold_pl: 120.0,
            actual_pl: 80.0,
        };
        let [hold, effect, actual] = totals.waterfall();
        assert_eq!(hold + effect, actual);
    }
}
