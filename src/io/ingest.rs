//! Workbook ingest and reconciliation.
//!
//! This module turns the raw two-sheet export into two numeric tables
//! (`price`, `qty`) keyed by tenor and column label, and picks the two columns
//! to compare.
//!
//! Design goals:
//! - **Fail fast** on structural problems (missing sheet, empty sheet, too few
//!   shared dates); the caller gets one message and no partial data
//! - **Fail soft** on cell content: unreadable values coerce to `0`
//! - **Explicit policies** for duplicate tenors and column ordering
//! - **Separation of concerns**: no P/L logic here

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::domain::{
    Cell, ColumnOrdering, ColumnValues, ComparisonPeriod, MergeOutcome, MergePolicy, Sheet, SheetTable, Workbook,
    cell_number,
};
use crate::error::{IngestError, IngestResult};

/// Header prefix that spreadsheet readers give to blank header cells.
const UNNAMED_PREFIX: &str = "Unnamed";

/// Ingest output: both tables, the comparison period, and provenance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestedData {
    #[serde(rename = "priceTable")]
    pub price: SheetTable,
    #[serde(rename = "qtyTable")]
    pub qty: SheetTable,
    #[serde(flatten)]
    pub period: ComparisonPeriod,
    pub price_sheet: String,
    pub qty_sheet: String,
    /// Common date columns in comparison order.
    pub common_columns: Vec<String>,
    pub stats: IngestStats,
}

/// Row accounting for one ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub duplicates: usize,
}

/// Resolve the sheets, build both tables, and pick the comparison period.
pub fn ingest_workbook(workbook: &Workbook, config: &AnalysisConfig) -> IngestResult<IngestedData> {
    let (price_idx, qty_idx) = select_sheets(&workbook.sheet_names(), config)?;
    let price = &workbook.sheets[price_idx];
    let qty = &workbook.sheets[qty_idx];

    debug!(price_sheet = %price.name, qty_sheet = %qty.name, "resolved sheets");

    reconcile_sheets(price, qty, config.merge_policy, &config.column_order)
}

/// Pick the price and quantity sheets by name.
///
/// The last sheet whose name carries a matching token wins. Without a match
/// the price role falls back to the first sheet and the quantity role to the
/// second (or the first, if there is only one).
pub fn select_sheets(names: &[&str], config: &AnalysisConfig) -> IngestResult<(usize, usize)> {
    let mut price = None;
    let mut qty = None;

    for (idx, name) in names.iter().enumerate() {
        if matches_any_token(name, &config.price_sheet_tokens) {
            price = Some(idx);
        }
        if matches_any_token(name, &config.qty_sheet_tokens) {
            qty = Some(idx);
        }
    }

    let price = price.or(if names.is_empty() { None } else { Some(0) });
    let qty = qty.or(match names.len() {
        0 => None,
        1 => Some(0),
        _ => Some(1),
    });

    match (price, qty) {
        (Some(p), Some(q)) => Ok((p, q)),
        _ => Err(IngestError::MissingSheet),
    }
}

fn matches_any_token(name: &str, tokens: &[String]) -> bool {
    let lower = name.to_lowercase();
    tokens
        .iter()
        .filter(|t| !t.is_empty())
        .any(|t| name.contains(t.as_str()) || lower.contains(&t.to_lowercase()))
}

/// Reconcile a price sheet and a quantity sheet into the numeric model.
pub fn reconcile_sheets(
    price: &Sheet,
    qty: &Sheet,
    policy: MergePolicy,
    ordering: &dyn ColumnOrdering,
) -> IngestResult<IngestedData> {
    for sheet in [price, qty] {
        if sheet.is_empty() {
            return Err(IngestError::EmptyData {
                sheet: sheet.name.clone(),
            });
        }
    }

    let mut stats = IngestStats::default();
    let price_table = build_table(price, policy, &mut stats)?;
    let qty_table = build_table(qty, policy, &mut stats)?;

    let price_cols = candidate_columns(price.header());
    let qty_cols: HashSet<String> = candidate_columns(qty.header()).into_iter().collect();

    let mut seen = HashSet::new();
    let common: Vec<String> = price_cols
        .into_iter()
        .filter(|c| qty_cols.contains(c))
        .filter(|c| seen.insert(c.clone()))
        .collect();

    let (period, common_columns) = select_period(common, ordering)?;

    info!(
        start = %period.start,
        end = %period.end,
        tenors_price = price_table.len(),
        tenors_qty = qty_table.len(),
        "comparison period selected"
    );

    Ok(IngestedData {
        price: price_table,
        qty: qty_table,
        period,
        price_sheet: price.name.clone(),
        qty_sheet: qty.name.clone(),
        common_columns,
        stats,
    })
}

/// Sort the common columns and take the first two as (start, end).
pub fn select_period(
    mut common: Vec<String>,
    ordering: &dyn ColumnOrdering,
) -> IngestResult<(ComparisonPeriod, Vec<String>)> {
    if common.len() < 2 {
        return Err(IngestError::InsufficientDates { common });
    }
    ordering.sort(&mut common);
    let period = ComparisonPeriod::new(common[0].clone(), common[1].clone());
    Ok((period, common))
}

/// Header labels that can act as date columns (first header cell excluded).
pub fn candidate_columns(header: &[Cell]) -> Vec<String> {
    header
        .iter()
        .skip(1)
        .map(Cell::label)
        .filter(|label| !label.is_empty() && !label.starts_with(UNNAMED_PREFIX))
        .collect()
}

fn build_table(sheet: &Sheet, policy: MergePolicy, stats: &mut IngestStats) -> IngestResult<SheetTable> {
    let headers: Vec<String> = sheet.header().iter().map(Cell::label).collect();
    let mut table = SheetTable::new();

    for (idx, row) in sheet.rows.iter().enumerate().skip(1) {
        stats.rows_read += 1;

        let tenor = row.first().map(Cell::label).unwrap_or_default();
        if tenor.is_empty() {
            stats.rows_skipped += 1;
            debug!(sheet = %sheet.name, row = idx, "skipping row without a tenor label");
            continue;
        }

        let values = parse_row(row, &headers);

        match table.merge(tenor.clone(), values, policy) {
            MergeOutcome::Inserted => {}
            MergeOutcome::Replaced => {
                stats.duplicates += 1;
                warn!(sheet = %sheet.name, tenor = %tenor, row = idx, "duplicate tenor overwrites earlier row");
            }
            MergeOutcome::Ignored => {
                stats.duplicates += 1;
                debug!(sheet = %sheet.name, tenor = %tenor, row = idx, "duplicate tenor ignored");
            }
            MergeOutcome::Rejected => {
                return Err(IngestError::DuplicateTenor {
                    sheet: sheet.name.clone(),
                    tenor,
                });
            }
        }
    }

    Ok(table)
}

fn parse_row(row: &[Cell], headers: &[String]) -> ColumnValues {
    let mut values = ColumnValues::new();
    for (col, header) in headers.iter().enumerate().skip(1) {
        if header.is_empty() {
            continue;
        }
        let Some(cell) = row.get(col) else { continue };
        if cell.is_empty() {
            continue;
        }
        // Present but unreadable content counts as zero.
        values.insert(header.clone(), cell_number(cell).unwrap_or(0.0));
    }
    values
}
