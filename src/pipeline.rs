//! Shared analysis pipeline.
//!
//! workbook -> ingest -> P/L rows -> {totals, net position, spread, attribution}
//!
//! Ingest failures short-circuit. An undetected spread never does: the report
//! still carries the P/L rows and the attribution matrix.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::info;

use crate::analysis::{
    AttributionMatrix, AttributionStrategy, LegPatterns, PairRanking, RandomRedistribution, SpreadOutcome,
    analyze_spread, build_matrix, calculate_pl_rows, check_net_position, totals,
};
use crate::config::AnalysisConfig;
use crate::domain::{ComparisonPeriod, NetPositionCheck, PlRow, PlTotals, SheetTable, Workbook};
use crate::error::IngestResult;
use crate::io::ingest::{IngestedData, ingest_workbook};

/// All computed outputs of one analysis run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub price_sheet: String,
    pub qty_sheet: String,
    /// Emitted as top-level `dateStart` / `dateEnd`.
    #[serde(flatten)]
    pub period: ComparisonPeriod,
    pub common_columns: Vec<String>,
    pub price_table: SheetTable,
    pub qty_table: SheetTable,
    pub pl_rows: Vec<PlRow>,
    pub totals: PlTotals,
    pub net_position: NetPositionCheck,
    pub spread: SpreadOutcome,
    pub attribution: AttributionMatrix,
    pub ranking: PairRanking,
}

/// Run the full pipeline with the placeholder attribution.
///
/// The generator is seeded from `config.attribution_seed` when set, otherwise
/// from OS entropy (so repeated runs differ).
pub fn run_analysis(workbook: &Workbook, config: &AnalysisConfig) -> IngestResult<AnalysisReport> {
    let mut attribution = RandomRedistribution::new(attribution_rng(config));
    run_analysis_with(workbook, config, &mut attribution)
}

/// Run the full pipeline with a caller-supplied attribution strategy.
pub fn run_analysis_with<S>(
    workbook: &Workbook,
    config: &AnalysisConfig,
    attribution: &mut S,
) -> IngestResult<AnalysisReport>
where
    S: AttributionStrategy + ?Sized,
{
    let ingest = ingest_workbook(workbook, config)?;
    Ok(analyze_ingested(&ingest, config, attribution))
}

/// Run every analysis over already-ingested tables.
pub fn analyze_ingested<S>(ingest: &IngestedData, config: &AnalysisConfig, attribution: &mut S) -> AnalysisReport
where
    S: AttributionStrategy + ?Sized,
{
    let pl_rows = calculate_pl_rows(&ingest.price, &ingest.qty, &ingest.period);
    let totals = totals(&pl_rows);
    let net_position = check_net_position(&pl_rows, config.net_position_tolerance);

    let patterns = LegPatterns {
        front: config.front_pattern.clone(),
        three_month: config.three_month_pattern.clone(),
    };
    let spread = analyze_spread(&ingest.price, &ingest.qty, &ingest.period, &patterns);

    let attribution = build_matrix(&pl_rows, config.attribution_strategy, attribution);
    let ranking = attribution.rank_pairs(config.ranking_top_n);

    info!(
        tenors = pl_rows.len(),
        hold_pl = totals.hold_pl,
        actual_pl = totals.actual_pl,
        spread_detected = spread.record().is_some(),
        "analysis complete"
    );

    AnalysisReport {
        price_sheet: ingest.price_sheet.clone(),
        qty_sheet: ingest.qty_sheet.clone(),
        period: ingest.period.clone(),
        common_columns: ingest.common_columns.clone(),
        price_table: ingest.price.clone(),
        qty_table: ingest.qty.clone(),
        pl_rows,
        totals,
        net_position,
        spread,
        attribution,
        ranking,
    }
}

pub fn attribution_rng(config: &AnalysisConfig) -> StdRng {
    match config.attribution_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
