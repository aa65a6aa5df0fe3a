//! Analysis configuration.
//!
//! `AnalysisConfig::default()` matches the usual two-sheet export layout.
//! `from_env` layers `TENOR_PNL_*` overrides (optionally from a
//! `.env` file) on top of the defaults.

use serde::{Deserialize, Serialize};

use crate::domain::{ColumnOrder, MergePolicy, Strategy};
use crate::error::ConfigError;

pub const ENV_PRICE_TOKENS: &str = "TENOR_PNL_PRICE_TOKENS";
pub const ENV_QTY_TOKENS: &str = "TENOR_PNL_QTY_TOKENS";
pub const ENV_MERGE_POLICY: &str = "TENOR_PNL_MERGE_POLICY";
pub const ENV_COLUMN_ORDER: &str = "TENOR_PNL_COLUMN_ORDER";
pub const ENV_FRONT_PATTERN: &str = "TENOR_PNL_FRONT_PATTERN";
pub const ENV_THREE_MONTH_PATTERN: &str = "TENOR_PNL_THREE_MONTH_PATTERN";
pub const ENV_ATTRIBUTION_STRATEGY: &str = "TENOR_PNL_ATTRIBUTION_STRATEGY";
pub const ENV_ATTRIBUTION_SEED: &str = "TENOR_PNL_ATTRIBUTION_SEED";
pub const ENV_RANKING_TOP: &str = "TENOR_PNL_RANKING_TOP";
pub const ENV_NET_TOLERANCE: &str = "TENOR_PNL_NET_TOLERANCE";

/// Everything that parameterizes one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Sheet-name tokens identifying the price sheet.
    pub price_sheet_tokens: Vec<String>,
    /// Sheet-name tokens identifying the quantity sheet.
    pub qty_sheet_tokens: Vec<String>,
    pub merge_policy: MergePolicy,
    pub column_order: ColumnOrder,
    /// Case-insensitive substring marking the front (cash) leg.
    pub front_pattern: String,
    /// Case-insensitive substring marking the 3-month leg.
    pub three_month_pattern: String,
    pub attribution_strategy: Strategy,
    /// Fixed seed for the placeholder attribution. `None` draws from OS entropy.
    pub attribution_seed: Option<u64>,
    /// Number of pairs kept in the attribution ranking.
    pub ranking_top_n: usize,
    /// Summed quantity beyond which the book is reported as not netting out.
    pub net_position_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            price_sheet_tokens: vec!["価格".to_string(), "price".to_string()],
            qty_sheet_tokens: vec!["数量".to_string(), "qty".to_string(), "quantity".to_string()],
            merge_policy: MergePolicy::LastWins,
            column_order: ColumnOrder::Lexicographic,
            front_pattern: "cash".to_string(),
            three_month_pattern: "3m".to_string(),
            attribution_strategy: Strategy::Actual,
            attribution_seed: None,
            ranking_top_n: 20,
            net_position_tolerance: 0.01,
        }
    }
}

impl AnalysisConfig {
    /// Defaults with process-environment overrides (a `.env` file is loaded if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Blank values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_PRICE_TOKENS) {
            self.price_sheet_tokens = split_list(&v);
        }
        if let Some(v) = get(ENV_QTY_TOKENS) {
            self.qty_sheet_tokens = split_list(&v);
        }
        if let Some(v) = get(ENV_MERGE_POLICY) {
            self.merge_policy = parse_merge_policy(&v)
                .ok_or_else(|| invalid(ENV_MERGE_POLICY, &v, "last-wins|first-wins|reject-duplicates"))?;
        }
        if let Some(v) = get(ENV_COLUMN_ORDER) {
            self.column_order = v
                .parse()
                .map_err(|_| invalid(ENV_COLUMN_ORDER, &v, "lexicographic|calendar"))?;
        }
        if let Some(v) = get(ENV_FRONT_PATTERN) {
            self.front_pattern = v.trim().to_string();
        }
        if let Some(v) = get(ENV_THREE_MONTH_PATTERN) {
            self.three_month_pattern = v.trim().to_string();
        }
        if let Some(v) = get(ENV_ATTRIBUTION_STRATEGY) {
            self.attribution_strategy = v
                .parse()
                .map_err(|_| invalid(ENV_ATTRIBUTION_STRATEGY, &v, "actual|hold|diff"))?;
        }
        if let Some(v) = get(ENV_ATTRIBUTION_SEED) {
            let seed = v
                .trim()
                .parse::<u64>()
                .map_err(|_| invalid(ENV_ATTRIBUTION_SEED, &v, "an unsigned integer"))?;
            self.attribution_seed = Some(seed);
        }
        if let Some(v) = get(ENV_RANKING_TOP) {
            self.ranking_top_n = v
                .trim()
                .parse::<usize>()
                .map_err(|_| invalid(ENV_RANKING_TOP, &v, "an unsigned integer"))?;
        }
        if let Some(v) = get(ENV_NET_TOLERANCE) {
            self.net_position_tolerance = v
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|t| t.is_finite() && *t >= 0.0)
                .ok_or_else(|| invalid(ENV_NET_TOLERANCE, &v, "a finite number >= 0"))?;
        }

        Ok(self)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_merge_policy(value: &str) -> Option<MergePolicy> {
    match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
        "last-wins" | "last" => Some(MergePolicy::LastWins),
        "first-wins" | "first" => Some(MergePolicy::FirstWins),
        "reject-duplicates" | "reject" => Some(MergePolicy::RejectDuplicates),
        _ => None,
    }
}

fn invalid(key: &str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn no_overrides_keeps_defaults() {
        let config = AnalysisConfig::default().with_overrides(lookup(&[])).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = AnalysisConfig::default()
            .with_overrides(lookup(&[
                (ENV_PRICE_TOKENS, "px, close"),
                (ENV_MERGE_POLICY, "first_wins"),
                (ENV_COLUMN_ORDER, "calendar"),
                (ENV_ATTRIBUTION_STRATEGY, "diff"),
                (ENV_ATTRIBUTION_SEED, "42"),
                (ENV_RANKING_TOP, "5"),
                (ENV_NET_TOLERANCE, " "),
            ]))
            .unwrap();

        assert_eq!(config.price_sheet_tokens, vec!["px", "close"]);
        assert_eq!(config.merge_policy, MergePolicy::FirstWins);
        assert_eq!(config.column_order, ColumnOrder::Calendar);
        assert_eq!(config.attribution_strategy, Strategy::Diff);
        assert_eq!(config.attribution_seed, Some(42));
        assert_eq!(config.ranking_top_n, 5);
        assert_eq!(config.net_position_tolerance, 0.01);
    }

    #[test]
    fn malformed_override_is_rejected() {
        let err = AnalysisConfig::default()
            .with_overrides(lookup(&[(ENV_ATTRIBUTION_SEED, "-1")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_ATTRIBUTION_SEED));
    }
}
