//! Screen runner — wires together loading, the per-company pipeline and
//! fingerprinting.
//!
//! Entry points:
//! - `run_from_config()`: loads facts from the configured input, then runs. Used by CLI.
//! - `run_loaded()`: screens a `LoadedFacts`, reusing its dataset hash.
//! - `run_screen()`: takes a bare fact stream. Used by tests and callers that
//!   already hold one.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use valuescreen_core::data::PanelBuilder;
use valuescreen_core::domain::DatasetHash;
use valuescreen_core::fingerprint::{dataset_hash, output_hash, ScreenFingerprint};
use valuescreen_core::{
    screen_company, CompanyScreen, OutputRow, PriceReconciler, RawFact, ScreenConfig, SizeBucket,
};

use crate::config::{ConfigError, RunConfig};
use crate::data_loader::{load_facts, LoadError, LoadedFacts};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Aggregate counts over a whole screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenSummary {
    pub companies: usize,
    pub rows: usize,
    pub undervalued: usize,
    pub high_growth: usize,
    /// Undervalued and high growth at once.
    pub both: usize,
    pub large: usize,
    pub small_mid: usize,
    /// Companies with no defined EPS CAGR.
    pub cagr_undefined: usize,
    /// Price slots filled, per tier name.
    pub price_slots_by_tier: BTreeMap<String, usize>,
    pub per_recalculated: usize,
    pub pbr_recalculated: usize,
}

impl ScreenSummary {
    pub fn from_screens(screens: &[CompanyScreen]) -> Self {
        let mut s = Self {
            companies: screens.len(),
            ..Self::default()
        };
        for screen in screens {
            let c = &screen.classification;
            s.rows += screen.rows.len();
            s.undervalued += usize::from(c.is_undervalued);
            s.high_growth += usize::from(c.is_high_growth);
            s.both += usize::from(c.is_undervalued && c.is_high_growth);
            match c.size_bucket {
                SizeBucket::Large => s.large += 1,
                SizeBucket::SmallMid => s.small_mid += 1,
            }
            s.cagr_undefined += usize::from(c.eps_cagr.is_none());
            for tier in &screen.tiers {
                *s.price_slots_by_tier.entry(tier.tier.clone()).or_default() += tier.filled;
            }
            s.per_recalculated += screen.recalc.per_updated;
            s.pbr_recalculated += screen.recalc.pbr_updated;
        }
        s
    }
}

/// Complete result of a single screen run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub fingerprint: ScreenFingerprint,
    pub config: ScreenConfig,
    pub summary: ScreenSummary,
    /// Output rows sorted by (code, metric order).
    pub rows: Vec<OutputRow>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl ScreenResult {
    /// Year column headings for the configured range.
    pub fn year_columns(&self) -> Vec<String> {
        self.config
            .fiscal_years()
            .iter()
            .map(|y| y.to_string())
            .collect()
    }
}

/// Load facts from `config.input` and screen them.
pub fn run_from_config(config: &RunConfig) -> Result<ScreenResult, RunError> {
    config.validate()?;
    let loaded = load_facts(&config.input)?;
    Ok(run_loaded(&loaded, config))
}

/// Screen facts from the data loader, fingerprinted with the hash computed
/// at load time.
pub fn run_loaded(loaded: &LoadedFacts, config: &RunConfig) -> ScreenResult {
    screen_facts(&loaded.facts, loaded.dataset_hash.clone(), config)
}

/// Screen pre-loaded facts — no I/O.
///
/// Companies are independent, so with `parallel` set each panel goes to
/// the rayon pool. Rows are sorted afterwards, making the artifact
/// identical whichever way the companies were scheduled.
pub fn run_screen(facts: &[RawFact], config: &RunConfig) -> ScreenResult {
    screen_facts(facts, dataset_hash(facts), config)
}

fn screen_facts(facts: &[RawFact], dataset_hash: DatasetHash, config: &RunConfig) -> ScreenResult {
    let screen = &config.screen;
    let (panels, stats) = PanelBuilder::new(screen.fiscal_years()).build_with_stats(facts);
    tracing::info!(
        companies = panels.len(),
        facts = stats.facts,
        skipped_year = stats.skipped_year,
        undefined_values = stats.undefined_values,
        duplicates = stats.duplicates,
        "panels built"
    );

    let reconciler = PriceReconciler::standard();
    let screens: Vec<CompanyScreen> = if config.parallel {
        panels
            .into_par_iter()
            .map(|panel| screen_company(panel, screen, &reconciler))
            .collect()
    } else {
        panels
            .into_iter()
            .map(|panel| screen_company(panel, screen, &reconciler))
            .collect()
    };

    for s in &screens {
        tracing::debug!(company = %s.company, tiers = ?s.tiers, "price tiers");
    }

    let summary = ScreenSummary::from_screens(&screens);
    let mut rows: Vec<OutputRow> = screens.into_iter().flat_map(|s| s.rows).collect();
    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let fingerprint = ScreenFingerprint {
        timestamp: chrono::Local::now().naive_local(),
        config_hash: screen.config_hash(),
        dataset_hash,
        output_hash: output_hash(&rows),
        fact_count: facts.len(),
        company_count: summary.companies,
        row_count: rows.len(),
    };

    tracing::info!(
        companies = summary.companies,
        rows = summary.rows,
        undervalued = summary.undervalued,
        high_growth = summary.high_growth,
        output_hash = %fingerprint.output_hash,
        "screen complete"
    );

    ScreenResult {
        schema_version: SCHEMA_VERSION,
        fingerprint,
        config: screen.clone(),
        summary,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valuescreen_core::Metric;

    fn facts() -> Vec<RawFact> {
        vec![
            RawFact::new("B", "Beta", "2021", "EPS", "100"),
            RawFact::new("B", "Beta", "2026", "EPS", "300"),
            RawFact::new("B", "Beta", "2026", "FixedDatePrice", "2,000"),
            RawFact::new("B", "Beta", "2026", "BPS", "5,000"),
            RawFact::new("A", "Alpha", "2026", "EPS", "1000"),
            RawFact::new("A", "Alpha", "Current", "CurrentPrice", "50,000"),
            RawFact::new("A", "Alpha", "2021", "SHARES", "200,000,000"),
        ]
    }

    #[test]
    fn rows_sorted_by_company_then_metric() {
        let result = run_screen(&facts(), &RunConfig::for_input("mem"));
        let keys: Vec<(&str, &Metric)> = result
            .rows
            .iter()
            .map(|r| (r.company.code.as_str(), &r.metric))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("A", &Metric::Eps),
                ("A", &Metric::Per),
                ("A", &Metric::Price),
                ("B", &Metric::Bps),
                ("B", &Metric::Eps),
                ("B", &Metric::Pbr),
                ("B", &Metric::Per),
                ("B", &Metric::Price),
            ]
        );
    }

    #[test]
    fn summary_counts() {
        let result = run_screen(&facts(), &RunConfig::for_input("mem"));
        let s = &result.summary;
        assert_eq!(s.companies, 2);
        assert_eq!(s.rows, 8);
        // Beta: PER 2000/300 ≈ 6.7, PBR 0.4, EPS tripled over five years.
        assert_eq!(s.undervalued, 1);
        assert_eq!(s.high_growth, 1);
        assert_eq!(s.both, 1);
        // Alpha: 200M shares × 50,000 = 1e13.
        assert_eq!(s.large, 1);
        assert_eq!(s.small_mid, 1);
        assert_eq!(s.cagr_undefined, 1);
        assert_eq!(s.price_slots_by_tier["fixed_date"], 1);
        assert_eq!(s.price_slots_by_tier["current_price"], 1);
        assert_eq!(s.price_slots_by_tier["bps_x_pbr"], 0);
        assert_eq!(s.per_recalculated, 2);
        assert_eq!(s.pbr_recalculated, 1);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let mut seq = RunConfig::for_input("mem");
        seq.parallel = false;
        let par = RunConfig::for_input("mem");

        let a = run_screen(&facts(), &seq);
        let b = run_screen(&facts(), &par);
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.fingerprint.output_hash, b.fingerprint.output_hash);
        assert_eq!(a.summary, b.summary);
    }

    #[test]
    fn loaded_hash_is_carried_into_fingerprint() {
        let loaded = crate::data_loader::from_facts(facts(), "mem");
        let result = run_loaded(&loaded, &RunConfig::for_input("mem"));
        assert_eq!(result.fingerprint.dataset_hash, loaded.dataset_hash);
        assert_eq!(result.summary.companies, loaded.company_count);
    }

    #[test]
    fn fingerprint_sizes() {
        let result = run_screen(&facts(), &RunConfig::for_input("mem"));
        assert_eq!(result.fingerprint.fact_count, 7);
        assert_eq!(result.fingerprint.company_count, 2);
        assert_eq!(result.fingerprint.row_count, result.rows.len());
        assert_eq!(result.year_columns().first().map(String::as_str), Some("2020"));
        assert_eq!(result.year_columns().len(), 7);
    }
}
