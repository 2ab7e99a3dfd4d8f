//! Per-company screen: reconcile → recalculate → classify → emit.
//!
//! Each company is processed from its own panel only, so callers can fan
//! companies out across threads with no coordination.

use serde::{Deserialize, Serialize};

use crate::classify::{classify, Classification};
use crate::config::ScreenConfig;
use crate::data::{CompanyPanel, PanelBuilder};
use crate::domain::{CompanyKey, RawFact};
use crate::emit::{emit_rows, OutputRow};
use crate::recalc::{recalculate_ratios, RecalcReport};
use crate::reconcile::{PriceReconciler, TierReport};

/// Everything the screen produced for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyScreen {
    pub company: CompanyKey,
    pub classification: Classification,
    pub rows: Vec<OutputRow>,
    pub tiers: Vec<TierReport>,
    pub recalc: RecalcReport,
}

/// Run stages 2–5 on one panel. The panel is consumed; nothing of it
/// survives except the emitted rows.
pub fn screen_company(
    mut panel: CompanyPanel,
    config: &ScreenConfig,
    reconciler: &PriceReconciler,
) -> CompanyScreen {
    let tiers = reconciler.reconcile(&mut panel);
    let recalc = recalculate_ratios(&mut panel);
    let classification = classify(&panel, config);
    let rows = emit_rows(&panel, &classification);

    tracing::debug!(
        company = %panel.key(),
        rows = rows.len(),
        undervalued = classification.is_undervalued,
        high_growth = classification.is_high_growth,
        "company screened"
    );

    CompanyScreen {
        company: panel.key().clone(),
        classification,
        rows,
        tiers,
        recalc,
    }
}

/// Build panels and screen every company sequentially with the standard
/// tier chain.
pub fn screen(facts: &[RawFact], config: &ScreenConfig) -> Vec<CompanyScreen> {
    let reconciler = PriceReconciler::standard();
    PanelBuilder::new(config.fiscal_years())
        .build(facts)
        .into_iter()
        .map(|panel| screen_company(panel, config, &reconciler))
        .collect()
}

/// Flatten company results into the output row sequence.
pub fn collect_rows(screens: &[CompanyScreen]) -> Vec<OutputRow> {
    screens.iter().flat_map(|s| s.rows.iter().cloned()).collect()
}
