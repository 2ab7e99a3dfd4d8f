//! Ratio recalculation against the reconciled price.
//!
//! Source PER/PBR are quoted against the year-end price; the screen wants
//! them against the fixed reference-date price. For every year with both a
//! resolved price and a per-share denominator, the ratio is recomputed and
//! written only when the quotient is finite. Otherwise the prior value stays,
//! whether it was the raw source value or undefined.

use serde::{Deserialize, Serialize};

use crate::data::CompanyPanel;
use crate::domain::Metric;

/// Number of yearly slots overwritten per ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalcReport {
    pub per_updated: usize,
    pub pbr_updated: usize,
}

/// Recompute `PER = PRICE / EPS` and `PBR = PRICE / BPS` in place.
///
/// Must run after price reconciliation. A ratio row is materialised (all
/// undefined) when its denominator row exists but the ratio row does not.
pub fn recalculate_ratios(panel: &mut CompanyPanel) -> RecalcReport {
    let report = RecalcReport {
        per_updated: recompute(panel, &Metric::Eps, Metric::Per),
        pbr_updated: recompute(panel, &Metric::Bps, Metric::Pbr),
    };
    tracing::trace!(company = %panel.key(), ?report, "ratios recalculated");
    report
}

fn recompute(panel: &mut CompanyPanel, denominator: &Metric, target: Metric) -> usize {
    let (Some(price), Some(denom)) = (panel.row(&Metric::Price), panel.row(denominator)) else {
        return 0;
    };

    let updates: Vec<(usize, f64)> = price
        .values()
        .iter()
        .zip(denom.values())
        .enumerate()
        .filter_map(|(i, (p, d))| {
            let ratio = (*p)? / (*d)?;
            ratio.is_finite().then_some((i, ratio))
        })
        .collect();

    let row = panel.ensure_row(target);
    for (i, ratio) in &updates {
        row.set(*i, Some(*ratio));
    }
    updates.len()
}
