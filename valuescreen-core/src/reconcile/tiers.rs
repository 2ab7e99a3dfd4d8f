//! The three standard price tiers.

use super::{PriceSlots, PriceTier};
use crate::data::CompanyPanel;
use crate::domain::Metric;

/// Tier 1: the close nearest to (not after) the yearly reference date,
/// supplied as the `FixedDatePrice` metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDatePriceTier;

impl PriceTier for FixedDatePriceTier {
    fn name(&self) -> &str {
        "fixed_date"
    }

    fn resolve(&self, panel: &CompanyPanel, slots: &mut PriceSlots) {
        for year in panel.years().iter() {
            if let Some(price) = panel.value(&Metric::FixedDatePrice, year) {
                slots.fill(year, price);
            }
        }
    }
}

/// Tier 2: the latest market price (`CurrentPrice`, `Current` slot) stands in
/// for the final year only. Covers recent listings without chart history.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentPriceTier;

impl PriceTier for CurrentPriceTier {
    fn name(&self) -> &str {
        "current_price"
    }

    fn resolve(&self, panel: &CompanyPanel, slots: &mut PriceSlots) {
        let last = panel.years().last();
        if let Some(price) = panel.current(&Metric::CurrentPrice) {
            slots.fill(last, price);
        }
    }
}

/// Tier 3: implied price `BPS × PBR` from the raw (not yet recalculated)
/// rows, for any year still open.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookValueTier;

impl PriceTier for BookValueTier {
    fn name(&self) -> &str {
        "bps_x_pbr"
    }

    fn resolve(&self, panel: &CompanyPanel, slots: &mut PriceSlots) {
        for year in slots.unresolved() {
            let bps = panel.value(&Metric::Bps, year);
            let pbr = panel.value(&Metric::Pbr, year);
            if let (Some(bps), Some(pbr)) = (bps, pbr) {
                slots.fill(year, bps * pbr);
            }
        }
    }
}
