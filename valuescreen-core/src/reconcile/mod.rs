//! Price reconciliation — one price per fiscal year from competing sources.
//!
//! Sources are tried as an ordered list of [`PriceTier`]s. Each tier reads
//! the panel and may only write into slots that no earlier tier resolved;
//! [`PriceSlots`] enforces that, so a resolved slot is never revised.
//! The resolved series is merged back into the panel as the `PRICE` row.

pub mod tiers;

use serde::{Deserialize, Serialize};

use crate::data::{CompanyPanel, MetricRow};
use crate::domain::{FiscalYears, Metric};

pub use tiers::{BookValueTier, CurrentPriceTier, FixedDatePriceTier};

/// Write-once view over the price series being resolved.
#[derive(Debug, Clone)]
pub struct PriceSlots {
    years: FiscalYears,
    values: Vec<Option<f64>>,
    filled: usize,
}

impl PriceSlots {
    pub fn new(years: FiscalYears) -> Self {
        Self {
            years,
            values: vec![None; years.len()],
            filled: 0,
        }
    }

    pub fn years(&self) -> FiscalYears {
        self.years
    }

    pub fn get(&self, year: u16) -> Option<f64> {
        self.values.get(self.years.index_of(year)?).copied().flatten()
    }

    pub fn is_resolved(&self, year: u16) -> bool {
        self.get(year).is_some()
    }

    /// Years still undefined, ascending.
    pub fn unresolved(&self) -> Vec<u16> {
        self.years.iter().filter(|y| !self.is_resolved(*y)).collect()
    }

    /// Fill `year` with `value` if the slot is still undefined and the value
    /// is finite. Returns whether the slot was written.
    pub fn fill(&mut self, year: u16, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let Some(index) = self.years.index_of(year) else {
            return false;
        };
        match self.values[index] {
            Some(_) => false,
            None => {
                self.values[index] = Some(value);
                self.filled += 1;
                true
            }
        }
    }

    /// Total slots written so far across all tiers.
    pub fn filled(&self) -> usize {
        self.filled
    }

    pub fn into_values(self) -> Vec<Option<f64>> {
        self.values
    }
}

/// One price source in the fallback chain.
///
/// Implementations see the panel read-only; the only mutable state they get
/// is the write-once slot set.
pub trait PriceTier: Send + Sync {
    /// Short identifier for logs (e.g. "fixed_date").
    fn name(&self) -> &str;

    fn resolve(&self, panel: &CompanyPanel, slots: &mut PriceSlots);
}

/// How many slots a tier resolved for one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierReport {
    pub tier: String,
    pub filled: usize,
}

/// Ordered chain of price tiers.
pub struct PriceReconciler {
    tiers: Vec<Box<dyn PriceTier>>,
}

impl PriceReconciler {
    /// Fixed-date close, then current price for the final year, then BPS × PBR.
    pub fn standard() -> Self {
        Self::with_tiers(vec![
            Box::new(FixedDatePriceTier),
            Box::new(CurrentPriceTier),
            Box::new(BookValueTier),
        ])
    }

    pub fn with_tiers(tiers: Vec<Box<dyn PriceTier>>) -> Self {
        Self { tiers }
    }

    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers.iter().map(|t| t.name()).collect()
    }

    /// Resolve the series without touching the panel.
    pub fn resolve(&self, panel: &CompanyPanel) -> (PriceSlots, Vec<TierReport>) {
        let mut slots = PriceSlots::new(panel.years());
        let mut reports = Vec::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            let before = slots.filled();
            tier.resolve(panel, &mut slots);
            reports.push(TierReport {
                tier: tier.name().to_string(),
                filled: slots.filled() - before,
            });
        }
        (slots, reports)
    }

    /// Resolve and store the series as the panel's `PRICE` row.
    ///
    /// The row is always materialised, even when every slot stays undefined.
    pub fn reconcile(&self, panel: &mut CompanyPanel) -> Vec<TierReport> {
        let (slots, reports) = self.resolve(panel);
        tracing::trace!(company = %panel.key(), ?reports, "price tiers resolved");
        panel.insert_row(Metric::Price, MetricRow::from_values(slots.into_values()));
        reports
    }
}

impl Default for PriceReconciler {
    fn default() -> Self {
        Self::standard()
    }
}
