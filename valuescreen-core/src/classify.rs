//! Classification — valuation flag, EPS growth and size bucket per company.
//!
//! Runs once per company on the fully reconciled panel and never mutates it.

use serde::{Deserialize, Serialize};

use crate::config::{Labels, ScreenConfig};
use crate::data::CompanyPanel;
use crate::domain::Metric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeBucket {
    Large,
    SmallMid,
}

impl SizeBucket {
    pub fn label<'a>(&self, labels: &'a Labels) -> &'a str {
        match self {
            SizeBucket::Large => &labels.large,
            SizeBucket::SmallMid => &labels.small_mid,
        }
    }
}

/// Result of classifying one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub size_bucket: SizeBucket,
    pub is_undervalued: bool,
    pub is_high_growth: bool,
    /// `None` when the growth rate cannot be computed (missing or
    /// non-positive endpoints). Distinct from a genuine zero rate.
    pub eps_cagr: Option<f64>,
    /// PER in the final year (the valuation basis).
    pub per_basis: Option<f64>,
    /// PBR in the final year.
    pub pbr_basis: Option<f64>,
    /// Shares × final-year price; 0 when either is unknown or the product
    /// is not finite.
    pub market_cap: f64,
}

/// Compound annual growth rate `(end / start)^(1 / periods) - 1`.
///
/// Undefined unless both endpoints are strictly positive and `periods > 0`:
/// a zero or sign-crossing earnings path has no compound rate.
pub fn cagr(start: f64, end: f64, periods: u16) -> Option<f64> {
    if !(start > 0.0 && end > 0.0) || periods == 0 {
        return None;
    }
    let rate = (end / start).powf(1.0 / f64::from(periods)) - 1.0;
    rate.is_finite().then_some(rate)
}

/// Both final-year ratios defined and strictly below their limits.
pub fn is_undervalued(per: Option<f64>, pbr: Option<f64>, config: &ScreenConfig) -> bool {
    matches!((per, pbr), (Some(per), Some(pbr)) if per < config.per_max && pbr < config.pbr_max)
}

/// Market cap from the most recent known share count and the final-year price.
///
/// A product that overflows is treated like an unknown input.
pub fn market_cap(panel: &CompanyPanel) -> f64 {
    let last = panel.years().last();
    let shares = panel
        .row(&Metric::SharesOutstanding)
        .and_then(|r| r.last_defined())
        .unwrap_or(0.0);
    let price = panel.value(&Metric::Price, last).unwrap_or(0.0);
    let cap = shares * price;
    if cap.is_finite() {
        cap
    } else {
        0.0
    }
}

pub fn size_bucket(market_cap: f64, config: &ScreenConfig) -> SizeBucket {
    if market_cap >= config.large_cap_min {
        SizeBucket::Large
    } else {
        SizeBucket::SmallMid
    }
}

/// Classify a reconciled panel.
pub fn classify(panel: &CompanyPanel, config: &ScreenConfig) -> Classification {
    let last = panel.years().last();
    let per_basis = panel.value(&Metric::Per, last);
    let pbr_basis = panel.value(&Metric::Pbr, last);

    let eps_cagr = match (
        panel.value(&Metric::Eps, config.cagr_base_year),
        panel.value(&Metric::Eps, last),
    ) {
        (Some(start), Some(end)) => cagr(start, end, config.cagr_periods()),
        _ => None,
    };
    let is_high_growth = eps_cagr.is_some_and(|g| g > config.growth_threshold);

    let market_cap = market_cap(panel);

    Classification {
        size_bucket: size_bucket(market_cap, config),
        is_undervalued: is_undervalued(per_basis, pbr_basis, config),
        is_high_growth,
        eps_cagr,
        per_basis,
        pbr_basis,
        market_cap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PanelBuilder;
    use crate::domain::RawFact;

    fn panel(facts: &[(&str, &str, &str)]) -> CompanyPanel {
        let facts: Vec<RawFact> = facts
            .iter()
            .map(|(y, m, v)| RawFact::new("E", "Echo", *y, *m, *v))
            .collect();
        PanelBuilder::default().build(&facts).remove(0)
    }

    #[test]
    fn cagr_doubling_over_five_years() {
        let g = cagr(1000.0, 2000.0, 5).unwrap();
        assert!((g - 0.148_698_354_997_035).abs() < 1e-12);
    }

    #[test]
    fn cagr_undefined_for_non_positive_endpoints() {
        assert_eq!(cagr(0.0, 100.0, 5), None);
        assert_eq!(cagr(-10.0, 100.0, 5), None);
        assert_eq!(cagr(100.0, -10.0, 5), None);
        assert_eq!(cagr(100.0, 200.0, 0), None);
        assert_eq!(cagr(f64::NAN, 200.0, 5), None);
    }

    #[test]
    fn undervalued_boundaries() {
        let c = ScreenConfig::default();
        assert!(is_undervalued(Some(7.5), Some(0.6), &c));
        assert!(!is_undervalued(Some(9.0), Some(0.6), &c));
        assert!(!is_undervalued(Some(8.0), Some(0.6), &c));
        assert!(!is_undervalued(Some(7.0), Some(0.8), &c));
        assert!(!is_undervalued(None, Some(0.6), &c));
        assert!(!is_undervalued(Some(7.0), None, &c));
    }

    #[test]
    fn high_growth_requires_defined_cagr_above_threshold() {
        let c = ScreenConfig::default();
        let p = panel(&[("2021", "EPS", "1000"), ("2026", "EPS", "2000")]);
        let r = classify(&p, &c);
        assert!(r.is_high_growth);
        assert!((r.eps_cagr.unwrap() - 0.1487).abs() < 1e-4);

        let p = panel(&[("2021", "EPS", "-5"), ("2026", "EPS", "2000")]);
        let r = classify(&p, &c);
        assert!(!r.is_high_growth);
        assert_eq!(r.eps_cagr, None);
    }

    #[test]
    fn shares_forward_fill_and_large_bucket() {
        let c = ScreenConfig::default();
        let p = panel(&[
            ("2022", "발행주식수", "100,000,000"),
            ("2024", "발행주식수", "200,000,000"),
            ("2026", "PRICE", "30000"),
        ]);
        let r = classify(&p, &c);
        assert_eq!(r.market_cap, 6e12);
        assert_eq!(r.size_bucket, SizeBucket::Large);
    }

    #[test]
    fn threshold_is_inclusive() {
        let c = ScreenConfig::default();
        assert_eq!(size_bucket(5e12, &c), SizeBucket::Large);
        assert_eq!(size_bucket(4.999e12, &c), SizeBucket::SmallMid);
    }

    #[test]
    fn unknown_price_or_shares_is_small_mid() {
        let c = ScreenConfig::default();
        let p = panel(&[("2024", "SharesOutstanding", "1e12")]);
        let r = classify(&p, &c);
        assert_eq!(r.market_cap, 0.0);
        assert_eq!(r.size_bucket, SizeBucket::SmallMid);
    }

    #[test]
    fn overflowing_market_cap_is_zero() {
        let c = ScreenConfig::default();
        let p = panel(&[
            ("2024", "SHARES", "1e200"),
            ("2026", "PRICE", "1e200"),
        ]);
        let r = classify(&p, &c);
        assert_eq!(r.market_cap, 0.0);
        assert_eq!(r.size_bucket, SizeBucket::SmallMid);
    }

    #[test]
    fn bucket_labels() {
        let labels = Labels::default();
        assert_eq!(SizeBucket::Large.label(&labels), "대기업");
        assert_eq!(SizeBucket::SmallMid.label(&labels), "중소형");
    }
}
