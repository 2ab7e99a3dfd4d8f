//! Fixed reference-date prices from a daily close series.
//!
//! For each fiscal year, the price basis is the close on the latest trading
//! day on or before the reference month/day of that year. Holidays and
//! weekends therefore fall back to the previous session.

use chrono::NaiveDate;

use crate::domain::{FiscalYears, Metric, RawFact};

/// Month and day of the yearly price reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDay {
    pub month: u32,
    pub day: u32,
}

impl ReferenceDay {
    pub fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    /// The reference date in `year`. Feb 29 maps to Feb 28 in common years.
    pub fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day).or_else(|| {
            (self.month == 2 && self.day == 29)
                .then(|| NaiveDate::from_ymd_opt(year, 2, 28))
                .flatten()
        })
    }
}

/// Close on the latest date `<= target`, if any.
///
/// `closes` must be sorted ascending by date.
fn close_on_or_before(closes: &[(NaiveDate, f64)], target: NaiveDate) -> Option<f64> {
    let idx = closes.partition_point(|(d, _)| *d <= target);
    idx.checked_sub(1).map(|i| closes[i].1)
}

/// Derive `FixedDatePrice` facts for `code`/`name` from a daily close series.
///
/// `closes` may be in any order; non-finite closes are ignored. Years with no
/// close on or before the reference date produce no fact.
pub fn fixed_date_prices(
    code: &str,
    name: &str,
    closes: &[(NaiveDate, f64)],
    reference: ReferenceDay,
    years: FiscalYears,
) -> Vec<RawFact> {
    let mut sorted: Vec<(NaiveDate, f64)> = closes
        .iter()
        .copied()
        .filter(|(_, c)| c.is_finite())
        .collect();
    sorted.sort_by_key(|(d, _)| *d);

    years
        .iter()
        .filter_map(|year| {
            let target = reference.in_year(i32::from(year))?;
            let close = close_on_or_before(&sorted, target)?;
            Some(RawFact::numeric(
                code,
                name,
                year.to_string(),
                Metric::FixedDatePrice.as_str(),
                close,
            ))
        })
        .collect()
}
