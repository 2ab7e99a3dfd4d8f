//! Canonical metric enumeration and the source-label alias table.
//!
//! Source pages label rows with units and local names (`EPS(원)`,
//! `현금DPS(원)`, `발행주식수(보통주)`). Labels are resolved to a [`Metric`]
//! once, when facts enter a panel; every later lookup is by enum key.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    Bps,
    Dps,
    Eps,
    Pbr,
    Per,
    /// Reconciled price per fiscal year (synthetic, produced by the reconciler).
    Price,
    DividendYield,
    SharesOutstanding,
    /// Close on or before the fixed reference date of each year.
    FixedDatePrice,
    /// Latest market price, carried in the `Current` slot.
    CurrentPrice,
    /// Any label the alias table does not know. Kept so the grid stays
    /// complete, never consulted by a rule.
    Other(String),
}

/// Metrics that produce output rows, in emission order.
pub const OUTPUT_METRICS: [Metric; 6] = [
    Metric::Bps,
    Metric::Dps,
    Metric::Eps,
    Metric::Pbr,
    Metric::Per,
    Metric::Price,
];

/// Source label (unit suffix stripped) → canonical metric.
///
/// Cash-dividend labels map to `Dps` ahead of any other dividend label.
static ALIASES: &[(&str, Metric)] = &[
    ("BPS", Metric::Bps),
    ("DPS", Metric::Dps),
    ("현금DPS", Metric::Dps),
    ("EPS", Metric::Eps),
    ("PBR", Metric::Pbr),
    ("PER", Metric::Per),
    ("PRICE", Metric::Price),
    ("배당수익률", Metric::DividendYield),
    ("DIVIDENDYIELD", Metric::DividendYield),
    ("발행주식수", Metric::SharesOutstanding),
    ("SHARESOUTSTANDING", Metric::SharesOutstanding),
    ("SHARES", Metric::SharesOutstanding),
    ("FIXEDDATEPRICE", Metric::FixedDatePrice),
    ("CURRENTPRICE", Metric::CurrentPrice),
];

impl Metric {
    /// Resolve a raw source label.
    ///
    /// Trailing parenthesised qualifiers are dropped (`EPS(원)` → `EPS`,
    /// `발행주식수(보통주)` → `발행주식수`), then the remainder is matched
    /// case-insensitively against the alias table. No substring matching.
    pub fn resolve(label: &str) -> Metric {
        let trimmed = label.trim();
        let stem = trimmed
            .find('(')
            .map_or(trimmed, |i| &trimmed[..i])
            .trim();
        let normalized: String = stem
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .flat_map(char::to_uppercase)
            .collect();

        ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, metric)| metric.clone())
            .unwrap_or_else(|| Metric::Other(trimmed.to_string()))
    }

    /// Canonical label used in output tables.
    pub fn as_str(&self) -> &str {
        match self {
            Metric::Bps => "BPS",
            Metric::Dps => "DPS",
            Metric::Eps => "EPS",
            Metric::Pbr => "PBR",
            Metric::Per => "PER",
            Metric::Price => "PRICE",
            Metric::DividendYield => "DividendYield",
            Metric::SharesOutstanding => "SharesOutstanding",
            Metric::FixedDatePrice => "FixedDatePrice",
            Metric::CurrentPrice => "CurrentPrice",
            Metric::Other(label) => label,
        }
    }

    /// Position in [`OUTPUT_METRICS`], if this metric is emitted.
    pub fn output_rank(&self) -> Option<usize> {
        OUTPUT_METRICS.iter().position(|m| m == self)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
