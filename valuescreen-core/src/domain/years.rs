//! Fiscal year axis and raw year labels.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Inclusive, ascending range of fiscal years every panel row is indexed by.
///
/// Slot `i` of a row holds year `first + i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiscalYears {
    first: u16,
    last: u16,
}

impl FiscalYears {
    /// Returns `None` when `last < first`.
    pub fn new(first: u16, last: u16) -> Option<Self> {
        (first <= last).then_some(Self { first, last })
    }

    pub fn first(&self) -> u16 {
        self.first
    }

    /// The final fiscal year, used as the valuation basis.
    pub fn last(&self) -> u16 {
        self.last
    }

    /// Number of year slots in every row.
    pub fn len(&self) -> usize {
        usize::from(self.last - self.first) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, year: u16) -> bool {
        (self.first..=self.last).contains(&year)
    }

    /// Slot offset for `year`, or `None` if out of range.
    pub fn index_of(&self, year: u16) -> Option<usize> {
        self.contains(year).then(|| usize::from(year - self.first))
    }

    pub fn year_at(&self, index: usize) -> Option<u16> {
        (index < self.len()).then(|| self.first + index as u16)
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> {
        self.first..=self.last
    }
}

impl Default for FiscalYears {
    fn default() -> Self {
        Self {
            first: 2020,
            last: 2026,
        }
    }
}

impl fmt::Display for FiscalYears {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

/// Sentinel label for "latest value, not yet reported annually".
pub const CURRENT_LABEL: &str = "Current";

/// A four-digit run not touching other digits.
static YEAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])([0-9]{4})(?:[^0-9]|$)").expect("year pattern compiles")
});

/// A parsed `Year` column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YearLabel {
    Fiscal(u16),
    Current,
}

impl YearLabel {
    /// Parse a raw year label.
    ///
    /// Accepts `"Current"` (any case) or any label containing a four-digit
    /// year, e.g. `"2024"`, `"2026/12(E)"`. The first run of four digits wins.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(CURRENT_LABEL) {
            return Some(YearLabel::Current);
        }
        YEAR_PATTERN
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .map(YearLabel::Fiscal)
    }
}

impl fmt::Display for YearLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearLabel::Fiscal(y) => write!(f, "{y}"),
            YearLabel::Current => f.write_str(CURRENT_LABEL),
        }
    }
}
