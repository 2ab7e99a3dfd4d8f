//! CompanyPanel — dense metric × fiscal-year grid for one company.
//!
//! Every materialised row has exactly one slot per fiscal year; a slot is
//! either a number or undefined (`None`), never absent. Rows also carry a
//! separate `Current` slot for values not yet reported annually.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CompanyKey, FiscalYears, Metric};

/// One metric's values across the fiscal years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    values: Vec<Option<f64>>,
    current: Option<f64>,
}

impl MetricRow {
    /// A row of `len` undefined slots.
    pub fn undefined(len: usize) -> Self {
        Self {
            values: vec![None; len],
            current: None,
        }
    }

    pub fn from_values(values: Vec<Option<f64>>) -> Self {
        Self {
            values,
            current: None,
        }
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Overwrite slot `index`. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: Option<f64>) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn current(&self) -> Option<f64> {
        self.current
    }

    pub fn set_current(&mut self, value: Option<f64>) {
        self.current = value;
    }

    /// Most recent defined yearly value (forward-fill to the last slot).
    pub fn last_defined(&self) -> Option<f64> {
        self.values.iter().rev().find_map(|v| *v)
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// All metric rows of a single company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyPanel {
    key: CompanyKey,
    years: FiscalYears,
    rows: BTreeMap<Metric, MetricRow>,
}

impl CompanyPanel {
    pub fn new(key: CompanyKey, years: FiscalYears) -> Self {
        Self {
            key,
            years,
            rows: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> &CompanyKey {
        &self.key
    }

    pub fn years(&self) -> FiscalYears {
        self.years
    }

    pub fn has(&self, metric: &Metric) -> bool {
        self.rows.contains_key(metric)
    }

    pub fn row(&self, metric: &Metric) -> Option<&MetricRow> {
        self.rows.get(metric)
    }

    pub fn row_mut(&mut self, metric: &Metric) -> Option<&mut MetricRow> {
        self.rows.get_mut(metric)
    }

    /// Get the row for `metric`, materialising an all-undefined one if absent.
    pub fn ensure_row(&mut self, metric: Metric) -> &mut MetricRow {
        let len = self.years.len();
        self.rows
            .entry(metric)
            .or_insert_with(|| MetricRow::undefined(len))
    }

    /// Replace (or add) a whole row. The row is resized to the year axis.
    pub fn insert_row(&mut self, metric: Metric, mut row: MetricRow) {
        row.values.resize(self.years.len(), None);
        self.rows.insert(metric, row);
    }

    /// Value of `metric` in fiscal `year`; `None` if the row, the year, or
    /// the value is missing.
    pub fn value(&self, metric: &Metric, year: u16) -> Option<f64> {
        let index = self.years.index_of(year)?;
        self.rows.get(metric)?.get(index)
    }

    /// Value of `metric` in the `Current` slot.
    pub fn current(&self, metric: &Metric) -> Option<f64> {
        self.rows.get(metric)?.current()
    }

    pub fn metrics(&self) -> impl Iterator<Item = &Metric> {
        self.rows.keys()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
