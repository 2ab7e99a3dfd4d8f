//! Row emission — flatten a classified panel into output rows.

use serde::{Deserialize, Serialize};

use crate::classify::Classification;
use crate::config::Labels;
use crate::data::CompanyPanel;
use crate::domain::{CompanyKey, Metric, OUTPUT_METRICS};

/// One `(company, metric)` line of the screen output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    pub company: CompanyKey,
    pub metric: Metric,
    /// One value per fiscal year, ascending.
    pub values: Vec<Option<f64>>,
    pub classification: Classification,
}

impl OutputRow {
    /// Growth rate as shown in the table: one-decimal percentage, or the
    /// placeholder when undefined or exactly zero.
    pub fn cagr_display(&self, labels: &Labels) -> String {
        format_cagr(self.classification.eps_cagr, labels)
    }

    pub fn undervalued_display<'a>(&self, labels: &'a Labels) -> &'a str {
        flag(self.classification.is_undervalued, &labels.undervalued, labels)
    }

    pub fn high_growth_display<'a>(&self, labels: &'a Labels) -> &'a str {
        flag(self.classification.is_high_growth, &labels.high_growth, labels)
    }

    pub fn size_display<'a>(&self, labels: &'a Labels) -> &'a str {
        self.classification.size_bucket.label(labels)
    }

    /// Sort key: company, then emission order of the metric.
    pub fn sort_key(&self) -> (&CompanyKey, usize) {
        (&self.company, self.metric.output_rank().unwrap_or(usize::MAX))
    }
}

fn flag<'a>(on: bool, marker: &'a str, labels: &'a Labels) -> &'a str {
    if on {
        marker
    } else {
        &labels.placeholder
    }
}

/// `Some(0.14869)` → `"14.9%"`; `None` and `Some(0.0)` → placeholder.
pub fn format_cagr(cagr: Option<f64>, labels: &Labels) -> String {
    match cagr {
        Some(g) if g != 0.0 => format!("{:.1}%", g * 100.0),
        _ => labels.placeholder.clone(),
    }
}

/// Emit one row per output metric present in the panel, in
/// [`OUTPUT_METRICS`] order. Absent metrics produce no row.
pub fn emit_rows(panel: &CompanyPanel, classification: &Classification) -> Vec<OutputRow> {
    OUTPUT_METRICS
        .iter()
        .filter_map(|metric| {
            let row = panel.row(metric)?;
            Some(OutputRow {
                company: panel.key().clone(),
                metric: metric.clone(),
                values: row.values().to_vec(),
                classification: classification.clone(),
            })
        })
        .collect()
}
