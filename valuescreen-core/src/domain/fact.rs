//! RawFact — one row of the long-format input panel.

use serde::{Deserialize, Serialize};

/// A single `(company, year, metric, value)` observation as delivered by the
/// acquisition step. Fields are kept verbatim; year labels, metric labels and
/// values are interpreted by the panel builder, never here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFact {
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Metric")]
    pub metric: String,
    /// Numeric or numeric-looking text (`"1,234"`). Empty when missing.
    #[serde(rename = "Value", default)]
    pub value: String,
}

impl RawFact {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        year: impl Into<String>,
        metric: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            year: year.into(),
            metric: metric.into(),
            value: value.into(),
        }
    }

    /// Fact carrying an already-numeric value.
    pub fn numeric(
        code: impl Into<String>,
        name: impl Into<String>,
        year: impl Into<String>,
        metric: impl Into<String>,
        value: f64,
    ) -> Self {
        Self::new(code, name, year, metric, value.to_string())
    }
}
