use polars::prelude::*;
use std::path::Path;

use crate::data::schema::{FactSchema, SchemaError};
use crate::domain::RawFact;

/// Data ingestor for CSV and Parquet fact files
pub struct FactIngestor;

impl FactIngestor {
    pub fn new() -> Self {
        Self
    }

    /// Ingest a file, choosing the reader by extension (`.parquet`/`.pq`,
    /// anything else is read as CSV).
    pub fn ingest_path(&self, path: &Path) -> Result<Vec<RawFact>, IngestError> {
        let is_parquet = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"))
            .unwrap_or(false);
        if is_parquet {
            self.ingest_parquet(path)
        } else {
            self.ingest_csv(path)
        }
    }

    /// Ingest CSV file. All columns are read as text.
    pub fn ingest_csv(&self, path: &Path) -> Result<Vec<RawFact>, IngestError> {
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| IngestError::IngestFailed(e.to_string()))?;
        Self::facts_from_frame(&df)
    }

    /// Ingest Parquet file
    pub fn ingest_parquet(&self, path: &Path) -> Result<Vec<RawFact>, IngestError> {
        let df = LazyFrame::scan_parquet(path, Default::default())
            .and_then(|lf| lf.collect())
            .map_err(|e| IngestError::IngestFailed(e.to_string()))?;
        Self::facts_from_frame(&df)
    }

    /// Convert a frame with the fact columns into raw facts.
    ///
    /// Columns of any dtype are cast to text. Rows without a code or a
    /// metric label are dropped; a null value becomes an empty (undefined)
    /// value.
    pub fn facts_from_frame(df: &DataFrame) -> Result<Vec<RawFact>, IngestError> {
        let cols = FactSchema::locate(df)?;
        let text = |name: &str| -> Result<Column, IngestError> {
            df.column(name)
                .and_then(|c| c.cast(&DataType::String))
                .map_err(|e| IngestError::IngestFailed(e.to_string()))
        };

        let code = text(&cols.code)?;
        let name = text(&cols.name)?;
        let year = text(&cols.year)?;
        let metric = text(&cols.metric)?;
        let value = text(&cols.value)?;

        let str_ca = |c: &Column| -> Result<StringChunked, IngestError> {
            c.as_materialized_series()
                .str()
                .cloned()
                .map_err(|e| IngestError::IngestFailed(e.to_string()))
        };
        let (code, name, year, metric, value) = (
            str_ca(&code)?,
            str_ca(&name)?,
            str_ca(&year)?,
            str_ca(&metric)?,
            str_ca(&value)?,
        );

        let mut facts = Vec::with_capacity(df.height());
        let mut dropped = 0usize;
        for i in 0..df.height() {
            let (Some(c), Some(m)) = (code.get(i), metric.get(i)) else {
                dropped += 1;
                continue;
            };
            facts.push(RawFact::new(
                c,
                name.get(i).unwrap_or_default(),
                year.get(i).unwrap_or_default(),
                m,
                value.get(i).unwrap_or_default(),
            ));
        }
        if dropped > 0 {
            tracing::warn!(dropped, "dropped fact rows without code or metric");
        }
        Ok(facts)
    }
}

impl Default for FactIngestor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Ingest failed: {0}")]
    IngestFailed(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_csv_keeps_comma_values_and_leading_zeros() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Code,Name,Year,Metric,Value").unwrap();
        writeln!(file, "005930,Samsung,2024,EPS,\"1,234\"").unwrap();
        writeln!(file, "005930,Samsung,Current,CurrentPrice,71000").unwrap();
        writeln!(file, "005930,Samsung,2025,PER,").unwrap();
        file.flush().unwrap();

        let facts = FactIngestor::new().ingest_path(file.path()).unwrap();
        assert_eq!(facts.len(), 3);
        assert_eq!(facts[0].code, "005930");
        assert_eq!(facts[0].value, "1,234");
        assert_eq!(facts[1].year, "Current");
        assert_eq!(facts[2].value, "");
    }

    #[test]
    fn test_frame_with_numeric_values() {
        let df = df!(
            "Code" => &["000660"],
            "Name" => &["Hynix"],
            "Year" => &["2023"],
            "Metric" => &["BPS"],
            "Value" => &[10000.5],
        )
        .unwrap();
        let facts = FactIngestor::facts_from_frame(&df).unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(crate::data::coerce::coerce_value(&facts[0].value), Some(10000.5));
    }

    #[test]
    fn test_parquet_with_numeric_values() {
        let mut df = df!(
            "Code" => &["005930", "005930"],
            "Name" => &["Samsung", "Samsung"],
            "Year" => &["2024", "Current"],
            "Metric" => &["EPS", "CurrentPrice"],
            "Value" => &[1234.0, 71000.0],
        )
        .unwrap();
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        ParquetWriter::new(file.reopen().unwrap())
            .finish(&mut df)
            .unwrap();

        let facts = FactIngestor::new().ingest_path(file.path()).unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].code, "005930");
        assert_eq!(crate::data::coerce::coerce_value(&facts[0].value), Some(1234.0));
        assert_eq!(facts[1].year, "Current");
        assert_eq!(crate::data::coerce::coerce_value(&facts[1].value), Some(71000.0));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let df = df!(
            "Code" => &["000660"],
            "Name" => &["Hynix"],
        )
        .unwrap();
        let err = FactIngestor::facts_from_frame(&df).unwrap_err();
        assert!(matches!(err, IngestError::Schema(SchemaError::MissingColumn(_))));
    }
}
