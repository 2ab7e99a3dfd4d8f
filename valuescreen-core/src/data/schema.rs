use polars::prelude::*;

/// Expected columns of the raw fact stream.
pub struct FactSchema;

/// Actual column names in a frame, one per required fact column.
///
/// Files written with a UTF-8 BOM or padded headers still resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactColumns {
    pub code: String,
    pub name: String,
    pub year: String,
    pub metric: String,
    pub value: String,
}

impl FactSchema {
    pub const CODE: &'static str = "Code";
    pub const NAME: &'static str = "Name";
    pub const YEAR: &'static str = "Year";
    pub const METRIC: &'static str = "Metric";
    pub const VALUE: &'static str = "Value";

    /// Get the canonical fact schema. Every column is text; values are
    /// coerced later so comma-formatted numbers survive ingestion.
    pub fn schema() -> Schema {
        Schema::from_iter(
            [Self::CODE, Self::NAME, Self::YEAR, Self::METRIC, Self::VALUE]
                .into_iter()
                .map(|c| Field::new(c.into(), DataType::String)),
        )
    }

    /// Locate all required columns in `df`.
    pub fn locate(df: &DataFrame) -> Result<FactColumns, SchemaError> {
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|n| n.as_str().to_string())
            .collect();

        let find = |wanted: &str| -> Result<String, SchemaError> {
            names
                .iter()
                .find(|n| n.trim_start_matches('\u{feff}').trim() == wanted)
                .cloned()
                .ok_or_else(|| SchemaError::MissingColumn(wanted.to_string()))
        };

        Ok(FactColumns {
            code: find(Self::CODE)?,
            name: find(Self::NAME)?,
            year: find(Self::YEAR)?,
            metric: find(Self::METRIC)?,
            value: find(Self::VALUE)?,
        })
    }

    /// Validate DataFrame against schema
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        Self::locate(df).map(|_| ())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}
