//! Fact loading for the runner.
//!
//! Reads the long-format fact file (CSV or Parquet) through the core
//! ingestor and stamps the result with a dataset hash, so every artifact
//! can be traced back to the exact input it was computed from.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use valuescreen_core::data::{FactIngestor, IngestError};
use valuescreen_core::domain::{CompanyKey, DatasetHash, RawFact};
use valuescreen_core::fingerprint::dataset_hash;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input file '{path}' does not exist")]
    NotFound { path: String },

    #[error("input file '{path}' contains no facts")]
    Empty { path: String },

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),
}

/// Facts read from disk, with provenance.
#[derive(Debug, Clone)]
pub struct LoadedFacts {
    pub facts: Vec<RawFact>,
    /// BLAKE3 over the fact stream in file order.
    pub dataset_hash: DatasetHash,
    pub source: PathBuf,
    /// Distinct companies in the input, keyed the way panels are.
    pub company_count: usize,
}

/// Load every fact from `path`, refusing missing or empty inputs.
pub fn load_facts(path: &Path) -> Result<LoadedFacts, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.display().to_string(),
        });
    }

    let facts = FactIngestor::new().ingest_path(path)?;
    if facts.is_empty() {
        return Err(LoadError::Empty {
            path: path.display().to_string(),
        });
    }

    Ok(from_facts(facts, path))
}

/// Wrap already-materialised facts (e.g. from a scraper) as a load result.
pub fn from_facts(facts: Vec<RawFact>, source: impl Into<PathBuf>) -> LoadedFacts {
    let company_count = facts
        .iter()
        .map(|f| CompanyKey::new(f.code.trim(), f.name.trim()))
        .collect::<BTreeSet<_>>()
        .len();
    let hash = dataset_hash(&facts);
    let source = source.into();

    tracing::info!(
        source = %source.display(),
        facts = facts.len(),
        companies = company_count,
        dataset_hash = %hash,
        "facts loaded"
    );

    LoadedFacts {
        facts,
        dataset_hash: hash,
        source,
        company_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_csv_and_counts_companies() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "facts.csv",
            "Code,Name,Year,Metric,Value\n\
             005930,Samsung,2024,EPS,\"2,131\"\n\
             005930,Samsung,2025,EPS,\"4,950\"\n\
             000660,Hynix,2025,BPS,\"98,000\"\n",
        );

        let loaded = load_facts(&path).unwrap();
        assert_eq!(loaded.facts.len(), 3);
        assert_eq!(loaded.company_count, 2);
        assert_eq!(loaded.dataset_hash, dataset_hash(&loaded.facts));
        assert_eq!(loaded.source, path);
    }

    #[test]
    fn companies_counted_by_trimmed_code_and_name() {
        let facts = vec![
            RawFact::new("005930", "Samsung", "2024", "EPS", "1"),
            RawFact::new(" 005930 ", "Samsung ", "2025", "EPS", "2"),
            RawFact::new("005930", "Samsung Pref", "2025", "EPS", "3"),
        ];
        let loaded = from_facts(facts, "mem");
        assert_eq!(loaded.company_count, 2);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_facts(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "empty.csv", "Code,Name,Year,Metric,Value\n");
        let err = load_facts(&path).unwrap_err();
        assert!(matches!(err, LoadError::Empty { .. }));
    }

    #[test]
    fn missing_column_surfaces_as_ingest_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "bad.csv", "Code,Name,Year,Value\nA,Alpha,2024,1\n");
        let err = load_facts(&path).unwrap_err();
        assert!(matches!(err, LoadError::Ingest(_)));
    }
}
