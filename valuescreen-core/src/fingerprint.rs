//! Run fingerprinting — deterministic identification of screen inputs and outputs.
//!
//! - `dataset_hash`: content hash of the fact stream, in input order.
//! - `output_hash`: multiset hash of emitted rows (independent of row order,
//!   so a parallel run and a sequential run hash identically).
//! - `ScreenFingerprint`: everything needed to tell two runs apart.

use crate::domain::{ConfigHash, DatasetHash, OutputHash, RawFact};
use crate::emit::OutputRow;
use serde::{Deserialize, Serialize};

/// BLAKE3 over every fact field, length-prefixed so field boundaries are
/// unambiguous.
pub fn dataset_hash(facts: &[RawFact]) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();
    for fact in facts {
        for field in [&fact.code, &fact.name, &fact.year, &fact.metric, &fact.value] {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
    }
    DatasetHash(hasher.finalize().to_hex().to_string())
}

/// Order-independent hash of a row set.
///
/// Each row is serialised to canonical JSON; the encodings are sorted before
/// hashing, so any permutation of the same rows yields the same hash.
pub fn output_hash(rows: &[OutputRow]) -> OutputHash {
    let mut encoded: Vec<String> = rows
        .iter()
        .map(|r| serde_json::to_string(r).unwrap_or_default())
        .collect();
    encoded.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for e in &encoded {
        hasher.update(&(e.len() as u64).to_le_bytes());
        hasher.update(e.as_bytes());
    }
    OutputHash(hasher.finalize().to_hex().to_string())
}

/// Complete fingerprint of a single screen run, written to the run manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenFingerprint {
    // ── Identity ──
    pub timestamp: chrono::NaiveDateTime,

    // ── Derived hashes ──
    pub config_hash: ConfigHash,
    pub dataset_hash: DatasetHash,
    pub output_hash: OutputHash,

    // ── Sizes ──
    pub fact_count: usize,
    pub company_count: usize,
    pub row_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classification, SizeBucket};
    use crate::domain::{CompanyKey, Metric};

    fn row(code: &str, metric: Metric, v: f64) -> OutputRow {
        OutputRow {
            company: CompanyKey::new(code, "X"),
            metric,
            values: vec![Some(v), None],
            classification: Classification {
                size_bucket: SizeBucket::SmallMid,
                is_undervalued: false,
                is_high_growth: false,
                eps_cagr: None,
                per_basis: None,
                pbr_basis: None,
                market_cap: 0.0,
            },
        }
    }

    #[test]
    fn dataset_hash_is_field_boundary_safe() {
        let a = vec![RawFact::new("AB", "C", "2024", "EPS", "1")];
        let b = vec![RawFact::new("A", "BC", "2024", "EPS", "1")];
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
        assert_eq!(dataset_hash(&a), dataset_hash(&a.clone()));
    }

    #[test]
    fn output_hash_ignores_row_order() {
        let rows = vec![row("A", Metric::Eps, 1.0), row("B", Metric::Per, 2.0)];
        let reversed: Vec<OutputRow> = rows.iter().rev().cloned().collect();
        assert_eq!(output_hash(&rows), output_hash(&reversed));
    }

    #[test]
    fn output_hash_sees_value_changes() {
        let a = vec![row("A", Metric::Eps, 1.0)];
        let b = vec![row("A", Metric::Eps, 1.5)];
        assert_ne!(output_hash(&a), output_hash(&b));
    }
}
