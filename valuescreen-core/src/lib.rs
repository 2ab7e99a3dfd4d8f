//! ValueScreen Core — fact ingestion, company panels, price reconciliation,
//! ratio recalculation and classification.
//!
//! This crate contains the reconciliation and derivation engine:
//! - Domain types (raw facts, canonical metrics, fiscal year axis)
//! - Panel builder: long-format facts → dense per-company metric × year grid
//! - Price reconciler: ordered fallback tiers with write-once slots
//! - Ratio recalculator: PER/PBR against the reconciled price
//! - Classifier: undervalued flag, EPS CAGR, size bucket
//! - Row emitter and run fingerprints

pub mod classify;
pub mod config;
pub mod data;
pub mod domain;
pub mod emit;
pub mod fingerprint;
pub mod pipeline;
pub mod recalc;
pub mod reconcile;

pub use classify::{classify, Classification, SizeBucket};
pub use config::{ConfigError, Labels, ScreenConfig};
pub use data::{CompanyPanel, MetricRow, PanelBuilder};
pub use domain::{CompanyKey, FiscalYears, Metric, RawFact};
pub use emit::{emit_rows, OutputRow};
pub use pipeline::{screen, screen_company, CompanyScreen};
pub use reconcile::{PriceReconciler, PriceTier};
