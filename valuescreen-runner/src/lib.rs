//! ValueScreen Runner — screen orchestration, fact loading, export.
//!
//! This crate builds on `valuescreen-core` to provide:
//! - Run configuration (TOML) with the screen rules embedded
//! - Fact loading from CSV/Parquet with a dataset hash
//! - Batch runner that screens companies in parallel on rayon
//! - CSV table, JSON manifest and Markdown report artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;

pub use config::{ConfigError, RunConfig, RunId};
pub use data_loader::{load_facts, LoadError, LoadedFacts};
pub use export::{export_json, export_table_csv, generate_report, load_artifacts, save_artifacts};
pub use runner::{run_from_config, run_loaded, run_screen, RunError, ScreenResult, ScreenSummary};
