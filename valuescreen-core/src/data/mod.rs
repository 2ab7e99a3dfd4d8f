//! Fact ingestion and panel construction

pub mod builder;
pub mod coerce;
pub mod fixed_date;
pub mod ingest;
pub mod panel;
pub mod schema;

pub use builder::{BuildStats, PanelBuilder};
pub use coerce::coerce_value;
pub use fixed_date::{fixed_date_prices, ReferenceDay};
pub use ingest::{FactIngestor, IngestError};
pub use panel::{CompanyPanel, MetricRow};
pub use schema::{FactSchema, SchemaError};
