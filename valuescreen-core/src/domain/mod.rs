//! Domain types for ValueScreen

pub mod fact;
pub mod ids;
pub mod metric;
pub mod years;

pub use fact::RawFact;
pub use ids::{CompanyKey, ConfigHash, DatasetHash, OutputHash};
pub use metric::{Metric, OUTPUT_METRICS};
pub use years::{FiscalYears, YearLabel, CURRENT_LABEL};
