//! Quality KPI aggregation.
//!
//! Turns monthly per-site quality records into filtered record sets, metric
//! tiles with period-over-period trends, chart series, site contribution
//! tables and unit-conversion disclosures. The engine modules (`filter`,
//! `period`, `metrics`, `series`, `contribution`, `conversions`, `pipeline`)
//! are pure; `loader`, `config`, `plants` and `output` do the I/O.
pub mod config;
pub mod contribution;
pub mod conversions;
pub mod error;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod month;
pub mod output;
pub mod period;
pub mod pipeline;
pub mod plants;
pub mod reports;
pub mod series;
pub mod types;
pub mod util;

pub use error::{KpiError, KpiResult};
pub use month::MonthKey;
pub use pipeline::{build_dashboard, Dashboard};
pub use types::{FilterState, MonthlySiteKpi};
