//! Waste-management KPIs for a company → branch → site hierarchy.
//!
//! Monthly waste records are rolled up per site, branch or company, turned
//! into sorting / recycling / disposal rates and waste intensity, assembled
//! into trend series, and reshaped into Sankey flow graphs.
pub mod aggregate;
pub mod config;
pub mod error;
pub mod formulas;
pub mod loader;
pub mod output;
pub mod period;
pub mod reports;
pub mod sankey;
pub mod source;
pub mod thresholds;
pub mod trend;
pub mod types;
pub mod util;

pub use error::{KpiError, Result};
pub use period::Period;
pub use source::{Dataset, RecordSource};
