//! emistat - GHG Protocol carbon emission calculator for activity data
//!
//! This library provides functionality to:
//! - Classify marketing/operational activities into GHG Protocol scopes
//! - Resolve versioned, region-aware emission factors from a data-file registry
//! - Normalize heterogeneous activity units into factor canonical units
//! - Calculate kg CO₂e per activity and aggregate grouped report totals
//! - Stream activity batches from JSONL files with filtering
//!
//! # Examples
//!
//! ```no_run
//! use emistat::{
//!     aggregation::Aggregator,
//!     calculator::EmissionCalculator,
//!     data_loader::ActivityLoader,
//!     factors::FactorRegistry,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> emistat::Result<()> {
//!     // Initialize components
//!     let registry = Arc::new(FactorRegistry::new(false).await);
//!     let calculator = Arc::new(EmissionCalculator::new(registry));
//!     let aggregator = Aggregator::new(calculator);
//!
//!     // Load and aggregate activity data
//!     let loader = ActivityLoader::from_path("activities.jsonl").await?;
//!     let report = aggregator.aggregate_stream(loader.load_activities()).await?;
//!     println!("{} kg CO2e", report.total);
//!
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod calculator;
pub mod classifier;
pub mod cli;
pub mod data_loader;
pub mod error;
pub mod factors;
pub mod filters;
pub mod output;
pub mod types;
pub mod units;

// Re-export commonly used types
pub use aggregation::{AggregateReport, Aggregator};
pub use calculator::EmissionCalculator;
pub use error::{EmistatError, Result};
pub use factors::FactorRegistry;
pub use types::{
    ActivityDate, ActivityInput, ActivityType, CalculationResult, Category, Channel,
    EmissionFactor, Market, Scope, Unit,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
