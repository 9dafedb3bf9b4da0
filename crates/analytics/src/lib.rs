//! `wareflow-analytics`
//!
//! **Responsibility:** inventory analytics and forecasting over read-only
//! warehouse snapshots.
//!
//! - Every component is a pure, synchronous job: snapshot in, value out.
//! - Jobs never call each other and hold no state between runs.
//! - The only write path is stocktake reconciliation, which hands its
//!   corrections to a caller-supplied `QuantityStore` as a single batch.

pub mod abc;
pub mod config;
pub mod expiry;
pub mod forecast;
pub mod job;
pub mod reorder;
pub mod result;
pub mod scheduler;
pub mod slotting;
pub mod stocktake;
pub mod valuation;

#[cfg(test)]
mod test_support;

pub use abc::{AbcAnalysisResult, AbcCategory, AbcClassifier, AbcMember, AbcTier};
pub use config::{AbcThresholds, AnalyticsConfig, ForecastWindow, ReorderPolicy, SlottingThresholds};
pub use expiry::{ExpiringStock, ExpiryReport};
pub use forecast::{
    daily_demand_series, DemandForecaster, DemandObservation, Forecast, ForecastPoint, TrendLine,
};
pub use job::AnalyticsJob;
pub use reorder::{ReorderAdvisor, ReorderSuggestion};
pub use result::{AnalyticsError, AnalyticsReport};
pub use scheduler::{LocalScheduler, ReportJob};
pub use slotting::{SlottingOptimizer, SlottingSuggestion};
pub use stocktake::{StocktakeDiscrepancy, StocktakeOutcome, StocktakeReconciler, StocktakeResult};
pub use valuation::{ProductValuation, StockValuation, ValuationReport, ValuationSummary};
