//! Host-facing facade: read a scoped snapshot, run a job, return the result.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use wareflow_analytics::{
    AbcAnalysisResult, AbcClassifier, AnalyticsConfig, AnalyticsError, AnalyticsReport,
    DemandForecaster, ExpiringStock, ExpiryReport, Forecast, LocalScheduler, ReorderAdvisor,
    ReorderSuggestion, ReportJob, SlottingOptimizer, SlottingSuggestion, StockValuation,
    StocktakeOutcome, StocktakeReconciler, ValuationReport,
};
use wareflow_core::{LocationId, ProductId};
use wareflow_inventory::{
    QuantityStore, SnapshotReader, SnapshotScope, StocktakeCount, WarehouseSnapshot,
};

/// Analytics entry point for request handlers.
///
/// Holds no per-request state; every call reads a fresh snapshot.
#[derive(Debug)]
pub struct AnalyticsService<R, S> {
    reader: R,
    store: S,
    config: AnalyticsConfig,
    scheduler: LocalScheduler,
}

impl<R, S> AnalyticsService<R, S>
where
    R: SnapshotReader,
    S: QuantityStore,
{
    pub fn new(reader: R, store: S, config: AnalyticsConfig) -> Self {
        Self {
            reader,
            store,
            config,
            scheduler: LocalScheduler::new(),
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    fn snapshot(&self, scope: SnapshotScope) -> Result<WarehouseSnapshot, AnalyticsError> {
        Ok(self.reader.snapshot(scope)?)
    }

    pub fn valuation(&self) -> Result<ValuationReport, AnalyticsError> {
        let snapshot = self.snapshot(SnapshotScope::Warehouse)?;
        self.scheduler.run(&StockValuation::new(&snapshot))
    }

    pub fn abc_analysis(&self) -> Result<AbcAnalysisResult, AnalyticsError> {
        let snapshot = self.snapshot(SnapshotScope::Warehouse)?;
        let job = AbcClassifier::new(&snapshot).with_thresholds(self.config.abc.clone());
        self.scheduler.run(&job)
    }

    pub fn reorder_suggestions(&self) -> Result<Vec<ReorderSuggestion>, AnalyticsError> {
        let snapshot = self.snapshot(SnapshotScope::Warehouse)?;
        let job = ReorderAdvisor::new(&snapshot).with_policy(self.config.reorder.clone());
        self.scheduler.run(&job)
    }

    /// Forecast demand for one product, or for the whole warehouse when `product` is `None`.
    pub fn forecast_demand(
        &self,
        product: Option<ProductId>,
        anchor: NaiveDate,
    ) -> Result<Forecast, AnalyticsError> {
        let scope = product.map_or(SnapshotScope::Warehouse, SnapshotScope::Product);
        let snapshot = self.snapshot(scope)?;

        let mut job =
            DemandForecaster::new(&snapshot, anchor).with_window(self.config.forecast.clone());
        if let Some(id) = product {
            job = job.for_product(id);
        }
        self.scheduler.run(&job)
    }

    pub fn slotting_suggestions(&self) -> Result<Vec<SlottingSuggestion>, AnalyticsError> {
        let snapshot = self.snapshot(SnapshotScope::Warehouse)?;
        let job = SlottingOptimizer::new(&snapshot).with_thresholds(self.config.slotting.clone());
        self.scheduler.run(&job)
    }

    pub fn expiring_stock(&self, as_of: DateTime<Utc>) -> Result<Vec<ExpiringStock>, AnalyticsError> {
        let snapshot = self.snapshot(SnapshotScope::Warehouse)?;
        let job = ExpiryReport::new(&snapshot, as_of).with_window_days(self.config.expiry_window_days);
        self.scheduler.run(&job)
    }

    /// Reconcile a physical count and commit the corrections as one batch.
    pub fn submit_stocktake(
        &self,
        location_id: LocationId,
        counts: Vec<StocktakeCount>,
    ) -> Result<StocktakeOutcome, AnalyticsError> {
        let snapshot = self.snapshot(SnapshotScope::Location(location_id))?;
        let outcome =
            StocktakeReconciler::new(&snapshot, location_id, counts).reconcile_and_apply(&self.store)?;

        let result = outcome.result();
        info!(
            location = %location_id,
            counted = result.total_items,
            discrepancies = result.discrepancies.len(),
            applied = result.applied,
            "stocktake submitted"
        );
        Ok(outcome)
    }

    /// Warehouse-wide reports computed concurrently from one snapshot.
    pub fn warehouse_reports(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Result<AnalyticsReport, AnalyticsError>>, AnalyticsError> {
        let snapshot = self.snapshot(SnapshotScope::Warehouse)?;

        let valuation = StockValuation::new(&snapshot);
        let abc = AbcClassifier::new(&snapshot).with_thresholds(self.config.abc.clone());
        let reorder = ReorderAdvisor::new(&snapshot).with_policy(self.config.reorder.clone());
        let slotting =
            SlottingOptimizer::new(&snapshot).with_thresholds(self.config.slotting.clone());
        let expiry =
            ExpiryReport::new(&snapshot, as_of).with_window_days(self.config.expiry_window_days);

        let jobs: [&dyn ReportJob; 5] = [&valuation, &abc, &reorder, &slotting, &expiry];
        Ok(self.scheduler.run_all(&jobs))
    }
}
