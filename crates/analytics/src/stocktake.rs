//! Stocktake reconciliation: counted vs recorded quantities at one location.
//!
//! The physical count is authoritative. Reconciliation itself is pure; the
//! resulting quantity corrections are handed to a `QuantityStore` which
//! applies them all-or-nothing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use wareflow_core::{LocationId, ProductId, ValueObject};
use wareflow_inventory::{
    QuantityStore, QuantityUpdate, StocktakeCount, StoreError, WarehouseSnapshot,
};

use crate::job::AnalyticsJob;
use crate::result::AnalyticsError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StocktakeDiscrepancy {
    pub product_id: ProductId,
    pub expected: u64,
    pub counted: u64,
    /// `counted - expected`.
    pub discrepancy: i64,
}

impl ValueObject for StocktakeDiscrepancy {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StocktakeResult {
    pub location_id: LocationId,
    pub total_items: usize,
    pub accurate_items: usize,
    pub discrepancies: Vec<StocktakeDiscrepancy>,
    /// Corrections to persist, one per product, in first-counted order.
    pub updates: Vec<QuantityUpdate>,
    pub accuracy_percentage: f64,
    /// Whether `updates` have been committed to the store.
    pub applied: bool,
}

/// Result of reconciling and committing a stocktake.
#[derive(Debug, Clone, PartialEq)]
pub enum StocktakeOutcome {
    Applied(StocktakeResult),
    /// Nothing was committed; the report is returned for diagnostics.
    NotApplied {
        result: StocktakeResult,
        error: StoreError,
    },
}

impl StocktakeOutcome {
    pub fn result(&self) -> &StocktakeResult {
        match self {
            StocktakeOutcome::Applied(r) => r,
            StocktakeOutcome::NotApplied { result, .. } => result,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, StocktakeOutcome::Applied(_))
    }
}

/// `counted - expected`, clamped to the `i64` range.
fn signed_difference(counted: u64, expected: u64) -> i64 {
    let diff = i128::from(counted) - i128::from(expected);
    i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
}

/// Compare `counts` against `recorded` quantities at `location_id`.
///
/// Lines are processed in order and each count immediately becomes the
/// recorded value, so a product counted twice is compared the second time
/// against its first count. Products without a record are expected at zero.
pub fn reconcile(
    location_id: LocationId,
    counts: &[StocktakeCount],
    recorded: &HashMap<ProductId, u64>,
) -> StocktakeResult {
    let mut working: HashMap<ProductId, u64> = HashMap::new();
    let mut touched: Vec<ProductId> = Vec::new();
    let mut discrepancies = Vec::new();
    let mut accurate_items = 0usize;

    for count in counts {
        let expected = working
            .get(&count.product_id)
            .or_else(|| recorded.get(&count.product_id))
            .copied()
            .unwrap_or(0);

        if count.counted == expected {
            accurate_items += 1;
        } else {
            discrepancies.push(StocktakeDiscrepancy {
                product_id: count.product_id,
                expected,
                counted: count.counted,
                discrepancy: signed_difference(count.counted, expected),
            });
        }

        if working.insert(count.product_id, count.counted).is_none() {
            touched.push(count.product_id);
        }
    }

    let updates = touched
        .into_iter()
        .filter_map(|product_id| {
            let new_quantity = working.get(&product_id).copied()?;
            let before = recorded.get(&product_id).copied().unwrap_or(0);
            (new_quantity != before).then_some(QuantityUpdate {
                product_id,
                new_quantity,
            })
        })
        .collect();

    let total_items = counts.len();
    let accuracy_percentage = if total_items == 0 {
        100.0
    } else {
        accurate_items as f64 / total_items as f64 * 100.0
    };

    StocktakeResult {
        location_id,
        total_items,
        accurate_items,
        discrepancies,
        updates,
        accuracy_percentage,
        applied: false,
    }
}

/// Job: reconcile a count submission against a snapshot.
#[derive(Debug, Clone)]
pub struct StocktakeReconciler<'a> {
    snapshot: &'a WarehouseSnapshot,
    location_id: LocationId,
    counts: Vec<StocktakeCount>,
}

impl<'a> StocktakeReconciler<'a> {
    pub fn new(
        snapshot: &'a WarehouseSnapshot,
        location_id: LocationId,
        counts: Vec<StocktakeCount>,
    ) -> Self {
        Self {
            snapshot,
            location_id,
            counts,
        }
    }

    /// Reconcile, then commit the corrections through `store` as one unit.
    pub fn reconcile_and_apply<S>(&self, store: &S) -> Result<StocktakeOutcome, AnalyticsError>
    where
        S: QuantityStore + ?Sized,
    {
        let mut result = self.run()?;

        if result.updates.is_empty() {
            result.applied = true;
            return Ok(StocktakeOutcome::Applied(result));
        }

        match store.apply_quantities(self.location_id, &result.updates) {
            Ok(()) => {
                result.applied = true;
                info!(
                    location = %self.location_id,
                    updates = result.updates.len(),
                    "stocktake corrections applied"
                );
                Ok(StocktakeOutcome::Applied(result))
            }
            Err(error) => {
                warn!(
                    location = %self.location_id,
                    updates = result.updates.len(),
                    error = %error,
                    "stocktake corrections rejected; nothing applied"
                );
                Ok(StocktakeOutcome::NotApplied { result, error })
            }
        }
    }
}

impl AnalyticsJob for StocktakeReconciler<'_> {
    type Output = StocktakeResult;

    fn kind(&self) -> &'static str {
        "inventory.stocktake"
    }

    fn run(&self) -> Result<StocktakeResult, AnalyticsError> {
        let index = self.snapshot.index();
        if index.location(self.location_id).is_none() {
            return Err(AnalyticsError::InvalidInput(format!(
                "unknown stocktake location {}",
                self.location_id
            )));
        }

        let counts: Vec<StocktakeCount> = self
            .counts
            .iter()
            .filter(|c| {
                let known = index.product(c.product_id).is_some();
                if !known {
                    debug!(product = %c.product_id, "skipping count for unknown product");
                }
                known
            })
            .copied()
            .collect();

        let recorded: HashMap<ProductId, u64> = self
            .snapshot
            .inventory
            .iter()
            .filter(|r| r.location_id == self.location_id)
            .fold(HashMap::new(), |mut acc, r| {
                let slot = acc.entry(r.product_id).or_insert(0u64);
                *slot = slot.saturating_add(r.quantity);
                acc
            });

        let result = reconcile(self.location_id, &counts, &recorded);
        info!(
            location = %self.location_id,
            counted = result.total_items,
            discrepancies = result.discrepancies.len(),
            accuracy = result.accuracy_percentage,
            "stocktake reconciled"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{inventory, location, product, zone};
    use proptest::prelude::*;
    use std::sync::Mutex;
    use wareflow_inventory::VelocityTier;

    /// Store double that records committed batches or rejects everything.
    #[derive(Default)]
    struct RecordingStore {
        reject: bool,
        committed: Mutex<Vec<(LocationId, Vec<QuantityUpdate>)>>,
    }

    impl QuantityStore for RecordingStore {
        fn apply_quantities(
            &self,
            location_id: LocationId,
            updates: &[QuantityUpdate],
        ) -> Result<(), StoreError> {
            if self.reject {
                return Err(StoreError::Backend("connection reset".to_string()));
            }
            self.committed
                .lock()
                .unwrap()
                .push((location_id, updates.to_vec()));
            Ok(())
        }
    }

    fn count(product_id: ProductId, counted: u64) -> StocktakeCount {
        StocktakeCount {
            product_id,
            counted,
        }
    }

    #[test]
    fn reports_discrepancies_and_accuracy() {
        let loc = LocationId::new();
        let (a, b, c) = (ProductId::new(), ProductId::new(), ProductId::new());
        let recorded = HashMap::from([(a, 10), (b, 5)]);

        let result = reconcile(loc, &[count(a, 10), count(b, 3), count(c, 2)], &recorded);

        assert_eq!(result.total_items, 3);
        assert_eq!(result.accurate_items, 1);
        assert_eq!(
            result.discrepancies,
            vec![
                StocktakeDiscrepancy { product_id: b, expected: 5, counted: 3, discrepancy: -2 },
                StocktakeDiscrepancy { product_id: c, expected: 0, counted: 2, discrepancy: 2 },
            ]
        );
        assert_eq!(
            result.updates,
            vec![
                QuantityUpdate { product_id: b, new_quantity: 3 },
                QuantityUpdate { product_id: c, new_quantity: 2 },
            ]
        );
        assert!((result.accuracy_percentage - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_submission_is_fully_accurate() {
        let result = reconcile(LocationId::new(), &[], &HashMap::new());
        assert_eq!(result.total_items, 0);
        assert_eq!(result.accuracy_percentage, 100.0);
        assert!(result.updates.is_empty());
    }

    #[test]
    fn repeated_product_compares_against_previous_count() {
        let a = ProductId::new();
        let recorded = HashMap::from([(a, 10)]);
        let result = reconcile(LocationId::new(), &[count(a, 8), count(a, 8)], &recorded);

        assert_eq!(result.total_items, 2);
        assert_eq!(result.accurate_items, 1);
        assert_eq!(result.discrepancies.len(), 1);
        assert_eq!(result.updates, vec![QuantityUpdate { product_id: a, new_quantity: 8 }]);
    }

    fn snapshot_with_stock() -> (WarehouseSnapshot, LocationId, ProductId) {
        let z = zone("Bulk", VelocityTier::Low);
        let loc = location(&z, "A", "01", "01", "01");
        let p = product("P", 1);
        let snapshot = WarehouseSnapshot {
            products: vec![p.clone()],
            locations: vec![loc.clone()],
            zones: vec![z],
            inventory: vec![inventory(p.id, loc.id, 10)],
            ..WarehouseSnapshot::default()
        };
        (snapshot, loc.id, p.id)
    }

    #[test]
    fn applied_outcome_commits_updates_once() {
        let (snapshot, loc, p) = snapshot_with_stock();
        let store = RecordingStore::default();

        let outcome = StocktakeReconciler::new(&snapshot, loc, vec![count(p, 7)])
            .reconcile_and_apply(&store)
            .unwrap();

        assert!(outcome.is_applied());
        assert!(outcome.result().applied);
        let committed = store.committed.lock().unwrap();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0], (loc, vec![QuantityUpdate { product_id: p, new_quantity: 7 }]));
    }

    #[test]
    fn rejected_commit_is_reported_as_not_applied() {
        let (snapshot, loc, p) = snapshot_with_stock();
        let store = RecordingStore {
            reject: true,
            ..RecordingStore::default()
        };

        let outcome = StocktakeReconciler::new(&snapshot, loc, vec![count(p, 7)])
            .reconcile_and_apply(&store)
            .unwrap();

        match outcome {
            StocktakeOutcome::NotApplied { result, error } => {
                assert!(!result.applied);
                assert_eq!(result.discrepancies.len(), 1);
                assert_eq!(error, StoreError::Backend("connection reset".to_string()));
            }
            other => panic!("expected NotApplied, got {other:?}"),
        }
    }

    #[test]
    fn unknown_products_are_skipped_and_unknown_location_is_rejected() {
        let (snapshot, loc, p) = snapshot_with_stock();

        let result = StocktakeReconciler::new(&snapshot, loc, vec![count(p, 10), count(ProductId::new(), 4)])
            .run()
            .unwrap();
        assert_eq!(result.total_items, 1);
        assert_eq!(result.accuracy_percentage, 100.0);

        let err = StocktakeReconciler::new(&snapshot, LocationId::new(), vec![count(p, 1)])
            .run()
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }

    #[test]
    fn extreme_quantities_clamp_the_discrepancy() {
        let a = ProductId::new();
        let b = ProductId::new();
        let recorded = HashMap::from([(b, u64::MAX)]);

        let result = reconcile(LocationId::new(), &[count(a, u64::MAX), count(b, 0)], &recorded);
        assert_eq!(result.discrepancies[0].discrepancy, i64::MAX);
        assert_eq!(result.discrepancies[1].discrepancy, i64::MIN);
        assert_eq!(signed_difference(5, 8), -3);
    }

    #[test]
    fn duplicate_records_saturate_when_summed() {
        let (mut snapshot, loc, p) = snapshot_with_stock();
        snapshot.inventory.push(inventory(p, loc, u64::MAX));

        let result = StocktakeReconciler::new(&snapshot, loc, vec![count(p, u64::MAX)])
            .run()
            .unwrap();
        assert_eq!(result.accurate_items, 1);
        assert!(result.updates.is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: accuracy stays in [0, 100], discrepancies match mismatched
        /// lines, and re-running against the corrected quantities is clean.
        #[test]
        fn reconciliation_is_bounded_and_idempotent(
            lines in prop::collection::vec((0u64..50, 0u64..50), 0..20)
        ) {
            let loc = LocationId::new();
            let products: Vec<ProductId> = lines.iter().map(|_| ProductId::new()).collect();
            let recorded: HashMap<ProductId, u64> = products
                .iter()
                .zip(&lines)
                .map(|(id, (recorded, _))| (*id, *recorded))
                .collect();
            let counts: Vec<StocktakeCount> = products
                .iter()
                .zip(&lines)
                .map(|(id, (_, counted))| count(*id, *counted))
                .collect();

            let first = reconcile(loc, &counts, &recorded);
            prop_assert!((0.0..=100.0).contains(&first.accuracy_percentage));
            let mismatched = lines.iter().filter(|(r, c)| r != c).count();
            prop_assert_eq!(first.discrepancies.len(), mismatched);

            let mut corrected = recorded.clone();
            for u in &first.updates {
                corrected.insert(u.product_id, u.new_quantity);
            }
            for c in &counts {
                prop_assert_eq!(corrected.get(&c.product_id).copied(), Some(c.counted));
            }

            let second = reconcile(loc, &counts, &corrected);
            prop_assert!(second.discrepancies.is_empty());
            prop_assert!(second.updates.is_empty());
        }
    }
}
