//! Slotting optimisation: move products to zones matching their velocity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use wareflow_core::{LocationId, ProductId, ValueObject};
use wareflow_inventory::{Location, VelocityTier, WarehouseSnapshot};

use crate::config::SlottingThresholds;
use crate::job::AnalyticsJob;
use crate::result::AnalyticsError;

/// Total stock of one product at one location.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAggregate {
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub total_quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlottingSuggestion {
    pub product_id: ProductId,
    pub current_location: LocationId,
    pub suggested_location: LocationId,
    pub current_tier: VelocityTier,
    pub optimal_tier: VelocityTier,
    pub reason: String,
}

impl ValueObject for SlottingSuggestion {}

pub fn optimal_tier(total_quantity: u64, thresholds: &SlottingThresholds) -> VelocityTier {
    if total_quantity > thresholds.high_volume_threshold {
        VelocityTier::High
    } else if total_quantity > thresholds.medium_volume_threshold {
        VelocityTier::Medium
    } else {
        VelocityTier::Low
    }
}

/// Group inventory by (product, location), preserving first-seen order.
pub fn aggregate_stock(snapshot: &WarehouseSnapshot) -> Vec<StockAggregate> {
    let mut positions: HashMap<(ProductId, LocationId), usize> = HashMap::new();
    let mut out: Vec<StockAggregate> = Vec::new();

    for record in &snapshot.inventory {
        let key = (record.product_id, record.location_id);
        match positions.get(&key) {
            Some(&i) => {
                out[i].total_quantity = out[i].total_quantity.saturating_add(record.quantity);
            }
            None => {
                positions.insert(key, out.len());
                out.push(StockAggregate {
                    product_id: record.product_id,
                    location_id: record.location_id,
                    total_quantity: record.quantity,
                });
            }
        }
    }
    out
}

/// Job: relocation suggestions for every stocked (product, location) pair.
#[derive(Debug, Clone)]
pub struct SlottingOptimizer<'a> {
    snapshot: &'a WarehouseSnapshot,
    thresholds: SlottingThresholds,
}

impl<'a> SlottingOptimizer<'a> {
    pub fn new(snapshot: &'a WarehouseSnapshot) -> Self {
        Self {
            snapshot,
            thresholds: SlottingThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: SlottingThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// First location (by aisle, rack, shelf, bin) in any zone of each tier.
    fn best_location_per_tier(&self) -> HashMap<VelocityTier, &'a Location> {
        let snapshot: &'a WarehouseSnapshot = self.snapshot;
        let index = snapshot.index();
        let mut best: HashMap<VelocityTier, &'a Location> = HashMap::new();

        for location in &snapshot.locations {
            let Some(zone) = index.zone(location.zone_id) else {
                continue;
            };
            best.entry(zone.tier)
                .and_modify(|current| {
                    if location.slot_key() < current.slot_key() {
                        *current = location;
                    }
                })
                .or_insert(location);
        }
        best
    }
}

impl AnalyticsJob for SlottingOptimizer<'_> {
    type Output = Vec<SlottingSuggestion>;

    fn kind(&self) -> &'static str {
        "inventory.slotting_suggestions"
    }

    fn run(&self) -> Result<Vec<SlottingSuggestion>, AnalyticsError> {
        let index = self.snapshot.index();
        let candidates = self.best_location_per_tier();
        let aggregates = aggregate_stock(self.snapshot);
        let mut suggestions = Vec::new();

        for agg in &aggregates {
            if index.product(agg.product_id).is_none() {
                debug!(product = %agg.product_id, "skipping stock for unknown product");
                continue;
            }
            let Some(current_zone) = index.zone_of_location(agg.location_id) else {
                debug!(location = %agg.location_id, "skipping stock at unknown location or zone");
                continue;
            };

            let target = optimal_tier(agg.total_quantity, &self.thresholds);
            if current_zone.tier == target {
                continue;
            }

            let Some(destination) = candidates.get(&target) else {
                debug!(product = %agg.product_id, tier = %target, "no location available in optimal zone");
                continue;
            };

            suggestions.push(SlottingSuggestion {
                product_id: agg.product_id,
                current_location: agg.location_id,
                suggested_location: destination.id,
                current_tier: current_zone.tier,
                optimal_tier: target,
                reason: format!("Move from {} to {} zone", current_zone.tier, target),
            });
        }

        info!(
            aggregates = aggregates.len(),
            suggestions = suggestions.len(),
            "slotting suggestions computed"
        );
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{inventory, location, product, zone};

    struct Layout {
        snapshot: WarehouseSnapshot,
        high_first: LocationId,
        low: LocationId,
    }

    fn layout() -> Layout {
        let high = zone("Fast pick", VelocityTier::High);
        let medium = zone("Shelving", VelocityTier::Medium);
        let low = zone("Bulk", VelocityTier::Low);

        let high_b = location(&high, "A", "02", "01", "01");
        let high_a = location(&high, "A", "01", "03", "02");
        let medium_a = location(&medium, "C", "01", "01", "01");
        let low_a = location(&low, "Z", "09", "01", "01");

        Layout {
            high_first: high_a.id,
            low: low_a.id,
            snapshot: WarehouseSnapshot {
                locations: vec![high_b, high_a, medium_a, low_a],
                zones: vec![high, medium, low],
                ..WarehouseSnapshot::default()
            },
        }
    }

    #[test]
    fn fast_mover_in_bulk_zone_moves_to_first_high_volume_location() {
        let mut l = layout();
        let p = product("FAST", 1);
        l.snapshot.products.push(p.clone());
        l.snapshot.inventory.push(inventory(p.id, l.low, 1500));

        let suggestions = SlottingOptimizer::new(&l.snapshot).run().unwrap();
        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.product_id, p.id);
        assert_eq!(s.current_location, l.low);
        assert_eq!(s.suggested_location, l.high_first);
        assert_eq!(s.reason, "Move from Low Volume to High Volume zone");

        // Accept the move: the product now lives in the high-volume zone.
        l.snapshot.inventory[0].location_id = s.suggested_location;
        assert!(SlottingOptimizer::new(&l.snapshot).run().unwrap().is_empty());
    }

    #[test]
    fn quantities_at_the_same_location_are_summed() {
        let mut l = layout();
        let p = product("MID", 1);
        l.snapshot.products.push(p.clone());
        l.snapshot.inventory.push(inventory(p.id, l.low, 60));
        l.snapshot.inventory.push(inventory(p.id, l.low, 60));

        let suggestions = SlottingOptimizer::new(&l.snapshot).run().unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].optimal_tier, VelocityTier::Medium);
    }

    #[test]
    fn no_suggestion_when_optimal_zone_has_no_locations() {
        let low = zone("Bulk", VelocityTier::Low);
        let low_loc = location(&low, "Z", "01", "01", "01");
        let p = product("FAST", 1);

        let snapshot = WarehouseSnapshot {
            products: vec![p.clone()],
            locations: vec![low_loc.clone()],
            zones: vec![low],
            inventory: vec![inventory(p.id, low_loc.id, 5_000)],
            ..WarehouseSnapshot::default()
        };

        assert!(SlottingOptimizer::new(&snapshot).run().unwrap().is_empty());
    }

    #[test]
    fn thresholds_are_strictly_greater_than() {
        let t = SlottingThresholds::default();
        assert_eq!(optimal_tier(1001, &t), VelocityTier::High);
        assert_eq!(optimal_tier(1000, &t), VelocityTier::Medium);
        assert_eq!(optimal_tier(101, &t), VelocityTier::Medium);
        assert_eq!(optimal_tier(100, &t), VelocityTier::Low);
    }

    #[test]
    fn stock_at_unknown_location_is_skipped() {
        let l = layout();
        let p = product("LOST", 1);
        let mut snapshot = l.snapshot;
        snapshot.products.push(p.clone());
        snapshot.inventory.push(inventory(p.id, LocationId::new(), 5_000));
        assert!(SlottingOptimizer::new(&snapshot).run().unwrap().is_empty());
    }

    #[test]
    fn stock_for_unknown_product_is_skipped() {
        let mut l = layout();
        let known = product("KNOWN", 1);
        l.snapshot.products.push(known.clone());
        l.snapshot.inventory.push(inventory(ProductId::new(), l.low, 5_000));
        l.snapshot.inventory.push(inventory(known.id, l.low, 5_000));

        let suggestions = SlottingOptimizer::new(&l.snapshot).run().unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].product_id, known.id);
    }
}
