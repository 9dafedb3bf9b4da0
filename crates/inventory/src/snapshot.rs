//! Read-only warehouse snapshots and the accessor seam that produces them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use wareflow_core::{LocationId, ProductId, ZoneId};

use crate::catalog::{Location, Product, Zone};
use crate::record::{AdjustmentRecord, InventoryRecord, MovementRecord, PurchaseOrderLine};

/// Which slice of the warehouse a snapshot covers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SnapshotScope {
    Product(ProductId),
    Location(LocationId),
    Warehouse,
}

/// Point-in-time copy of everything the engine reads.
///
/// Catalog data (products, locations, zones) is always complete; the event and
/// stock vectors are narrowed to the requested scope. Movements are ordered by
/// `occurred_at` ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseSnapshot {
    pub products: Vec<Product>,
    pub locations: Vec<Location>,
    pub zones: Vec<Zone>,
    pub inventory: Vec<InventoryRecord>,
    pub movements: Vec<MovementRecord>,
    pub adjustments: Vec<AdjustmentRecord>,
    pub purchase_order_lines: Vec<PurchaseOrderLine>,
}

impl WarehouseSnapshot {
    /// Build lookup maps over the catalog portion of the snapshot.
    pub fn index(&self) -> CatalogIndex<'_> {
        CatalogIndex {
            products: self.products.iter().map(|p| (p.id, p)).collect(),
            locations: self.locations.iter().map(|l| (l.id, l)).collect(),
            zones: self.zones.iter().map(|z| (z.id, z)).collect(),
        }
    }

    /// Narrow stock and event records to `scope`, keeping the full catalog.
    pub fn scoped(&self, scope: SnapshotScope) -> WarehouseSnapshot {
        let mut out = WarehouseSnapshot {
            products: self.products.clone(),
            locations: self.locations.clone(),
            zones: self.zones.clone(),
            ..WarehouseSnapshot::default()
        };

        match scope {
            SnapshotScope::Warehouse => {
                out.inventory = self.inventory.clone();
                out.movements = self.movements.clone();
                out.adjustments = self.adjustments.clone();
                out.purchase_order_lines = self.purchase_order_lines.clone();
            }
            SnapshotScope::Product(product_id) => {
                out.inventory = filter(&self.inventory, |r| r.product_id == product_id);
                out.movements = filter(&self.movements, |m| m.product_id == product_id);
                out.adjustments = filter(&self.adjustments, |a| a.product_id == product_id);
                out.purchase_order_lines =
                    filter(&self.purchase_order_lines, |l| l.product_id == product_id);
            }
            SnapshotScope::Location(location_id) => {
                out.inventory = filter(&self.inventory, |r| r.location_id == location_id);
                out.movements = filter(&self.movements, |m| {
                    m.from_location == Some(location_id) || m.to_location == Some(location_id)
                });
                out.adjustments = filter(&self.adjustments, |a| a.location_id == location_id);
                out.purchase_order_lines = self.purchase_order_lines.clone();
            }
        }

        out.movements.sort_by_key(|m| m.occurred_at);
        out
    }
}

fn filter<T: Clone>(items: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
    items.iter().filter(|item| keep(item)).cloned().collect()
}

/// Borrowed lookup tables over a snapshot's catalog.
#[derive(Debug)]
pub struct CatalogIndex<'a> {
    products: HashMap<ProductId, &'a Product>,
    locations: HashMap<LocationId, &'a Location>,
    zones: HashMap<ZoneId, &'a Zone>,
}

impl<'a> CatalogIndex<'a> {
    pub fn product(&self, id: ProductId) -> Option<&'a Product> {
        self.products.get(&id).copied()
    }

    pub fn location(&self, id: LocationId) -> Option<&'a Location> {
        self.locations.get(&id).copied()
    }

    pub fn zone(&self, id: ZoneId) -> Option<&'a Zone> {
        self.zones.get(&id).copied()
    }

    /// Zone a location belongs to, if both the location and its zone are known.
    pub fn zone_of_location(&self, id: LocationId) -> Option<&'a Zone> {
        self.location(id).and_then(|l| self.zone(l.zone_id))
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot source unavailable: {0}")]
    Unavailable(String),

    #[error("unknown scope: {0}")]
    UnknownScope(String),
}

/// Data snapshot accessor implemented by the host's storage layer.
pub trait SnapshotReader: Send + Sync {
    fn snapshot(&self, scope: SnapshotScope) -> Result<WarehouseSnapshot, SnapshotError>;
}

impl<R> SnapshotReader for std::sync::Arc<R>
where
    R: SnapshotReader + ?Sized,
{
    fn snapshot(&self, scope: SnapshotScope) -> Result<WarehouseSnapshot, SnapshotError> {
        (**self).snapshot(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ReasonCode;
    use chrono::{Duration, Utc};

    fn movement(product_id: ProductId, from: LocationId, days_ago: i64) -> MovementRecord {
        MovementRecord {
            product_id,
            from_location: Some(from),
            to_location: None,
            quantity: -1,
            reason: ReasonCode::Sale,
            occurred_at: Utc::now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn product_scope_keeps_catalog_and_orders_movements() {
        let a = ProductId::new();
        let b = ProductId::new();
        let loc = LocationId::new();

        let snapshot = WarehouseSnapshot {
            movements: vec![movement(a, loc, 1), movement(b, loc, 2), movement(a, loc, 5)],
            ..WarehouseSnapshot::default()
        };

        let scoped = snapshot.scoped(SnapshotScope::Product(a));
        assert_eq!(scoped.movements.len(), 2);
        assert!(scoped.movements.iter().all(|m| m.product_id == a));
        assert!(scoped.movements[0].occurred_at < scoped.movements[1].occurred_at);
    }

    #[test]
    fn location_scope_matches_either_end_of_a_movement() {
        let product = ProductId::new();
        let here = LocationId::new();
        let elsewhere = LocationId::new();

        let mut inbound = movement(product, elsewhere, 1);
        inbound.to_location = Some(here);

        let snapshot = WarehouseSnapshot {
            movements: vec![movement(product, here, 3), inbound, movement(product, elsewhere, 2)],
            ..WarehouseSnapshot::default()
        };

        let scoped = snapshot.scoped(SnapshotScope::Location(here));
        assert_eq!(scoped.movements.len(), 2);
    }
}
