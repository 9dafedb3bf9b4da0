use std::collections::HashSet;
use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;

use wareflow_core::{LocationId, ProductId};
use wareflow_inventory::{
    AdjustmentRecord, InventoryRecord, Location, MovementRecord, Product, PurchaseOrderLine,
    QuantityStore, QuantityUpdate, SnapshotError, SnapshotReader, SnapshotScope, StoreError,
    WarehouseSnapshot, Zone,
};

/// In-memory warehouse for tests/dev.
///
/// Serves scoped snapshots and applies stocktake corrections under a single
/// write lock: a batch is validated in full before any record changes.
#[derive(Debug, Default)]
pub struct InMemoryWarehouse {
    inner: RwLock<WarehouseSnapshot>,
}

impl InMemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: WarehouseSnapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    pub fn add_product(&self, product: Product) {
        if let Ok(mut s) = self.inner.write() {
            s.products.push(product);
        }
    }

    pub fn add_zone(&self, zone: Zone) {
        if let Ok(mut s) = self.inner.write() {
            s.zones.push(zone);
        }
    }

    pub fn add_location(&self, location: Location) {
        if let Ok(mut s) = self.inner.write() {
            s.locations.push(location);
        }
    }

    pub fn put_inventory(&self, record: InventoryRecord) {
        if let Ok(mut s) = self.inner.write() {
            s.inventory.push(record);
        }
    }

    pub fn record_movement(&self, movement: MovementRecord) {
        if let Ok(mut s) = self.inner.write() {
            s.movements.push(movement);
        }
    }

    pub fn record_adjustment(&self, adjustment: AdjustmentRecord) {
        if let Ok(mut s) = self.inner.write() {
            s.adjustments.push(adjustment);
        }
    }

    pub fn add_purchase_order_line(&self, line: PurchaseOrderLine) {
        if let Ok(mut s) = self.inner.write() {
            s.purchase_order_lines.push(line);
        }
    }

    /// Recorded on-hand quantity of `product_id` at `location_id`.
    pub fn quantity_at(&self, product_id: ProductId, location_id: LocationId) -> Option<u64> {
        let s = self.inner.read().ok()?;
        let mut matches = s
            .inventory
            .iter()
            .filter(|r| r.product_id == product_id && r.location_id == location_id)
            .peekable();
        matches.peek()?;
        Some(matches.map(|r| r.quantity).sum())
    }
}

impl SnapshotReader for InMemoryWarehouse {
    fn snapshot(&self, scope: SnapshotScope) -> Result<WarehouseSnapshot, SnapshotError> {
        let s = self
            .inner
            .read()
            .map_err(|_| SnapshotError::Unavailable("warehouse lock poisoned".to_string()))?;

        match scope {
            SnapshotScope::Product(id) if !s.products.iter().any(|p| p.id == id) => {
                Err(SnapshotError::UnknownScope(format!("product {id}")))
            }
            SnapshotScope::Location(id) if !s.locations.iter().any(|l| l.id == id) => {
                Err(SnapshotError::UnknownScope(format!("location {id}")))
            }
            _ => Ok(s.scoped(scope)),
        }
    }
}

impl QuantityStore for InMemoryWarehouse {
    fn apply_quantities(
        &self,
        location_id: LocationId,
        updates: &[QuantityUpdate],
    ) -> Result<(), StoreError> {
        let mut s = self
            .inner
            .write()
            .map_err(|_| StoreError::Backend("warehouse lock poisoned".to_string()))?;

        if !s.locations.iter().any(|l| l.id == location_id) {
            return Err(StoreError::UnknownLocation(location_id));
        }
        let known: HashSet<ProductId> = s.products.iter().map(|p| p.id).collect();
        if let Some(missing) = updates.iter().find(|u| !known.contains(&u.product_id)) {
            return Err(StoreError::UnknownProduct(missing.product_id));
        }

        // Validation passed; from here on every update is applied.
        let now = Utc::now();
        for update in updates {
            let mut remaining = Some(update.new_quantity);
            for record in s
                .inventory
                .iter_mut()
                .filter(|r| r.product_id == update.product_id && r.location_id == location_id)
            {
                // Duplicate rows for the same slot are zeroed, never deleted.
                record.quantity = remaining.take().unwrap_or(0);
                record.last_updated = now;
            }

            if let Some(quantity) = remaining {
                debug!(product = %update.product_id, location = %location_id, "creating inventory record from stocktake");
                s.inventory.push(InventoryRecord {
                    product_id: update.product_id,
                    location_id,
                    quantity,
                    last_updated: now,
                    expires_at: None,
                });
            }
        }

        Ok(())
    }
}
