//! Warehouse data model consumed by the analytics engine.
//!
//! Records here are read-only snapshots handed in by the host's storage layer.
//! The crate also defines the two seams the host implements: `SnapshotReader`
//! for scoped reads and `QuantityStore` for the transactional stocktake write.

pub mod catalog;
pub mod record;
pub mod snapshot;
pub mod store;

pub use catalog::{Location, Product, VelocityTier, Zone};
pub use record::{
    AdjustmentRecord, InventoryRecord, MovementRecord, PurchaseOrderLine, ReasonCode,
    StocktakeCount,
};
pub use snapshot::{CatalogIndex, SnapshotError, SnapshotReader, SnapshotScope, WarehouseSnapshot};
pub use store::{QuantityStore, QuantityUpdate, StoreError};
