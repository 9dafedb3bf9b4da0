//! Fixture builders shared by the unit tests.

use chrono::{DateTime, Utc};

use wareflow_core::{LocationId, ProductId, ZoneId};
use wareflow_inventory::{
    InventoryRecord, Location, MovementRecord, Product, ReasonCode, VelocityTier, Zone,
};

pub fn zone(name: &str, tier: VelocityTier) -> Zone {
    Zone {
        id: ZoneId::new(),
        name: name.to_string(),
        tier,
    }
}

pub fn location(zone: &Zone, aisle: &str, rack: &str, shelf: &str, bin: &str) -> Location {
    Location {
        id: LocationId::new(),
        zone_id: zone.id,
        capacity: 10_000,
        aisle: aisle.to_string(),
        rack: rack.to_string(),
        shelf: shelf.to_string(),
        bin: bin.to_string(),
    }
}

pub fn product(sku: &str, unit_price: i64) -> Product {
    Product {
        id: ProductId::new(),
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        unit_price,
        category_id: None,
    }
}

pub fn inventory(product_id: ProductId, location_id: LocationId, quantity: u64) -> InventoryRecord {
    InventoryRecord {
        product_id,
        location_id,
        quantity,
        last_updated: Utc::now(),
        expires_at: None,
    }
}

pub fn outgoing(
    product_id: ProductId,
    location_id: LocationId,
    quantity: i64,
    occurred_at: DateTime<Utc>,
) -> MovementRecord {
    MovementRecord {
        product_id,
        from_location: Some(location_id),
        to_location: None,
        quantity: -quantity.abs(),
        reason: ReasonCode::Sale,
        occurred_at,
    }
}
