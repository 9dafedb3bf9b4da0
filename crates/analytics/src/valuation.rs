//! On-hand stock valuation (quantity × unit price per product).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use wareflow_core::{ProductId, ValueObject};
use wareflow_inventory::WarehouseSnapshot;

use crate::job::AnalyticsJob;
use crate::result::AnalyticsError;

/// Value of one product's stock across all locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductValuation {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub on_hand: u64,
    /// Unit price in smallest currency unit.
    pub unit_price: i64,
    /// `on_hand × unit_price`, saturating.
    pub value: i64,
}

impl ValueObject for ProductValuation {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub total_value: i64,
    pub total_quantity: u64,
    pub valued_products: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationReport {
    pub products: Vec<ProductValuation>,
    pub summary: ValuationSummary,
}

/// Value every catalog product, in catalog order.
///
/// Inventory referencing a product outside the catalog is skipped.
pub fn value_products(snapshot: &WarehouseSnapshot) -> Vec<ProductValuation> {
    let index = snapshot.index();

    let mut on_hand: HashMap<ProductId, u64> = HashMap::new();
    for record in &snapshot.inventory {
        if index.product(record.product_id).is_none() {
            debug!(product = %record.product_id, location = %record.location_id, "skipping inventory for unknown product");
            continue;
        }
        let slot = on_hand.entry(record.product_id).or_insert(0);
        *slot = slot.saturating_add(record.quantity);
    }

    snapshot
        .products
        .iter()
        .map(|p| {
            let qty = on_hand.get(&p.id).copied().unwrap_or(0);
            let qty_i64 = i64::try_from(qty).unwrap_or(i64::MAX);
            ProductValuation {
                product_id: p.id,
                sku: p.sku.clone(),
                name: p.name.clone(),
                on_hand: qty,
                unit_price: p.unit_price,
                value: qty_i64.saturating_mul(p.unit_price),
            }
        })
        .collect()
}

pub fn summarize(products: &[ProductValuation]) -> ValuationSummary {
    ValuationSummary {
        total_value: products.iter().fold(0i64, |acc, p| acc.saturating_add(p.value)),
        total_quantity: products.iter().fold(0u64, |acc, p| acc.saturating_add(p.on_hand)),
        valued_products: products.iter().filter(|p| p.on_hand > 0).count(),
    }
}

/// Job: stock valuation for a snapshot.
#[derive(Debug, Clone)]
pub struct StockValuation<'a> {
    snapshot: &'a WarehouseSnapshot,
}

impl<'a> StockValuation<'a> {
    pub fn new(snapshot: &'a WarehouseSnapshot) -> Self {
        Self { snapshot }
    }
}

impl AnalyticsJob for StockValuation<'_> {
    type Output = ValuationReport;

    fn kind(&self) -> &'static str {
        "inventory.valuation"
    }

    fn run(&self) -> Result<ValuationReport, AnalyticsError> {
        let products = value_products(self.snapshot);
        let summary = summarize(&products);
        Ok(ValuationReport { products, summary })
    }
}
