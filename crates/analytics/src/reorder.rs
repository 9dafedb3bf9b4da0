//! Reorder-point advice from outgoing movement velocity.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use wareflow_core::{ProductId, ValueObject};
use wareflow_inventory::WarehouseSnapshot;

use crate::config::ReorderPolicy;
use crate::job::AnalyticsJob;
use crate::result::AnalyticsError;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Demand signal for one product.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DemandHistory {
    pub on_hand: u64,
    /// Outgoing movements as (timestamp, units shipped), units positive.
    pub outgoing: Vec<(DateTime<Utc>, u64)>,
    /// Observed lead times in days.
    pub lead_times: Vec<i64>,
}

/// Computed reorder point for a product (whether or not action is needed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderPoint {
    pub average_daily_demand: f64,
    pub lead_time_days: f64,
    pub safety_stock: f64,
    pub reorder_point: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderSuggestion {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub current_stock: u64,
    pub reorder_point: u64,
    pub suggested_reorder: u64,
    pub average_daily_demand: f64,
    pub lead_time_days: f64,
}

impl ValueObject for ReorderSuggestion {}

/// Reorder point from a demand history, or `None` when the signal is too thin.
///
/// Velocity is measured over the span between the first and last outgoing
/// movement, not up to "now".
pub fn reorder_point(history: &DemandHistory, policy: &ReorderPolicy) -> Option<ReorderPoint> {
    if history.outgoing.len() < policy.min_movements.max(2) {
        return None;
    }

    let first = history.outgoing.iter().map(|(at, _)| *at).min()?;
    let last = history.outgoing.iter().map(|(at, _)| *at).max()?;
    let span_days = (last - first).num_seconds() as f64 / SECONDS_PER_DAY;
    if span_days <= 0.0 {
        return None;
    }

    let total = history
        .outgoing
        .iter()
        .fold(0u64, |acc, (_, qty)| acc.saturating_add(*qty));
    let average_daily_demand = total as f64 / span_days;

    let lead_time_days = if history.lead_times.is_empty() {
        policy.default_lead_time_days
    } else {
        history.lead_times.iter().sum::<i64>() as f64 / history.lead_times.len() as f64
    };

    let safety_stock = average_daily_demand * policy.safety_days;
    Some(ReorderPoint {
        average_daily_demand,
        lead_time_days,
        safety_stock,
        reorder_point: average_daily_demand * lead_time_days + safety_stock,
    })
}

/// Job: reorder suggestions for every catalog product in a snapshot.
#[derive(Debug, Clone)]
pub struct ReorderAdvisor<'a> {
    snapshot: &'a WarehouseSnapshot,
    policy: ReorderPolicy,
}

impl<'a> ReorderAdvisor<'a> {
    pub fn new(snapshot: &'a WarehouseSnapshot) -> Self {
        Self {
            snapshot,
            policy: ReorderPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReorderPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn histories(&self) -> HashMap<ProductId, DemandHistory> {
        let index = self.snapshot.index();
        let mut out: HashMap<ProductId, DemandHistory> = HashMap::new();

        for record in &self.snapshot.inventory {
            let h = out.entry(record.product_id).or_default();
            h.on_hand = h.on_hand.saturating_add(record.quantity);
        }

        for movement in self.snapshot.movements.iter().filter(|m| m.is_outgoing()) {
            if index.product(movement.product_id).is_none() {
                debug!(product = %movement.product_id, "skipping movement for unknown product");
                continue;
            }
            out.entry(movement.product_id)
                .or_default()
                .outgoing
                .push((movement.occurred_at, movement.quantity.unsigned_abs()));
        }

        for line in &self.snapshot.purchase_order_lines {
            match line.lead_time_days() {
                Some(days) => out.entry(line.product_id).or_default().lead_times.push(days),
                None => debug!(product = %line.product_id, "purchase order line has no usable lead time"),
            }
        }

        out
    }
}

impl AnalyticsJob for ReorderAdvisor<'_> {
    type Output = Vec<ReorderSuggestion>;

    fn kind(&self) -> &'static str {
        "inventory.reorder_suggestions"
    }

    fn run(&self) -> Result<Vec<ReorderSuggestion>, AnalyticsError> {
        let histories = self.histories();
        let mut suggestions = Vec::new();

        for product in &self.snapshot.products {
            let Some(history) = histories.get(&product.id) else {
                continue;
            };
            let Some(point) = reorder_point(history, &self.policy) else {
                continue;
            };

            let current = history.on_hand as f64;
            if current > point.reorder_point {
                continue;
            }

            suggestions.push(ReorderSuggestion {
                product_id: product.id,
                sku: product.sku.clone(),
                name: product.name.clone(),
                current_stock: history.on_hand,
                reorder_point: point.reorder_point.round() as u64,
                suggested_reorder: (point.reorder_point - current).round().max(0.0) as u64,
                average_daily_demand: point.average_daily_demand,
                lead_time_days: point.lead_time_days,
            });
        }

        info!(
            products = self.snapshot.products.len(),
            suggestions = suggestions.len(),
            "reorder suggestions computed"
        );
        Ok(suggestions)
    }
}
