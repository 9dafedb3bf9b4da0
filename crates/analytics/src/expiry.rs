use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use wareflow_core::{LocationId, ProductId, ValueObject};
use wareflow_inventory::WarehouseSnapshot;

use crate::job::AnalyticsJob;
use crate::result::AnalyticsError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiringStock {
    pub product_id: ProductId,
    pub location_id: LocationId,
    pub quantity: u64,
    pub expires_at: DateTime<Utc>,
    /// Negative once the stock has expired.
    pub days_until_expiry: i64,
    pub expired: bool,
}

impl ValueObject for ExpiringStock {}

/// Job: stock expiring within `window_days` of `as_of` (expired stock included).
#[derive(Debug, Clone)]
pub struct ExpiryReport<'a> {
    snapshot: &'a WarehouseSnapshot,
    as_of: DateTime<Utc>,
    window_days: i64,
}

impl<'a> ExpiryReport<'a> {
    pub fn new(snapshot: &'a WarehouseSnapshot, as_of: DateTime<Utc>) -> Self {
        Self {
            snapshot,
            as_of,
            window_days: 30,
        }
    }

    pub fn with_window_days(mut self, window_days: i64) -> Self {
        self.window_days = window_days;
        self
    }
}

impl AnalyticsJob for ExpiryReport<'_> {
    type Output = Vec<ExpiringStock>;

    fn kind(&self) -> &'static str {
        "inventory.expiring_stock"
    }

    fn run(&self) -> Result<Vec<ExpiringStock>, AnalyticsError> {
        if self.window_days < 0 {
            return Err(AnalyticsError::InvalidInput(
                "expiry window cannot be negative".to_string(),
            ));
        }

        let index = self.snapshot.index();
        // A window reaching past chrono's calendar range is unbounded.
        let horizon = TimeDelta::try_days(self.window_days)
            .and_then(|window| self.as_of.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut out: Vec<ExpiringStock> = self
            .snapshot
            .inventory
            .iter()
            .filter(|r| r.quantity > 0)
            .filter_map(|r| {
                let expires_at = r.expires_at?;
                if expires_at > horizon {
                    return None;
                }
                if index.product(r.product_id).is_none() {
                    debug!(product = %r.product_id, "skipping expiring stock for unknown product");
                    return None;
                }
                Some(ExpiringStock {
                    product_id: r.product_id,
                    location_id: r.location_id,
                    quantity: r.quantity,
                    expires_at,
                    days_until_expiry: (expires_at - self.as_of).num_days(),
                    expired: expires_at <= self.as_of,
                })
            })
            .collect();

        out.sort_by(|a, b| {
            a.expires_at
                .cmp(&b.expires_at)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });

        info!(window_days = self.window_days, expiring = out.len(), "expiry report computed");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{inventory, location, product, zone};
    use chrono::Duration;
    use wareflow_inventory::VelocityTier;

    #[test]
    fn lists_stock_inside_window_soonest_first() {
        let now = Utc::now();
        let z = zone("Cold", VelocityTier::Medium);
        let loc = location(&z, "K", "01", "01", "01");
        let milk = product("MILK", 120);
        let cheese = product("CHEESE", 900);
        let salt = product("SALT", 50);

        let mut expired = inventory(milk.id, loc.id, 4);
        expired.expires_at = Some(now - Duration::days(2));
        let mut soon = inventory(cheese.id, loc.id, 10);
        soon.expires_at = Some(now + Duration::days(5));
        let mut later = inventory(salt.id, loc.id, 10);
        later.expires_at = Some(now + Duration::days(400));
        let mut emptied = inventory(cheese.id, loc.id, 0);
        emptied.expires_at = Some(now + Duration::days(1));

        let snapshot = WarehouseSnapshot {
            products: vec![milk.clone(), cheese.clone(), salt],
            locations: vec![loc],
            zones: vec![z],
            inventory: vec![soon, later, expired, emptied, inventory(milk.id, LocationId::new(), 3)],
            ..WarehouseSnapshot::default()
        };

        let report = ExpiryReport::new(&snapshot, now).run().unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].product_id, milk.id);
        assert!(report[0].expired);
        assert_eq!(report[0].days_until_expiry, -2);
        assert_eq!(report[1].product_id, cheese.id);
        assert!(!report[1].expired);
    }

    #[test]
    fn window_beyond_calendar_range_lists_everything_dated() {
        let now = Utc::now();
        let z = zone("Dry", VelocityTier::Low);
        let loc = location(&z, "D", "01", "01", "01");
        let flour = product("FLOUR", 80);

        let mut far = inventory(flour.id, loc.id, 12);
        far.expires_at = Some(now + Duration::days(365 * 50));
        let undated = inventory(flour.id, loc.id, 7);

        let snapshot = WarehouseSnapshot {
            products: vec![flour.clone()],
            locations: vec![loc],
            zones: vec![z],
            inventory: vec![far, undated],
            ..WarehouseSnapshot::default()
        };

        for window_days in [200_000_000_000_000, i64::MAX] {
            let report = ExpiryReport::new(&snapshot, now)
                .with_window_days(window_days)
                .run()
                .unwrap();
            assert_eq!(report.len(), 1);
            assert_eq!(report[0].quantity, 12);
            assert!(!report[0].expired);
        }
    }
}
