use core::str::FromStr;

use serde::{Deserialize, Serialize};

use wareflow_core::{CategoryId, DomainError, Entity, LocationId, ProductId, ZoneId};

/// Catalog product (reference data for the engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    /// Unit price in smallest currency unit (e.g., cents).
    pub unit_price: i64,
    pub category_id: Option<CategoryId>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Expected throughput class of a zone.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityTier {
    High,
    Medium,
    Low,
}

impl VelocityTier {
    /// Human-readable zone classification, as shown to warehouse staff.
    pub fn label(self) -> &'static str {
        match self {
            VelocityTier::High => "High Volume",
            VelocityTier::Medium => "Medium Volume",
            VelocityTier::Low => "Low Volume",
        }
    }
}

impl core::fmt::Display for VelocityTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VelocityTier {
    type Err = DomainError;

    /// Accepts both display labels ("High Volume") and slug forms ("high-volume", "high").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '-' || c == '_' { ' ' } else { c })
            .collect();
        match normalized.trim_end_matches(" volume") {
            "high" => Ok(VelocityTier::High),
            "medium" => Ok(VelocityTier::Medium),
            "low" => Ok(VelocityTier::Low),
            _ => Err(DomainError::validation(format!("unknown velocity tier: {s}"))),
        }
    }
}

/// Warehouse zone: a named group of locations sharing a velocity tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub tier: VelocityTier,
}

impl Entity for Zone {
    type Id = ZoneId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Physical storage location addressed by aisle / rack / shelf / bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub zone_id: ZoneId,
    pub capacity: u64,
    pub aisle: String,
    pub rack: String,
    pub shelf: String,
    pub bin: String,
}

impl Location {
    /// Deterministic ordering key used when picking among candidate locations.
    pub fn slot_key(&self) -> (&str, &str, &str, &str) {
        (&self.aisle, &self.rack, &self.shelf, &self.bin)
    }

    /// Printable address, e.g. `A-01-02-03`.
    pub fn code(&self) -> String {
        format!("{}-{}-{}-{}", self.aisle, self.rack, self.shelf, self.bin)
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_tier_parses_labels_and_slugs() {
        assert_eq!("High Volume".parse::<VelocityTier>().unwrap(), VelocityTier::High);
        assert_eq!("high-volume".parse::<VelocityTier>().unwrap(), VelocityTier::High);
        assert_eq!("medium".parse::<VelocityTier>().unwrap(), VelocityTier::Medium);
        assert_eq!("low_volume".parse::<VelocityTier>().unwrap(), VelocityTier::Low);
        assert!("fast".parse::<VelocityTier>().is_err());
    }

    #[test]
    fn slot_key_orders_by_aisle_then_rack_then_shelf_then_bin() {
        let zone_id = ZoneId::new();
        let loc = |aisle: &str, rack: &str, shelf: &str, bin: &str| Location {
            id: LocationId::new(),
            zone_id,
            capacity: 100,
            aisle: aisle.to_string(),
            rack: rack.to_string(),
            shelf: shelf.to_string(),
            bin: bin.to_string(),
        };

        let mut locations = vec![
            loc("B", "01", "01", "01"),
            loc("A", "02", "01", "01"),
            loc("A", "01", "02", "01"),
            loc("A", "01", "01", "02"),
        ];
        locations.sort_by(|a, b| a.slot_key().cmp(&b.slot_key()));

        let codes: Vec<String> = locations.iter().map(Location::code).collect();
        assert_eq!(codes, vec!["A-01-01-02", "A-01-02-01", "A-02-01-01", "B-01-01-01"]);
    }
}
