//! ABC (Pareto) classification of on-hand stock value.

use serde::{Deserialize, Serialize};
use tracing::info;

use wareflow_core::{ProductId, ValueObject};
use wareflow_inventory::WarehouseSnapshot;

use crate::config::AbcThresholds;
use crate::job::AnalyticsJob;
use crate::result::AnalyticsError;
use crate::valuation::value_products;

/// Tolerance applied to cumulative percentages so that a product landing
/// exactly on a cutoff is not pushed into the next tier by rounding noise.
const CUTOFF_EPSILON: f64 = 1e-9;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbcTier {
    A,
    B,
    C,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcMember {
    pub product_id: ProductId,
    pub value: f64,
    /// Running share of total value up to and including this product.
    pub cumulative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcCategory {
    pub tier: AbcTier,
    pub members: Vec<AbcMember>,
    pub value_share_pct: f64,
    pub item_share_pct: f64,
}

/// Tiered breakdown. Empty when there is no stock value to rank.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AbcAnalysisResult {
    pub total_value: f64,
    /// Always A, B, C in that order when non-empty.
    pub categories: Vec<AbcCategory>,
}

impl AbcAnalysisResult {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn category(&self, tier: AbcTier) -> Option<&AbcCategory> {
        self.categories.iter().find(|c| c.tier == tier)
    }

    pub fn tier_of(&self, product_id: ProductId) -> Option<AbcTier> {
        self.categories
            .iter()
            .find(|c| c.members.iter().any(|m| m.product_id == product_id))
            .map(|c| c.tier)
    }
}

impl ValueObject for AbcAnalysisResult {}

/// Rank `(product, value)` pairs and partition them into tiers.
///
/// Negative values are treated as zero. Ties keep their input order.
pub fn classify(values: &[(ProductId, f64)], thresholds: &AbcThresholds) -> AbcAnalysisResult {
    let mut ranked: Vec<(ProductId, f64)> = values
        .iter()
        .map(|(id, v)| (*id, if v.is_finite() { v.max(0.0) } else { 0.0 }))
        .collect();

    let total: f64 = ranked.iter().map(|(_, v)| v).sum();
    if total <= 0.0 {
        return AbcAnalysisResult::default();
    }

    // `sort_by` is stable, so equal values keep their original relative order.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut tiers: [Vec<AbcMember>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut cumulative = 0.0;
    for (product_id, value) in ranked {
        cumulative += value;
        let cumulative_pct = cumulative / total * 100.0;
        let slot = if cumulative_pct <= thresholds.a_cutoff_pct + CUTOFF_EPSILON {
            0
        } else if cumulative_pct <= thresholds.b_cutoff_pct + CUTOFF_EPSILON {
            1
        } else {
            2
        };
        tiers[slot].push(AbcMember {
            product_id,
            value,
            cumulative_pct,
        });
    }

    let item_count = values.len() as f64;
    let categories = [AbcTier::A, AbcTier::B, AbcTier::C]
        .into_iter()
        .zip(tiers)
        .map(|(tier, members)| {
            let tier_value: f64 = members.iter().map(|m| m.value).sum();
            AbcCategory {
                tier,
                value_share_pct: tier_value / total * 100.0,
                item_share_pct: members.len() as f64 / item_count * 100.0,
                members,
            }
        })
        .collect();

    AbcAnalysisResult {
        total_value: total,
        categories,
    }
}

/// Job: ABC classification of a warehouse snapshot's stock value.
#[derive(Debug, Clone)]
pub struct AbcClassifier<'a> {
    snapshot: &'a WarehouseSnapshot,
    thresholds: AbcThresholds,
}

impl<'a> AbcClassifier<'a> {
    pub fn new(snapshot: &'a WarehouseSnapshot) -> Self {
        Self {
            snapshot,
            thresholds: AbcThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: AbcThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

impl AnalyticsJob for AbcClassifier<'_> {
    type Output = AbcAnalysisResult;

    fn kind(&self) -> &'static str {
        "inventory.abc_analysis"
    }

    fn run(&self) -> Result<AbcAnalysisResult, AnalyticsError> {
        let values: Vec<(ProductId, f64)> = value_products(self.snapshot)
            .into_iter()
            .map(|v| (v.product_id, v.value as f64))
            .collect();

        let result = classify(&values, &self.thresholds);
        info!(
            products = values.len(),
            total_value = result.total_value,
            a = result.category(AbcTier::A).map_or(0, |c| c.members.len()),
            b = result.category(AbcTier::B).map_or(0, |c| c.members.len()),
            c = result.category(AbcTier::C).map_or(0, |c| c.members.len()),
            "abc classification computed"
        );
        Ok(result)
    }
}
