//! Engine tuning knobs.
//!
//! Defaults reproduce the standard warehouse policy (80/95 ABC cutoffs, three
//! days of safety stock, seven-day fallback lead time, 1000/100 unit slotting
//! thresholds). Hosts can override any value through `WAREFLOW_*` environment
//! variables.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use wareflow_core::{DomainError, DomainResult};

/// Longest accepted expiry window (100 years).
pub const MAX_EXPIRY_WINDOW_DAYS: i64 = 36_500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbcThresholds {
    /// Cumulative value share (percent) up to which products are tier A.
    pub a_cutoff_pct: f64,
    /// Cumulative value share (percent) up to which products are tier B.
    pub b_cutoff_pct: f64,
}

impl Default for AbcThresholds {
    fn default() -> Self {
        Self {
            a_cutoff_pct: 80.0,
            b_cutoff_pct: 95.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderPolicy {
    /// Days of average demand held as safety stock.
    pub safety_days: f64,
    /// Lead time used when no purchase-order samples exist.
    pub default_lead_time_days: f64,
    /// Minimum number of outgoing movements before a velocity is trusted.
    pub min_movements: usize,
}

impl Default for ReorderPolicy {
    fn default() -> Self {
        Self {
            safety_days: 3.0,
            default_lead_time_days: 7.0,
            min_movements: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastWindow {
    /// Past days fitted (the series holds `history_days + 1` points).
    pub history_days: u32,
    /// Future days projected.
    pub horizon_days: u32,
}

impl Default for ForecastWindow {
    fn default() -> Self {
        Self {
            history_days: 30,
            horizon_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlottingThresholds {
    /// Quantities strictly above this belong in a high-volume zone.
    pub high_volume_threshold: u64,
    /// Quantities strictly above this (and not high) belong in a medium-volume zone.
    pub medium_volume_threshold: u64,
}

impl Default for SlottingThresholds {
    fn default() -> Self {
        Self {
            high_volume_threshold: 1000,
            medium_volume_threshold: 100,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub abc: AbcThresholds,
    pub reorder: ReorderPolicy,
    pub forecast: ForecastWindow,
    pub slotting: SlottingThresholds,
    pub expiry_window_days: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            abc: AbcThresholds::default(),
            reorder: ReorderPolicy::default(),
            forecast: ForecastWindow::default(),
            slotting: SlottingThresholds::default(),
            expiry_window_days: 30,
        }
    }
}

impl AnalyticsConfig {
    /// Defaults overlaid with any `WAREFLOW_*` environment variables, validated.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup` (tests inject a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        let mut cfg = Self::default();

        overlay(&lookup, "WAREFLOW_ABC_A_CUTOFF_PCT", &mut cfg.abc.a_cutoff_pct)?;
        overlay(&lookup, "WAREFLOW_ABC_B_CUTOFF_PCT", &mut cfg.abc.b_cutoff_pct)?;
        overlay(&lookup, "WAREFLOW_REORDER_SAFETY_DAYS", &mut cfg.reorder.safety_days)?;
        overlay(
            &lookup,
            "WAREFLOW_REORDER_DEFAULT_LEAD_TIME_DAYS",
            &mut cfg.reorder.default_lead_time_days,
        )?;
        overlay(&lookup, "WAREFLOW_REORDER_MIN_MOVEMENTS", &mut cfg.reorder.min_movements)?;
        overlay(&lookup, "WAREFLOW_FORECAST_HISTORY_DAYS", &mut cfg.forecast.history_days)?;
        overlay(&lookup, "WAREFLOW_FORECAST_HORIZON_DAYS", &mut cfg.forecast.horizon_days)?;
        overlay(
            &lookup,
            "WAREFLOW_SLOTTING_HIGH_VOLUME_THRESHOLD",
            &mut cfg.slotting.high_volume_threshold,
        )?;
        overlay(
            &lookup,
            "WAREFLOW_SLOTTING_MEDIUM_VOLUME_THRESHOLD",
            &mut cfg.slotting.medium_volume_threshold,
        )?;
        overlay(&lookup, "WAREFLOW_EXPIRY_WINDOW_DAYS", &mut cfg.expiry_window_days)?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> DomainResult<()> {
        let (a, b) = (self.abc.a_cutoff_pct, self.abc.b_cutoff_pct);
        if !(a > 0.0 && a <= 100.0 && b > 0.0 && b <= 100.0) {
            return Err(DomainError::validation("abc cutoffs must be within (0, 100]"));
        }
        if a > b {
            return Err(DomainError::validation("abc A cutoff cannot exceed B cutoff"));
        }

        if !(self.reorder.safety_days.is_finite() && self.reorder.safety_days >= 0.0) {
            return Err(DomainError::validation("safety_days must be a finite non-negative number"));
        }
        if !(self.reorder.default_lead_time_days.is_finite()
            && self.reorder.default_lead_time_days >= 0.0)
        {
            return Err(DomainError::validation(
                "default_lead_time_days must be a finite non-negative number",
            ));
        }
        if self.reorder.min_movements < 2 {
            return Err(DomainError::validation(
                "min_movements must be >= 2 to measure a time span",
            ));
        }

        if self.forecast.history_days == 0 {
            return Err(DomainError::validation("forecast history_days must be >= 1"));
        }

        if self.slotting.medium_volume_threshold >= self.slotting.high_volume_threshold {
            return Err(DomainError::validation(
                "medium_volume_threshold must be below high_volume_threshold",
            ));
        }

        if !(0..=MAX_EXPIRY_WINDOW_DAYS).contains(&self.expiry_window_days) {
            return Err(DomainError::validation(format!(
                "expiry_window_days must be within 0..={MAX_EXPIRY_WINDOW_DAYS}"
            )));
        }

        Ok(())
    }
}

fn overlay<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut T,
) -> DomainResult<()>
where
    T::Err: core::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|e| DomainError::validation(format!("{key}={raw:?}: {e}")))?;
    }
    Ok(())
}
