//! Linear-trend demand forecasting over a daily quantity series.
//!
//! Model:
//! - Bucket observations into one point per day over the past window,
//!   filling missing days with zero.
//! - Fit ordinary least squares against the day index.
//! - Evaluate the line at future indices, clamp at zero, round to whole units.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use wareflow_core::{ProductId, ValueObject};
use wareflow_inventory::{MovementRecord, WarehouseSnapshot};

use crate::config::ForecastWindow;
use crate::job::AnalyticsJob;
use crate::result::AnalyticsError;

/// Raw observed quantity on a given day (multiple observations per day are summed).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandObservation {
    pub date: NaiveDate,
    pub quantity: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub quantity: f64,
}

impl ValueObject for ForecastPoint {}

/// Fitted `quantity = intercept + slope × day_index`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn at(&self, index: f64) -> f64 {
        self.intercept + self.slope * index
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Forecast {
    pub product_id: Option<ProductId>,
    pub history: Vec<ForecastPoint>,
    pub predicted: Vec<ForecastPoint>,
    pub trend: Option<TrendLine>,
}

impl Forecast {
    pub fn is_empty(&self) -> bool {
        self.predicted.is_empty() && self.history.is_empty()
    }
}

/// Ordinary least squares fit of `ys` against `0..ys.len()`.
///
/// Returns `None` for fewer than two points.
pub fn fit_linear_trend(ys: &[f64]) -> Option<TrendLine> {
    if ys.len() < 2 {
        return None;
    }

    let n = ys.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    Some(TrendLine {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// First day of the window ending at `anchor`, or `None` if it underflows the calendar.
fn window_start(anchor: NaiveDate, window: &ForecastWindow) -> Option<NaiveDate> {
    anchor.checked_sub_days(Days::new(u64::from(window.history_days)))
}

/// Sum observations per day inside `[start, anchor]`.
fn bucket_by_day(
    observations: &[DemandObservation],
    start: NaiveDate,
    anchor: NaiveDate,
) -> BTreeMap<NaiveDate, f64> {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for obs in observations {
        if obs.date < start || obs.date > anchor {
            continue;
        }
        *buckets.entry(obs.date).or_insert(0.0) += obs.quantity;
    }
    buckets
}

/// Contiguous `history_days + 1` points from `start`, missing days as zero.
fn contiguous_series(
    buckets: &BTreeMap<NaiveDate, f64>,
    start: NaiveDate,
    window: &ForecastWindow,
) -> Vec<ForecastPoint> {
    start
        .iter_days()
        .take(window.history_days as usize + 1)
        .map(|date| ForecastPoint {
            date,
            quantity: buckets.get(&date).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Outgoing demand bucketed into one point per day of the window ending at `anchor`.
///
/// Always `history_days + 1` points long (empty only if the window start
/// underflows the calendar).
pub fn daily_demand_series(
    movements: &[MovementRecord],
    product: Option<ProductId>,
    anchor: NaiveDate,
    window: &ForecastWindow,
) -> Vec<ForecastPoint> {
    let Some(start) = window_start(anchor, window) else {
        return Vec::new();
    };
    let observations = demand_observations(movements, product);
    contiguous_series(&bucket_by_day(&observations, start, anchor), start, window)
}

/// Fit the window ending at `anchor` and project `window.horizon_days` ahead.
///
/// Observations outside `[anchor - history_days, anchor]` are ignored. When
/// fewer than two distinct days carry observations the forecast is empty.
pub fn forecast(
    observations: &[DemandObservation],
    anchor: NaiveDate,
    window: &ForecastWindow,
) -> Forecast {
    let Some(start) = window_start(anchor, window) else {
        return Forecast::default();
    };

    let buckets = bucket_by_day(observations, start, anchor);
    if buckets.len() < 2 {
        return Forecast::default();
    }

    let history = contiguous_series(&buckets, start, window);
    let ys: Vec<f64> = history.iter().map(|p| p.quantity).collect();
    let Some(trend) = fit_linear_trend(&ys) else {
        return Forecast::default();
    };

    let last_index = window.history_days as f64;
    let predicted = anchor
        .iter_days()
        .skip(1)
        .take(window.horizon_days as usize)
        .enumerate()
        .map(|(k, date)| ForecastPoint {
            date,
            quantity: trend.at(last_index + (k + 1) as f64).max(0.0).round(),
        })
        .collect();

    Forecast {
        product_id: None,
        history,
        predicted,
        trend: Some(trend),
    }
}

/// Outgoing units per movement, as dated observations.
///
/// `product` narrows to one product; `None` keeps every outgoing movement.
pub fn demand_observations(
    movements: &[MovementRecord],
    product: Option<ProductId>,
) -> Vec<DemandObservation> {
    movements
        .iter()
        .filter(|m| m.is_outgoing())
        .filter(|m| product.is_none_or(|id| m.product_id == id))
        .map(|m| DemandObservation {
            date: m.occurred_at.date_naive(),
            quantity: m.quantity.unsigned_abs() as f64,
        })
        .collect()
}

/// Job: demand forecast from a snapshot's movement history.
#[derive(Debug, Clone)]
pub struct DemandForecaster<'a> {
    snapshot: &'a WarehouseSnapshot,
    product: Option<ProductId>,
    anchor: NaiveDate,
    window: ForecastWindow,
}

impl<'a> DemandForecaster<'a> {
    pub fn new(snapshot: &'a WarehouseSnapshot, anchor: NaiveDate) -> Self {
        Self {
            snapshot,
            product: None,
            anchor,
            window: ForecastWindow::default(),
        }
    }

    pub fn for_product(mut self, product_id: ProductId) -> Self {
        self.product = Some(product_id);
        self
    }

    pub fn with_window(mut self, window: ForecastWindow) -> Self {
        self.window = window;
        self
    }
}

impl AnalyticsJob for DemandForecaster<'_> {
    type Output = Forecast;

    fn kind(&self) -> &'static str {
        "inventory.demand_forecast"
    }

    fn run(&self) -> Result<Forecast, AnalyticsError> {
        if self.window.history_days == 0 {
            return Err(AnalyticsError::InvalidInput(
                "history_days must be >= 1 to fit a trend".to_string(),
            ));
        }

        let observations = demand_observations(&self.snapshot.movements, self.product);
        let mut result = forecast(&observations, self.anchor, &self.window);
        result.product_id = self.product;

        info!(
            product = ?self.product,
            observations = observations.len(),
            predicted = result.predicted.len(),
            slope = result.trend.map(|t| t.slope),
            "demand forecast computed"
        );
        Ok(result)
    }
}
