//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Analytics outputs (tier breakdowns, suggestions, forecast points) carry no
/// identity of their own. Two results with the same values are the same result,
/// which is what makes recomputation over an unchanged snapshot comparable.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct ForecastPoint {
///     date: NaiveDate,
///     quantity: f64,
/// }
///
/// impl ValueObject for ForecastPoint {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
