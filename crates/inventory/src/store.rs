//! Write seam for stocktake corrections.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use wareflow_core::{LocationId, ProductId};

/// New authoritative on-hand quantity for one product at a location.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityUpdate {
    pub product_id: ProductId,
    pub new_quantity: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown location: {0}")]
    UnknownLocation(LocationId),

    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Transactional quantity writer implemented by the host's storage layer.
///
/// `apply_quantities` is all-or-nothing: when it returns `Err`, none of the
/// updates may be visible to subsequent reads.
pub trait QuantityStore: Send + Sync {
    fn apply_quantities(
        &self,
        location_id: LocationId,
        updates: &[QuantityUpdate],
    ) -> Result<(), StoreError>;
}

impl<S> QuantityStore for std::sync::Arc<S>
where
    S: QuantityStore + ?Sized,
{
    fn apply_quantities(
        &self,
        location_id: LocationId,
        updates: &[QuantityUpdate],
    ) -> Result<(), StoreError> {
        (**self).apply_quantities(location_id, updates)
    }
}
