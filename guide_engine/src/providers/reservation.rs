//! Reservation provider trait.

use async_trait::async_trait;

use super::error::ProviderResult;
use crate::models::{ReservationLists, TimeWindow};

/// Source of the current reservation state.
#[async_trait]
pub trait ReservationProvider: Send + Sync {
    /// Fetch reservation lists covering a window.
    ///
    /// The four lists are expected to be disjoint, but callers must not rely on it.
    async fn fetch_reservation_lists(&self, window: &TimeWindow)
        -> ProviderResult<ReservationLists>;
}
