//! Schedule provider trait.

use async_trait::async_trait;

use super::error::ProviderResult;
use crate::models::{ChannelFilter, ChannelSchedule, TimeWindow};

/// Source of channel listings and their programs.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait ScheduleProvider: Send + Sync {
    /// Fetch the schedule for a window.
    ///
    /// # Arguments
    /// * `window` - Time range to cover
    /// * `filter` - Which channels to include
    ///
    /// # Returns
    /// * `Ok(Vec<ChannelSchedule>)` - Channels in display order, each with the
    ///   programs that overlap `window`
    /// * `Err(ProviderError)` - If the upstream service rejects the request
    async fn fetch_schedule(
        &self,
        window: &TimeWindow,
        filter: &ChannelFilter,
    ) -> ProviderResult<Vec<ChannelSchedule>>;
}
