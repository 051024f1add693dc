//! In-memory local provider implementation.
//!
//! Serves schedules and reservations from memory. Used by the test suite and
//! by the `guide-dump` tool, which loads a JSON fixture into it.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ErrorContext, ProviderError, ProviderResult};
use super::reservation::ReservationProvider;
use super::schedule::ScheduleProvider;
use super::settings::SettingsProvider;
use crate::config::GuideMode;
use crate::models::{
    Channel, ChannelFilter, ChannelSchedule, Program, ReservationLists, TimeWindow,
};

/// Serialized guide data: channels with programs plus reservation lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideFixture {
    pub channels: Vec<ChannelSchedule>,
    #[serde(default)]
    pub reservations: ReservationLists,
}

/// In-memory provider.
///
/// # Example
/// ```
/// use epg_guide::models::{Channel, ChannelType, Program};
/// use epg_guide::providers::LocalProvider;
///
/// let provider = LocalProvider::new();
/// provider.add_channel(
///     Channel::new(1, "NHK", ChannelType::GR),
///     vec![Program::new(10, 1, 0, 30 * 60_000)],
/// );
/// assert_eq!(provider.channel_count(), 1);
/// ```
#[derive(Clone)]
pub struct LocalProvider {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    schedules: Vec<ChannelSchedule>,
    reservations: ReservationLists,
    guide_mode: GuideMode,
    schedule_fetches: usize,
    reservation_fetches: usize,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            schedules: Vec::new(),
            reservations: ReservationLists::default(),
            guide_mode: GuideMode::default(),
            schedule_fetches: 0,
            reservation_fetches: 0,
            is_healthy: true,
        }
    }
}

impl LocalProvider {
    /// Create a new empty provider.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Create a provider pre-populated from a fixture.
    pub fn from_fixture(fixture: GuideFixture) -> Self {
        let provider = Self::new();
        {
            let mut data = provider.data.write();
            data.schedules = fixture.channels;
            data.reservations = fixture.reservations;
        }
        provider
    }

    /// Parse a JSON fixture.
    pub fn from_json_str(json: &str) -> ProviderResult<Self> {
        let fixture: GuideFixture = serde_json::from_str(json).map_err(|e| {
            ProviderError::ValidationError {
                message: format!("Failed to parse guide fixture: {}", e),
                context: ErrorContext::new("from_json_str").with_entity("fixture"),
            }
        })?;
        Ok(Self::from_fixture(fixture))
    }

    /// Append a channel and its programs. Channels are served in insertion order.
    pub fn add_channel(&self, channel: Channel, programs: Vec<Program>) {
        self.data
            .write()
            .schedules
            .push(ChannelSchedule { channel, programs });
    }

    /// Replace the reservation lists served by subsequent fetches.
    pub fn set_reservations(&self, reservations: ReservationLists) {
        self.data.write().reservations = reservations;
    }

    /// Set the guide mode served as [`SettingsProvider`].
    pub fn set_guide_mode(&self, mode: GuideMode) {
        self.data.write().guide_mode = mode;
    }

    /// Set the health status for testing provider failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the provider.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    pub fn channel_count(&self) -> usize {
        self.data.read().schedules.len()
    }

    /// Number of schedule fetches served so far, including failed ones.
    pub fn schedule_fetch_count(&self) -> usize {
        self.data.read().schedule_fetches
    }

    /// Number of reservation fetches served so far, including failed ones.
    pub fn reservation_fetch_count(&self) -> usize {
        self.data.read().reservation_fetches
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleProvider for LocalProvider {
    async fn fetch_schedule(
        &self,
        window: &TimeWindow,
        filter: &ChannelFilter,
    ) -> ProviderResult<Vec<ChannelSchedule>> {
        let mut data = self.data.write();
        data.schedule_fetches += 1;

        if !data.is_healthy {
            return Err(ProviderError::connection_with_context(
                "Local provider is unhealthy",
                ErrorContext::new("fetch_schedule").with_entity("schedule"),
            ));
        }

        if let ChannelFilter::Single(id) = filter {
            if !data.schedules.iter().any(|s| s.channel.id == *id) {
                return Err(ProviderError::not_found_with_context(
                    format!("Channel {} not found", id),
                    ErrorContext::new("fetch_schedule")
                        .with_entity("channel")
                        .with_entity_id(id),
                ));
            }
        }

        let schedules = data
            .schedules
            .iter()
            .filter(|s| filter.matches(&s.channel))
            .map(|s| {
                let mut programs: Vec<Program> = s
                    .programs
                    .iter()
                    .filter(|p| window.overlaps(p.start_at, p.end_at))
                    .cloned()
                    .collect();
                programs.sort_by_key(|p| (p.start_at, p.id));
                ChannelSchedule {
                    channel: s.channel.clone(),
                    programs,
                }
            })
            .collect();

        Ok(schedules)
    }
}

#[async_trait]
impl ReservationProvider for LocalProvider {
    async fn fetch_reservation_lists(
        &self,
        _window: &TimeWindow,
    ) -> ProviderResult<ReservationLists> {
        let mut data = self.data.write();
        data.reservation_fetches += 1;

        if !data.is_healthy {
            return Err(ProviderError::connection_with_context(
                "Local provider is unhealthy",
                ErrorContext::new("fetch_reservation_lists").with_entity("reservation"),
            ));
        }

        Ok(data.reservations.clone())
    }
}

impl SettingsProvider for LocalProvider {
    fn guide_mode(&self) -> GuideMode {
        self.data.read().guide_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChannelId;
    use crate::models::{ChannelType, ReservationRef};

    const MIN: i64 = 60_000;

    fn provider() -> LocalProvider {
        let provider = LocalProvider::new();
        provider.add_channel(
            Channel::new(1, "GR1", ChannelType::GR),
            vec![
                Program::new(12, 1, 60 * MIN, 90 * MIN),
                Program::new(11, 1, 0, 60 * MIN),
                Program::new(13, 1, 300 * MIN, 360 * MIN),
            ],
        );
        provider.add_channel(
            Channel::new(2, "BS1", ChannelType::BS),
            vec![Program::new(21, 2, 0, 120 * MIN)],
        );
        provider
    }

    #[tokio::test]
    async fn test_fetch_filters_by_window_and_sorts() {
        let provider = provider();
        let window = TimeWindow::new(0, 120 * MIN).unwrap();

        let schedules = provider
            .fetch_schedule(&window, &ChannelFilter::All)
            .await
            .unwrap();

        assert_eq!(schedules.len(), 2);
        let ids: Vec<i64> = schedules[0].programs.iter().map(|p| p.id.value()).collect();
        assert_eq!(ids, vec![11, 12]);
    }

    #[tokio::test]
    async fn test_fetch_by_channel_type() {
        let provider = provider();
        let window = TimeWindow::new(0, 120 * MIN).unwrap();

        let schedules = provider
            .fetch_schedule(&window, &ChannelFilter::Type(ChannelType::BS))
            .await
            .unwrap();

        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0].channel.id, ChannelId::new(2));
    }

    #[tokio::test]
    async fn test_unknown_single_channel_is_not_found() {
        let provider = provider();
        let window = TimeWindow::new(0, 120 * MIN).unwrap();

        let err = provider
            .fetch_schedule(&window, &ChannelFilter::Single(ChannelId::new(99)))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_unhealthy_provider_fails() {
        let provider = provider();
        provider.set_healthy(false);
        let window = TimeWindow::new(0, 120 * MIN).unwrap();

        assert!(provider
            .fetch_schedule(&window, &ChannelFilter::All)
            .await
            .is_err());
        assert!(provider.fetch_reservation_lists(&window).await.is_err());
        assert_eq!(provider.schedule_fetch_count(), 1);
        assert_eq!(provider.reservation_fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_reservations_round_trip() {
        let provider = provider();
        provider.set_reservations(ReservationLists {
            normal: vec![ReservationRef::new(11, 1)],
            ..Default::default()
        });
        let window = TimeWindow::new(0, 120 * MIN).unwrap();

        let lists = provider.fetch_reservation_lists(&window).await.unwrap();
        assert_eq!(lists.normal.len(), 1);
    }

    #[test]
    fn test_from_json_fixture() {
        let json = r#"{
            "channels": [{
                "channel": {"id": 1, "name": "GR1", "half_width_name": "GR1", "channel_type": "GR"},
                "programs": [{"id": 5, "channel_id": 1, "start_at": 0, "end_at": 60000}]
            }],
            "reservations": {"normal": [{"program_id": 5, "reserve_id": 1}]}
        }"#;
        let provider = LocalProvider::from_json_str(json).unwrap();
        assert_eq!(provider.channel_count(), 1);

        assert!(LocalProvider::from_json_str("{").is_err());
    }

    #[test]
    fn test_guide_mode_setting() {
        let provider = provider();
        assert_eq!(provider.guide_mode(), GuideMode::Sequential);
        provider.set_guide_mode(GuideMode::All);
        assert_eq!(provider.guide_mode(), GuideMode::All);
    }

    #[test]
    fn test_clear_keeps_health() {
        let provider = provider();
        provider.set_healthy(false);
        provider.clear();
        assert_eq!(provider.channel_count(), 0);
        assert!(!provider.data.read().is_healthy);
    }
}
