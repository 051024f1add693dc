//! Provider fetches issued on behalf of the orchestrator.
//!
//! These functions borrow only the provider and a ticket, never the
//! orchestrator, so the host can await them while the guide stays usable
//! for scrolling.

use log::{debug, info};

use super::orchestrator::{FetchTicket, GuidePayload, RefreshTicket};
use crate::models::ReservationLists;
use crate::providers::{GuideProvider, ProviderResult};

/// Fetch schedule and reservation lists for a window ticket concurrently.
///
/// # Arguments
/// * `provider` - Provider implementation
/// * `ticket` - Ticket returned by `GuideOrchestrator::request_window`
///
/// # Returns
/// * `Ok(GuidePayload)` - Both responses
/// * `Err` - The first provider error
pub async fn fetch_guide_payload<P: GuideProvider + ?Sized>(
    provider: &P,
    ticket: &FetchTicket,
) -> ProviderResult<GuidePayload> {
    let window = ticket.window();
    let filter = ticket.channel_filter();
    info!(
        "Fetch: requesting schedule for [{}, {}) filter={:?} (generation {})",
        window.start(),
        window.end(),
        filter,
        ticket.generation()
    );

    let (schedules, reservations) = futures::try_join!(
        provider.fetch_schedule(&window, &filter),
        provider.fetch_reservation_lists(&window),
    )?;

    debug!(
        "Fetch: received {} channels and {} reservations (generation {})",
        schedules.len(),
        reservations.len(),
        ticket.generation()
    );

    Ok(GuidePayload {
        schedules,
        reservations,
    })
}

/// Fetch reservation lists for a refresh ticket.
pub async fn fetch_reservations<P: GuideProvider + ?Sized>(
    provider: &P,
    ticket: &RefreshTicket,
) -> ProviderResult<ReservationLists> {
    debug!(
        "Fetch: refreshing reservations for grid generation {}",
        ticket.grid_generation()
    );
    provider.fetch_reservation_lists(&ticket.window()).await
}
