//! Periodic reservation refresh.

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::fetch::fetch_reservations;
use super::orchestrator::{GuideOrchestrator, RefreshOutcome};

/// Refresh the reservation overlay every `period` until `shutdown` flips to
/// `true` or its sender is dropped.
///
/// The guide lock is held only to issue the ticket and to apply the result;
/// the provider call runs unlocked so scrolling is never blocked by I/O.
/// Failed or stale refreshes are logged and the loop keeps going.
///
/// # Returns
/// Number of refreshes that patched the overlay.
pub async fn run_periodic_refresh(
    guide: Arc<Mutex<GuideOrchestrator>>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> usize {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut applied = 0;

    info!("Refresh: starting reservation refresh every {:?}", period);

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        let (ticket, provider) = {
            let guide = guide.lock().await;
            (guide.begin_reservation_refresh(), guide.provider())
        };
        let Some(ticket) = ticket else {
            debug!("Refresh: no grid installed, skipping tick");
            continue;
        };

        let result = fetch_reservations(provider.as_ref(), &ticket).await;

        match guide.lock().await.complete_reservation_refresh(ticket, result) {
            Ok(RefreshOutcome::Applied { .. }) => applied += 1,
            Ok(RefreshOutcome::Stale) | Ok(RefreshOutcome::NoGrid) => {
                debug!("Refresh: grid changed while fetching, result dropped");
            }
            Err(e) => warn!("Refresh: reservation refresh failed: {}", e),
        }
    }

    info!("Refresh: stopped after {} applied refreshes", applied);
    applied
}

/// Run [`run_periodic_refresh`] at the guide's configured
/// `reservation_refresh_secs` interval.
pub async fn run_configured_refresh(
    guide: Arc<Mutex<GuideOrchestrator>>,
    shutdown: watch::Receiver<bool>,
) -> usize {
    let period = guide.lock().await.config().reservation_refresh_interval();
    run_periodic_refresh(guide, period, shutdown).await
}
