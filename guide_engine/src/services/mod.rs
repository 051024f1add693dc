//! Service layer for guide orchestration.
//!
//! This module sits between the providers and the presentation layer. The
//! orchestrator owns the grid and its lifecycle; the fetch helpers talk to
//! providers without borrowing the orchestrator, and the refresh task keeps
//! the reservation overlay current.

pub mod fetch;

pub mod orchestrator;

pub mod refresh;

pub mod reservation_index;

pub use fetch::{fetch_guide_payload, fetch_reservations};
pub use orchestrator::{
    ActivationHandler, FetchTicket, GuideNotice, GuideOrchestrator, GuidePayload, GuideState,
    LoadOutcome, RefreshOutcome, RefreshTicket,
};
pub use refresh::{run_configured_refresh, run_periodic_refresh};
pub use reservation_index::ReservationIndex;
