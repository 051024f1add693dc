//! Provider trait definitions for the guide's external collaborators.
//!
//! The guide never talks to a transport directly. Schedule data, reservation
//! lists and the guide mode are obtained through the traits in this module,
//! so hosts can plug in an HTTP client, a local database or the in-memory
//! [`LocalProvider`].
//!
//! # Module Organization
//!
//! - [`error`]: Error types for provider operations
//! - [`schedule`]: Channel + program listings for a window
//! - [`reservation`]: Reserved / conflicting / skipped / overlapping programs
//! - [`settings`]: Guide mode source
//! - [`local`]: In-memory implementation of all traits
//!
//! # Convenience Trait Bound
//!
//! ```ignore
//! async fn my_fetch<P: GuideProvider + ?Sized>(provider: &P) -> ProviderResult<()> {
//!     let window = TimeWindow::from_hours(0, 24).unwrap();
//!     provider.fetch_schedule(&window, &ChannelFilter::All).await?;
//!     provider.fetch_reservation_lists(&window).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod local;
pub mod reservation;
pub mod schedule;
pub mod settings;

pub use error::{ErrorContext, ProviderError, ProviderResult};

pub use local::{GuideFixture, LocalProvider};
pub use reservation::ReservationProvider;
pub use schedule::ScheduleProvider;
pub use settings::{ConfigSettings, SettingsProvider, StaticSettings};

/// Composite trait bound for a provider that serves both schedules and
/// reservations.
pub trait GuideProvider: ScheduleProvider + ReservationProvider {}

// Blanket implementation: any type implementing both traits is a GuideProvider
impl<T> GuideProvider for T where T: ScheduleProvider + ReservationProvider {}
