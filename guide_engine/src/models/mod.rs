//! Domain models for the guide.

#[macro_use]
mod macros;

pub mod channel;
pub mod program;
pub mod reservation;
pub mod window;

pub use channel::{Channel, ChannelFilter, ChannelType, Column};
pub use program::{ChannelSchedule, GenrePair, Program};
pub use reservation::{ReservationLists, ReservationRef, ReservationStatus, StatusDiff};
pub use window::{
    parse_start_time, truncate_to_hour, GuideRequest, Page, TimeWindow, WindowLayout,
    MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND,
};
