//! Grid layout and virtualization.
//!
//! - [`geometry`]: pure time/column math
//! - [`registry`]: cell arena and program index
//! - [`culler`]: viewport-driven visibility

pub mod culler;
pub mod geometry;
pub mod registry;

pub use culler::{cull, Viewport};
pub use geometry::{clip_to_window, column_left, duration_minutes, place, top_offset_minutes, Placement};
pub use registry::{Cell, CellHandle, CellRegistry, ProgramIndex};
