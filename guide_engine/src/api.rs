//! Public API surface of the guide engine.
//!
//! Identifier newtypes and the value objects handed to the presentation
//! layer. All types derive Serialize/Deserialize so a host can ship them
//! across a process or FFI boundary unchanged.

pub use crate::config::GuideMode;
pub use crate::layout::{Cell, CellHandle};
pub use crate::models::{
    Channel, ChannelFilter, ChannelSchedule, ChannelType, Column, GenrePair, GuideRequest,
    Program, ReservationLists, ReservationRef, ReservationStatus, TimeWindow,
};
pub use crate::services::orchestrator::GuideState;

use serde::{Deserialize, Serialize};

crate::define_id_type!(
    /// Program (event) identifier.
    i64,
    ProgramId
);
crate::define_id_type!(
    /// Channel identifier.
    i64,
    ChannelId
);
crate::define_id_type!(
    /// Reservation identifier.
    i64,
    ReserveId
);
crate::define_id_type!(
    /// Recording rule identifier.
    i64,
    RuleId
);

/// Paintable description of one cell.
///
/// Geometry is in pixels, derived from the cell's minute/column units and the
/// base sizes the host reported in its viewport. `program_id` is the
/// activation handle the host passes back to
/// [`GuideOrchestrator::activate`](crate::services::GuideOrchestrator::activate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    pub handle: CellHandle,
    pub program_id: ProgramId,
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    pub classes: Vec<String>,
    pub is_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RenderNode {
    pub fn from_cell(handle: CellHandle, cell: &Cell, column_width: f64, minute_height: f64) -> Self {
        Self {
            handle,
            program_id: cell.program_id(),
            top: cell.top() as f64 * minute_height,
            left: cell.left() as f64 * column_width,
            width: column_width,
            height: cell.height() as f64 * minute_height,
            classes: cell.classes(),
            is_visible: cell.is_visible(),
            name: cell.program().name.clone(),
        }
    }
}

/// Serializable snapshot of the guide for a presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideSnapshot {
    pub state: GuideState,
    pub guide_mode: GuideMode,
    pub window: Option<TimeWindow>,
    pub columns: Vec<Column>,
    pub time_labels: Vec<u32>,
    pub nodes: Vec<RenderNode>,
}
