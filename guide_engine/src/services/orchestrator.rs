//! Guide orchestrator: owns one grid and drives its lifecycle.
//!
//! ```text
//!   Empty ──request_window──▶ Loading ──complete_window(ok)──▶ Ready
//!     ▲                          │                               │
//!     └──complete_window(err)────┘   ◀──request_window───────────┤
//!                                                                │
//!            update_viewport / reservation refresh ──▶ Ready ◀───┘
//! ```
//!
//! Every window fetch and every reservation refresh is tagged with a
//! generation number. A response whose generation is no longer current is
//! dropped on arrival, so a slow reply for an old window can never be
//! applied to a newer grid. The new grid is built completely before it
//! replaces the old one.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use super::fetch::{fetch_guide_payload, fetch_reservations};
use super::reservation_index::ReservationIndex;
use crate::api::{GuideSnapshot, ProgramId, RenderNode};
use crate::config::{GuideConfig, GuideMode};
use crate::error::{GuideError, GuideResult};
use crate::layout::{self, Cell, CellHandle, CellRegistry, Viewport};
use crate::models::{
    ChannelFilter, ChannelSchedule, Column, GuideRequest, Program, ReservationLists,
    ReservationRef, ReservationStatus, StatusDiff, TimeWindow, WindowLayout,
};
use crate::providers::{GuideProvider, ProviderResult, SettingsProvider};

/// Lifecycle state of the guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideState {
    Empty,
    Loading,
    Ready,
}

/// Handle for an outstanding window fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    generation: u64,
    request: GuideRequest,
    layout: WindowLayout,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &GuideRequest {
        &self.request
    }

    pub fn window(&self) -> TimeWindow {
        self.layout.window()
    }

    pub fn channel_filter(&self) -> ChannelFilter {
        self.request.channel_filter()
    }
}

/// Handle for an outstanding reservation refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    grid_generation: u64,
    window: TimeWindow,
}

impl RefreshTicket {
    pub fn grid_generation(&self) -> u64 {
        self.grid_generation
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }
}

/// Provider responses needed to build a grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuidePayload {
    pub schedules: Vec<ChannelSchedule>,
    pub reservations: ReservationLists,
}

/// Result of completing a window fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A new grid was installed.
    Applied { cells: usize, generation: u64 },
    /// A newer request was issued meanwhile; the response was dropped.
    Superseded,
}

/// Result of completing a reservation refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The overlay was patched. `touched` lists the cells that changed.
    Applied {
        diff: StatusDiff,
        touched: Vec<CellHandle>,
    },
    /// The grid was rebuilt after the refresh was issued; the response was dropped.
    Stale,
    /// There is no grid to refresh.
    NoGrid,
}

/// User-visible notification raised by the guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideNotice {
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Callback invoked when the host activates a cell.
pub type ActivationHandler = Box<dyn FnMut(&Program, Option<&ReservationRef>) + Send>;

struct Grid {
    generation: u64,
    request: GuideRequest,
    mode: GuideMode,
    registry: CellRegistry,
    reservations: ReservationIndex,
}

struct PendingFetch {
    generation: u64,
    layout: WindowLayout,
}

/// Public-facing guide engine.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use epg_guide::config::{GuideConfig, GuideMode};
/// use epg_guide::models::{Channel, ChannelType, GuideRequest, Program};
/// use epg_guide::providers::{LocalProvider, StaticSettings};
/// use epg_guide::services::GuideOrchestrator;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = LocalProvider::new();
/// provider.add_channel(
///     Channel::new(1, "NHK", ChannelType::GR),
///     vec![Program::new(10, 1, 0, 30 * 60_000)],
/// );
///
/// let mut guide = GuideOrchestrator::new(
///     GuideConfig::default(),
///     Arc::new(provider),
///     Arc::new(StaticSettings(GuideMode::Minimum)),
/// )?;
/// guide.load(GuideRequest::multi_channel(0, 24)).await?;
/// assert_eq!(guide.cells().len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct GuideOrchestrator {
    config: GuideConfig,
    provider: Arc<dyn GuideProvider>,
    settings: Arc<dyn SettingsProvider>,
    state: GuideState,
    grid: Option<Grid>,
    pending: Option<PendingFetch>,
    next_generation: u64,
    viewport: Option<Viewport>,
    notices: Vec<GuideNotice>,
    activation_handler: Option<ActivationHandler>,
}

impl GuideOrchestrator {
    /// Create an empty guide.
    pub fn new(
        config: GuideConfig,
        provider: Arc<dyn GuideProvider>,
        settings: Arc<dyn SettingsProvider>,
    ) -> GuideResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider,
            settings,
            state: GuideState::Empty,
            grid: None,
            pending: None,
            next_generation: 1,
            viewport: None,
            notices: Vec::new(),
            activation_handler: None,
        })
    }

    pub fn state(&self) -> GuideState {
        self.state
    }

    pub fn config(&self) -> &GuideConfig {
        &self.config
    }

    pub fn provider(&self) -> Arc<dyn GuideProvider> {
        Arc::clone(&self.provider)
    }

    /// Mode of the current grid, or the settings provider's mode if there is none.
    pub fn guide_mode(&self) -> GuideMode {
        self.grid
            .as_ref()
            .map(|g| g.mode)
            .unwrap_or_else(|| self.settings.guide_mode())
    }

    /// Generation of the installed grid.
    pub fn generation(&self) -> Option<u64> {
        self.grid.as_ref().map(|g| g.generation)
    }

    /// Window of the installed grid.
    pub fn window(&self) -> Option<TimeWindow> {
        self.grid.as_ref().map(|g| g.registry.layout().window())
    }

    /// Request that produced the installed grid.
    pub fn request(&self) -> Option<&GuideRequest> {
        self.grid.as_ref().map(|g| &g.request)
    }

    /// Layout of the installed grid, or of the pending request when no grid exists yet.
    pub fn require_layout(&self) -> GuideResult<&WindowLayout> {
        self.grid
            .as_ref()
            .map(|g| g.registry.layout())
            .or_else(|| self.pending.as_ref().map(|p| &p.layout))
            .ok_or_else(|| GuideError::invalid_window("no window has been set"))
    }

    /// Window of the installed or pending grid.
    pub fn require_window(&self) -> GuideResult<TimeWindow> {
        self.require_layout().map(WindowLayout::window)
    }

    // ==================== Window lifecycle ====================

    /// Start loading a new window.
    ///
    /// The current grid, if any, stays readable until the new one is installed.
    ///
    /// # Returns
    /// * `Ok(FetchTicket)` - Ticket to hand to [`fetch_guide_payload`] and
    ///   [`GuideOrchestrator::complete_window`]
    /// * `Err(GuideError::InvalidWindow)` - If the request cannot be laid out
    pub fn request_window(&mut self, request: GuideRequest) -> GuideResult<FetchTicket> {
        let layout = request.layout(&self.config)?;
        let generation = self.next_generation;
        self.next_generation += 1;

        if let Some(previous) = self.pending.as_ref() {
            debug!(
                "Guide: generation {} supersedes pending generation {}",
                generation, previous.generation
            );
        }

        info!(
            "Guide: requesting window [{}, {}) with {} page(s) (generation {})",
            layout.window().start(),
            layout.window().end(),
            layout.pages().len(),
            generation
        );

        self.pending = Some(PendingFetch {
            generation,
            layout: layout.clone(),
        });
        self.state = GuideState::Loading;

        Ok(FetchTicket {
            generation,
            request,
            layout,
        })
    }

    /// Finish a window fetch.
    ///
    /// Responses for superseded tickets are dropped. On provider failure the
    /// previous grid is kept and a notice is queued.
    pub fn complete_window(
        &mut self,
        ticket: FetchTicket,
        result: ProviderResult<GuidePayload>,
    ) -> GuideResult<LoadOutcome> {
        if self.pending.as_ref().map(|p| p.generation) != Some(ticket.generation) {
            debug!(
                "Guide: dropping superseded response for generation {}",
                ticket.generation
            );
            return Ok(LoadOutcome::Superseded);
        }
        self.pending = None;

        let payload = match result {
            Ok(payload) => payload,
            Err(err) => {
                self.state = if self.grid.is_some() {
                    GuideState::Ready
                } else {
                    GuideState::Empty
                };
                warn!(
                    "Guide: fetch for generation {} failed, keeping previous grid: {}",
                    ticket.generation, err
                );
                self.push_notice("Failed to load the program guide");
                return Err(GuideError::from(err));
            }
        };

        let start = Instant::now();
        let mode = self.settings.guide_mode();
        let mut registry =
            CellRegistry::rebuild(&ticket.layout, payload.schedules, mode == GuideMode::All);
        let reservations = ReservationIndex::build(&payload.reservations);
        for (program_id, status) in reservations.statuses() {
            registry.apply_status(program_id, status);
        }
        let cells = registry.len();

        self.grid = Some(Grid {
            generation: ticket.generation,
            request: ticket.request,
            mode,
            registry,
            reservations,
        });
        self.state = GuideState::Ready;

        info!(
            "Guide: installed generation {} with {} cells in {:.2}ms (mode={})",
            ticket.generation,
            cells,
            start.elapsed().as_secs_f64() * 1000.0,
            mode
        );

        self.cull();

        Ok(LoadOutcome::Applied {
            cells,
            generation: ticket.generation,
        })
    }

    /// Request, fetch and install a window in one call.
    pub async fn load(&mut self, request: GuideRequest) -> GuideResult<LoadOutcome> {
        let ticket = self.request_window(request)?;
        let provider = Arc::clone(&self.provider);
        let result = fetch_guide_payload(provider.as_ref(), &ticket).await;
        self.complete_window(ticket, result)
    }

    // ==================== Reservation overlay ====================

    /// Start a reservation refresh for the installed grid.
    pub fn begin_reservation_refresh(&self) -> Option<RefreshTicket> {
        self.grid.as_ref().map(|g| RefreshTicket {
            grid_generation: g.generation,
            window: g.registry.layout().window(),
        })
    }

    /// Finish a reservation refresh by diffing and patching the overlay in place.
    pub fn complete_reservation_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: ProviderResult<ReservationLists>,
    ) -> GuideResult<RefreshOutcome> {
        let Some(current) = self.generation() else {
            return Ok(RefreshOutcome::NoGrid);
        };
        if current != ticket.grid_generation {
            debug!(
                "Guide: dropping reservation refresh for generation {} (current {})",
                ticket.grid_generation, current
            );
            return Ok(RefreshOutcome::Stale);
        }

        let lists = match result {
            Ok(lists) => lists,
            Err(err) => {
                warn!("Guide: reservation refresh failed: {}", err);
                self.push_notice("Failed to refresh reservations");
                return Err(GuideError::from(err));
            }
        };

        let Some(grid) = self.grid.as_mut() else {
            return Ok(RefreshOutcome::NoGrid);
        };
        let next = ReservationIndex::build(&lists);
        let diff = ReservationIndex::diff(&grid.reservations, &next);
        let touched = grid.registry.apply_status_delta(&diff);
        grid.reservations = next;

        if !diff.is_empty() {
            info!(
                "Guide: reservation refresh changed {} program(s), {} cell(s)",
                diff.len(),
                touched.len()
            );
        }

        Ok(RefreshOutcome::Applied { diff, touched })
    }

    /// Fetch reservations and patch the overlay in one call.
    pub async fn refresh_reservations(&mut self) -> GuideResult<RefreshOutcome> {
        let Some(ticket) = self.begin_reservation_refresh() else {
            return Ok(RefreshOutcome::NoGrid);
        };
        let provider = Arc::clone(&self.provider);
        let result = fetch_reservations(provider.as_ref(), &ticket).await;
        self.complete_reservation_refresh(ticket, result)
    }

    pub fn reservation_status(&self, program_id: ProgramId) -> ReservationStatus {
        self.grid
            .as_ref()
            .map(|g| g.reservations.status(program_id))
            .unwrap_or(ReservationStatus::None)
    }

    pub fn reservation(&self, program_id: ProgramId) -> Option<&ReservationRef> {
        self.grid
            .as_ref()
            .and_then(|g| g.reservations.reservation(program_id))
    }

    // ==================== Viewport ====================

    /// Record new viewport metrics and cull against them.
    pub fn update_viewport(&mut self, viewport: Viewport) -> Vec<CellHandle> {
        self.viewport = Some(viewport);
        self.cull()
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Cull against the last viewport. A no-op until a viewport is known.
    pub fn cull(&mut self) -> Vec<CellHandle> {
        let Some(viewport) = self.viewport else {
            debug!("Guide: no viewport yet, skipping cull");
            return Vec::new();
        };
        let margin = self.config.margin_ratio();
        match self.grid.as_mut() {
            Some(grid) => layout::cull(grid.registry.cells_mut(), &viewport, margin, grid.mode),
            None => Vec::new(),
        }
    }

    // ==================== Read accessors ====================

    pub fn cells(&self) -> &[Cell] {
        self.grid
            .as_ref()
            .map(|g| g.registry.cells())
            .unwrap_or(&[])
    }

    pub fn cell(&self, handle: CellHandle) -> Option<&Cell> {
        self.grid.as_ref().and_then(|g| g.registry.cell(handle))
    }

    pub fn cells_for(&self, program_id: ProgramId) -> &[CellHandle] {
        self.grid
            .as_ref()
            .map(|g| g.registry.handles_for(program_id))
            .unwrap_or(&[])
    }

    pub fn columns(&self) -> &[Column] {
        self.grid
            .as_ref()
            .map(|g| g.registry.columns())
            .unwrap_or(&[])
    }

    pub fn program(&self, program_id: ProgramId) -> Option<&Program> {
        self.grid.as_ref().and_then(|g| g.registry.program(program_id))
    }

    /// Hour-of-day labels for the installed (or pending) window.
    pub fn time_labels(&self) -> GuideResult<Vec<u32>> {
        let offset = self.config.utc_offset()?;
        Ok(self.require_layout()?.time_labels(offset))
    }

    /// Render nodes for every cell, sized by the last viewport's base sizes.
    ///
    /// Without a viewport, one column and one minute map to one pixel.
    pub fn render_nodes(&self) -> GuideResult<Vec<RenderNode>> {
        self.require_layout()?;
        Ok(self.collect_render_nodes(|_| true))
    }

    /// Render nodes for the cells currently marked visible.
    pub fn visible_render_nodes(&self) -> GuideResult<Vec<RenderNode>> {
        self.require_layout()?;
        Ok(self.collect_render_nodes(Cell::is_visible))
    }

    fn collect_render_nodes<F>(&self, keep: F) -> Vec<RenderNode>
    where
        F: Fn(&Cell) -> bool,
    {
        let (column_width, minute_height) = self
            .viewport
            .map(|v| (v.base_column_width, v.base_row_height_per_minute))
            .unwrap_or((1.0, 1.0));

        self.cells()
            .iter()
            .enumerate()
            .filter(|(_, cell)| keep(cell))
            .map(|(i, cell)| RenderNode::from_cell(CellHandle(i), cell, column_width, minute_height))
            .collect()
    }

    /// Serializable view of the whole guide. An empty guide yields an empty snapshot.
    pub fn snapshot(&self) -> GuideResult<GuideSnapshot> {
        let time_labels = match self.require_layout() {
            Ok(layout) => layout.time_labels(self.config.utc_offset()?),
            Err(_) => Vec::new(),
        };
        Ok(GuideSnapshot {
            state: self.state,
            guide_mode: self.guide_mode(),
            window: self.window(),
            columns: self.columns().to_vec(),
            time_labels,
            nodes: self.collect_render_nodes(|_| true),
        })
    }

    // ==================== Activation ====================

    /// Register the handler used by [`GuideOrchestrator::activate`].
    pub fn set_activation_handler(&mut self, handler: ActivationHandler) {
        self.activation_handler = Some(handler);
    }

    /// Invoke the registered handler for a program.
    ///
    /// Returns `false` when the program is not on the grid or no handler is set.
    pub fn activate(&mut self, program_id: ProgramId) -> bool {
        let Some(grid) = self.grid.as_ref() else {
            return false;
        };
        let Some(handler) = self.activation_handler.as_mut() else {
            return false;
        };
        let Some(program) = grid.registry.program(program_id) else {
            return false;
        };
        handler(program, grid.reservations.reservation(program_id));
        true
    }

    /// Invoke a one-off handler for a program.
    pub fn on_activate<F, R>(&self, program_id: ProgramId, handler: F) -> Option<R>
    where
        F: FnOnce(&Program, Option<&ReservationRef>) -> R,
    {
        let grid = self.grid.as_ref()?;
        let program = grid.registry.program(program_id)?;
        Some(handler(program, grid.reservations.reservation(program_id)))
    }

    // ==================== Notices ====================

    fn push_notice(&mut self, message: impl Into<String>) {
        self.notices.push(GuideNotice {
            message: message.into(),
            created_at: Utc::now(),
        });
    }

    /// Take all queued notices.
    pub fn drain_notices(&mut self) -> Vec<GuideNotice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod orchestrator_tests;
