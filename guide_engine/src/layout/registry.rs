//! Cell registry: the arena of laid-out cells and the program index.
//!
//! Cells live in one contiguous `Vec`. The [`ProgramIndex`] maps a program id
//! to [`CellHandle`]s (arena positions), so status updates touch only the
//! cells of the programs that changed. A program may own several cells when
//! it crosses a page boundary in single-channel mode.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::geometry;
use crate::api::ProgramId;
use crate::models::{ChannelSchedule, Column, Program, ReservationStatus, StatusDiff, WindowLayout};

/// Position of a cell in the registry arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellHandle(pub usize);

impl CellHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One laid-out program rectangle.
///
/// `top` and `height` are minutes from the top of the grid, `left` is the
/// column ordinal. Geometry never changes after construction; only the
/// visibility flag and the status classes do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    top: i64,
    left: usize,
    height: i64,
    page: usize,
    program: Program,
    is_visible: bool,
    status_classes: BTreeSet<ReservationStatus>,
}

impl Cell {
    pub fn top(&self) -> i64 {
        self.top
    }

    pub fn left(&self) -> usize {
        self.left
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn program_id(&self) -> ProgramId {
        self.program.id
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.is_visible = visible;
    }

    pub fn status_classes(&self) -> &BTreeSet<ReservationStatus> {
        &self.status_classes
    }

    /// Current overlay status, [`ReservationStatus::None`] when no class is set.
    pub fn status(&self) -> ReservationStatus {
        self.status_classes
            .iter()
            .next()
            .copied()
            .unwrap_or(ReservationStatus::None)
    }

    /// Replace the status class. Returns whether anything changed.
    fn set_status(&mut self, status: ReservationStatus) -> bool {
        if self.status() == status && self.status_classes.len() <= 1 {
            return false;
        }
        self.status_classes.clear();
        if !status.is_none() {
            self.status_classes.insert(status);
        }
        true
    }

    /// Presentation classes: genre, free-to-air marker, reservation status.
    pub fn classes(&self) -> Vec<String> {
        let mut classes = Vec::with_capacity(3);
        if let Some(genre) = self.program.primary_genre() {
            classes.push(format!("genre-{}", genre));
        }
        if self.program.is_free {
            classes.push("free".to_string());
        }
        classes.extend(
            self.status_classes
                .iter()
                .filter_map(|s| s.class_name())
                .map(str::to_string),
        );
        classes
    }
}

/// Program id to cell handles. Handles are appended in build order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramIndex {
    entries: HashMap<ProgramId, Vec<CellHandle>>,
}

impl ProgramIndex {
    pub fn get(&self, program_id: ProgramId) -> &[CellHandle] {
        self.entries
            .get(&program_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, program_id: ProgramId) -> bool {
        self.entries.contains_key(&program_id)
    }

    /// Number of distinct programs indexed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, program_id: ProgramId, handle: CellHandle) {
        self.entries.entry(program_id).or_default().push(handle);
    }
}

/// Owner of every cell of one grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRegistry {
    layout: WindowLayout,
    columns: Vec<Column>,
    cells: Vec<Cell>,
    program_index: ProgramIndex,
}

impl CellRegistry {
    /// Lay out every program of every channel for `layout`.
    ///
    /// Channels are assigned columns in the order given. Programs that clip to
    /// nothing on a page produce no cell on that page. `initial_visibility` is
    /// the visibility flag new cells start with.
    pub fn rebuild(
        layout: &WindowLayout,
        schedules: Vec<ChannelSchedule>,
        initial_visibility: bool,
    ) -> Self {
        let mut columns = Vec::with_capacity(schedules.len());
        let mut cells = Vec::new();
        let mut program_index = ProgramIndex::default();

        for (column, schedule) in schedules.into_iter().enumerate() {
            for program in schedule.programs {
                for page in layout.pages_overlapping(program.start_at, program.end_at) {
                    let Some(placement) = geometry::place(&page.window, &program, column) else {
                        continue;
                    };
                    let handle = CellHandle(cells.len());
                    program_index.push(program.id, handle);
                    cells.push(Cell {
                        top: page.origin_minutes + placement.top,
                        left: placement.left,
                        height: placement.height,
                        page: page.index,
                        program: program.clone(),
                        is_visible: initial_visibility,
                        status_classes: BTreeSet::new(),
                    });
                }
            }
            columns.push(Column {
                index: column,
                channel: schedule.channel,
            });
        }

        log::debug!(
            "Cell registry: built {} cells for {} programs across {} columns and {} pages",
            cells.len(),
            program_index.len(),
            columns.len(),
            layout.pages().len()
        );

        Self {
            layout: layout.clone(),
            columns,
            cells,
            program_index,
        }
    }

    pub fn layout(&self) -> &WindowLayout {
        &self.layout
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn cell(&self, handle: CellHandle) -> Option<&Cell> {
        self.cells.get(handle.0)
    }

    pub fn program_index(&self) -> &ProgramIndex {
        &self.program_index
    }

    pub fn handles_for(&self, program_id: ProgramId) -> &[CellHandle] {
        self.program_index.get(program_id)
    }

    /// First cell's program for an id, if the program is on this grid.
    pub fn program(&self, program_id: ProgramId) -> Option<&Program> {
        self.handles_for(program_id)
            .first()
            .and_then(|h| self.cell(*h))
            .map(Cell::program)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Set the status of every cell of one program.
    ///
    /// Returns the number of cells whose classes changed.
    pub fn apply_status(&mut self, program_id: ProgramId, status: ReservationStatus) -> usize {
        let Some(handles) = self.program_index.entries.get(&program_id) else {
            return 0;
        };
        let mut changed = 0;
        for handle in handles {
            if let Some(cell) = self.cells.get_mut(handle.0) {
                if cell.set_status(status) {
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Apply a status diff, touching only the cells of the programs it names.
    ///
    /// Returns the handles of the cells that changed.
    pub fn apply_status_delta(&mut self, diff: &StatusDiff) -> Vec<CellHandle> {
        let updates = diff
            .removed
            .iter()
            .map(|id| (*id, ReservationStatus::None))
            .chain(diff.added_or_changed.iter().copied());

        let mut touched = Vec::new();
        for (program_id, status) in updates {
            let Some(handles) = self.program_index.entries.get(&program_id) else {
                continue;
            };
            for handle in handles {
                if let Some(cell) = self.cells.get_mut(handle.0) {
                    if cell.set_status(status) {
                        touched.push(*handle);
                    }
                }
            }
        }
        touched
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
