//! Reservation index: program id to overlay status.
//!
//! Built from the four reservation lists and diffed against the previous
//! index so the guide only repaints programs whose status changed.

use std::collections::HashMap;

use crate::api::ProgramId;
use crate::models::{ReservationLists, ReservationRef, ReservationStatus, StatusDiff};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    status: ReservationStatus,
    reservation: Option<ReservationRef>,
}

/// Mapping from program id to its reservation status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationIndex {
    entries: HashMap<ProgramId, Entry>,
}

impl ReservationIndex {
    /// Build an index from reservation lists.
    ///
    /// Lists are applied in the order normal, conflicts, skips, overlaps. A
    /// program appearing in more than one list takes the status of the last.
    pub fn build(lists: &ReservationLists) -> Self {
        let mut entries = HashMap::with_capacity(lists.len());
        let mut overwritten = 0usize;
        for (status, reservation) in lists.iter_with_status() {
            let previous = entries.insert(
                reservation.program_id,
                Entry {
                    status,
                    reservation: Some(reservation.clone()),
                },
            );
            if previous.is_some() {
                overwritten += 1;
            }
        }
        if overwritten > 0 {
            log::debug!(
                "Reservation index: {} program(s) listed more than once, last status wins",
                overwritten
            );
        }
        Self { entries }
    }

    /// Build an index directly from `(program, status)` pairs.
    ///
    /// Pairs with [`ReservationStatus::None`] are skipped.
    pub fn from_statuses(statuses: impl IntoIterator<Item = (ProgramId, ReservationStatus)>) -> Self {
        let entries = statuses
            .into_iter()
            .filter(|(_, status)| !status.is_none())
            .map(|(program_id, status)| {
                (
                    program_id,
                    Entry {
                        status,
                        reservation: None,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn status(&self, program_id: ProgramId) -> ReservationStatus {
        self.entries
            .get(&program_id)
            .map(|e| e.status)
            .unwrap_or(ReservationStatus::None)
    }

    /// Reservation that produced the program's status.
    pub fn reservation(&self, program_id: ProgramId) -> Option<&ReservationRef> {
        self.entries
            .get(&program_id)
            .and_then(|e| e.reservation.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All `(program, status)` pairs sorted by program id.
    pub fn statuses(&self) -> Vec<(ProgramId, ReservationStatus)> {
        let mut statuses: Vec<_> = self.entries.iter().map(|(id, e)| (*id, e.status)).collect();
        statuses.sort_unstable_by_key(|(id, _)| *id);
        statuses
    }

    /// Status changes needed to go from `old` to `new`.
    pub fn diff(old: &ReservationIndex, new: &ReservationIndex) -> StatusDiff {
        let mut removed: Vec<ProgramId> = old
            .entries
            .keys()
            .filter(|id| !new.entries.contains_key(*id))
            .copied()
            .collect();
        removed.sort_unstable();

        let mut added_or_changed: Vec<(ProgramId, ReservationStatus)> = new
            .entries
            .iter()
            .filter(|(id, entry)| old.status(**id) != entry.status)
            .map(|(id, entry)| (*id, entry.status))
            .collect();
        added_or_changed.sort_unstable_by_key(|(id, _)| *id);

        StatusDiff {
            removed,
            added_or_changed,
        }
    }
}
