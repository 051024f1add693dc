use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::{ProgramId, ReserveId, RuleId};

/// Client-visible reservation state of a program.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[default]
    None,
    Reserved,
    Conflict,
    Skip,
    Overlap,
}

impl ReservationStatus {
    /// CSS-like class name for the overlay, `None` for [`ReservationStatus::None`].
    pub fn class_name(&self) -> Option<&'static str> {
        match self {
            ReservationStatus::None => None,
            ReservationStatus::Reserved => Some("reserve"),
            ReservationStatus::Conflict => Some("conflict"),
            ReservationStatus::Skip => Some("skip"),
            ReservationStatus::Overlap => Some("overlap"),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ReservationStatus::None)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name().unwrap_or("none"))
    }
}

/// Reference to a reservation covering a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRef {
    pub program_id: ProgramId,
    pub reserve_id: ReserveId,
    #[serde(default)]
    pub rule_id: Option<RuleId>,
}

impl ReservationRef {
    pub fn new(program_id: i64, reserve_id: i64) -> Self {
        Self {
            program_id: ProgramId::new(program_id),
            reserve_id: ReserveId::new(reserve_id),
            rule_id: None,
        }
    }

    pub fn with_rule(mut self, rule_id: i64) -> Self {
        self.rule_id = Some(RuleId::new(rule_id));
        self
    }
}

/// Reservation lists as returned by the reservation provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationLists {
    #[serde(default)]
    pub normal: Vec<ReservationRef>,
    #[serde(default)]
    pub conflicts: Vec<ReservationRef>,
    #[serde(default)]
    pub skips: Vec<ReservationRef>,
    #[serde(default)]
    pub overlaps: Vec<ReservationRef>,
}

impl ReservationLists {
    pub fn is_empty(&self) -> bool {
        self.normal.is_empty()
            && self.conflicts.is_empty()
            && self.skips.is_empty()
            && self.overlaps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.normal.len() + self.conflicts.len() + self.skips.len() + self.overlaps.len()
    }

    /// Iterate the lists in build order, paired with the status each list assigns.
    pub fn iter_with_status(
        &self,
    ) -> impl Iterator<Item = (ReservationStatus, &ReservationRef)> + '_ {
        tagged(ReservationStatus::Reserved, &self.normal)
            .chain(tagged(ReservationStatus::Conflict, &self.conflicts))
            .chain(tagged(ReservationStatus::Skip, &self.skips))
            .chain(tagged(ReservationStatus::Overlap, &self.overlaps))
    }
}

fn tagged(
    status: ReservationStatus,
    list: &[ReservationRef],
) -> impl Iterator<Item = (ReservationStatus, &ReservationRef)> + '_ {
    list.iter().map(move |r| (status, r))
}

/// Status changes between two reservation snapshots.
///
/// Both lists are sorted by program id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDiff {
    /// Programs that no longer carry any status.
    pub removed: Vec<ProgramId>,
    /// Programs whose status is new or different.
    pub added_or_changed: Vec<(ProgramId, ReservationStatus)>,
}

impl StatusDiff {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added_or_changed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.removed.len() + self.added_or_changed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_class_names() {
        assert_eq!(ReservationStatus::None.class_name(), None);
        assert_eq!(ReservationStatus::Reserved.class_name(), Some("reserve"));
        assert_eq!(ReservationStatus::Overlap.to_string(), "overlap");
    }

    #[test]
    fn test_iter_with_status_order() {
        let lists = ReservationLists {
            normal: vec![ReservationRef::new(1, 100)],
            conflicts: vec![ReservationRef::new(2, 101)],
            skips: vec![],
            overlaps: vec![ReservationRef::new(3, 102).with_rule(9)],
        };

        let statuses: Vec<_> = lists.iter_with_status().map(|(s, _)| s).collect();
        assert_eq!(
            statuses,
            vec![
                ReservationStatus::Reserved,
                ReservationStatus::Conflict,
                ReservationStatus::Overlap
            ]
        );
        assert_eq!(lists.len(), 3);
        assert!(!lists.is_empty());
    }
}
