//! Unavailability Resolver (spec §4.5): combines stated unavailability
//! windows with constant-schedule deductions into a per-worker exclusion
//! set over shift ids.

use std::collections::{HashMap, HashSet};

use crate::calendar::CalendarIndex;
use crate::model::{ShiftId, UnavailabilityEntry, UnavailabilityKind, WorkerId};

/// `E(worker) subseteq {shift_ids}` from spec §4.5.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    by_worker: HashMap<WorkerId, HashSet<ShiftId>>,
}

impl ExclusionSet {
    pub fn is_excluded(&self, worker: &WorkerId, shift: ShiftId) -> bool {
        self.by_worker.get(worker).is_some_and(|set| set.contains(&shift))
    }

    pub fn for_worker(&self, worker: &WorkerId) -> Option<&HashSet<ShiftId>> {
        self.by_worker.get(worker)
    }
}

/// A shift `s` conflicts with an unavailability entry when either no time
/// range is given, or the half-open `[start,end)` clock-time intervals
/// overlap (dates are matched separately; times are clock times only).
fn conflicts(entry: &UnavailabilityEntry, calendar: &CalendarIndex, shift: ShiftId) -> bool {
    let s = calendar.shift(shift);
    if s.date != entry.date {
        return false;
    }
    match (entry.from_time, entry.to_time) {
        (Some(from), Some(to)) => s.start_time < to && from < s.end_time,
        _ => true,
    }
}

pub fn resolve(entries: &[UnavailabilityEntry], calendar: &CalendarIndex) -> ExclusionSet {
    let mut by_worker: HashMap<WorkerId, HashSet<ShiftId>> = HashMap::new();
    for entry in entries {
        if entry.kind == UnavailabilityKind::Available {
            continue;
        }
        let Some(shift_ids) = calendar.by_date.get(&entry.date) else {
            continue;
        };
        let set = by_worker.entry(entry.worker_id.clone()).or_default();
        for &shift_id in shift_ids {
            if conflicts(entry, calendar, shift_id) {
                set.insert(shift_id);
            }
        }
    }
    ExclusionSet { by_worker }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{build, TemplateCell, TemplateRow, WeeklyTemplate};
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::BTreeSet;

    fn calendar() -> CalendarIndex {
        let row = TemplateRow {
            shift_name: "D1".into(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            qualification: BTreeSet::from([3]),
            cells: [TemplateCell::Yes; 7],
        };
        let template = WeeklyTemplate { rows: vec![row] };
        let (idx, _) = build(&template, 1, &[], NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        idx
    }

    #[test]
    fn whole_day_unavailability_excludes_every_shift_that_day() {
        let calendar = calendar();
        let date = calendar.dates[0];
        let entries = vec![UnavailabilityEntry {
            worker_id: WorkerId::new("w1"),
            date,
            kind: UnavailabilityKind::Unavailable,
            from_time: None,
            to_time: None,
        }];
        let resolved = resolve(&entries, &calendar);
        let shift_id = calendar.by_date[&date][0];
        assert!(resolved.is_excluded(&WorkerId::new("w1"), shift_id));
    }

    #[test]
    fn non_overlapping_time_range_does_not_exclude() {
        let calendar = calendar();
        let date = calendar.dates[0];
        let entries = vec![UnavailabilityEntry {
            worker_id: WorkerId::new("w1"),
            date,
            kind: UnavailabilityKind::Unavailable,
            from_time: Some(NaiveTime::from_hms_opt(18, 0, 0).unwrap()),
            to_time: Some(NaiveTime::from_hms_opt(22, 0, 0).unwrap()),
        }];
        let resolved = resolve(&entries, &calendar);
        let shift_id = calendar.by_date[&date][0];
        assert!(!resolved.is_excluded(&WorkerId::new("w1"), shift_id));
    }

    #[test]
    fn available_kind_is_ignored_for_exclusion() {
        let calendar = calendar();
        let date = calendar.dates[0];
        let entries = vec![UnavailabilityEntry {
            worker_id: WorkerId::new("w1"),
            date,
            kind: UnavailabilityKind::Available,
            from_time: None,
            to_time: None,
        }];
        let resolved = resolve(&entries, &calendar);
        assert!(resolved.for_worker(&WorkerId::new("w1")).is_none());
    }
}
