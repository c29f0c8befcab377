//! Constant Schedule Integrator (spec §4.4): folds fixed recurring
//! assignments ("KOK", "FM") into hard unavailabilities on all other
//! shifts of the same day, and deducts their minutes from the worker's
//! contract budget. The constant catalogue itself is never a decision
//! variable.

use chrono::{Duration, NaiveDate};

use crate::model::{ConstantShiftTemplate, UnavailabilityEntry, UnavailabilityKind, Worker, WorkerId};

/// Raw constant-schedule row, per §6 (`worker_id, weekday, week-within-cycle,
/// shift-name`).
#[derive(Debug, Clone)]
pub struct ConstantScheduleRow {
    pub worker_id: String,
    pub week_index: u32,
    pub weekday: Weekday7,
    pub shift_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weekday7 {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday7 {
    fn offset(self) -> i64 {
        match self {
            Weekday7::Monday => 0,
            Weekday7::Tuesday => 1,
            Weekday7::Wednesday => 2,
            Weekday7::Thursday => 3,
            Weekday7::Friday => 4,
            Weekday7::Saturday => 5,
            Weekday7::Sunday => 6,
        }
    }
}

/// Applies the constant schedule against the normalised worker pool, and
/// returns one full-day `ConstantSchedule` unavailability entry per row.
///
/// `horizon_start` anchors `week_index` (1-based, within the current
/// horizon) to a concrete date.
pub fn integrate(
    rows: &[ConstantScheduleRow],
    catalogue: &[ConstantShiftTemplate],
    workers: &mut [Worker],
    horizon_start: NaiveDate,
) -> Vec<UnavailabilityEntry> {
    let mut out = Vec::new();
    for row in rows {
        let Some(template) = catalogue.iter().find(|c| c.name == row.shift_name) else {
            continue;
        };
        let date = horizon_start
            + Duration::days(7 * (row.week_index.saturating_sub(1)) as i64 + row.weekday.offset());
        let worker_id = WorkerId::new(&row.worker_id);
        if let Some(worker) = workers.iter_mut().find(|w| w.id == worker_id) {
            worker.contract_minutes = worker.contract_minutes.saturating_sub(template.duration_min);
        }
        out.push(UnavailabilityEntry {
            worker_id,
            date,
            kind: UnavailabilityKind::ConstantSchedule,
            from_time: None,
            to_time: None,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DayPreference, NightPolicy, WeekendPreference};
    use chrono::NaiveTime;
    use std::collections::BTreeSet;

    fn worker(id: &str, contract_minutes: u32) -> Worker {
        Worker {
            id: WorkerId::new(id),
            name: id.into(),
            hire_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            termination_date: NaiveDate::from_ymd_opt(9999, 12, 31).unwrap(),
            birthdate: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            contract_minutes,
            max_days_per_week: 5,
            age: 35,
            qualification: BTreeSet::from([3]),
            night_policy: NightPolicy::Allowed,
            weekend_preference: WeekendPreference::NoPreference,
            pattern_length: None,
            day_preference: DayPreference::default(),
            min_consecutive: None,
            max_consecutive: None,
            min_rest_after_block: None,
            do_not_schedule: false,
            personal_rules: Vec::new(),
        }
    }

    #[test]
    fn deducts_duration_from_contract_minutes() {
        let catalogue = vec![ConstantShiftTemplate {
            name: "KOK".into(),
            start_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            duration_min: 480,
        }];
        let mut workers = vec![worker("w1", 2160)];
        let rows = vec![ConstantScheduleRow {
            worker_id: "w1".into(),
            week_index: 1,
            weekday: Weekday7::Monday,
            shift_name: "KOK".into(),
        }];
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let entries = integrate(&rows, &catalogue, &mut workers, start);
        assert_eq!(workers[0].contract_minutes, 2160 - 480);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].date, start);
        assert_eq!(entries[0].kind, UnavailabilityKind::ConstantSchedule);
    }
}
