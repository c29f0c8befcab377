//! History Normaliser (spec §4.2): canonicalises prior assignments into the
//! horizon's dated/indexed form and computes the per-worker tail summaries
//! the Model Builder needs for continuity across the horizon boundary.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::calendar::CalendarIndex;
use crate::model::{PriorAssignment, WorkerId};

/// Raw, pre-normalisation prior-assignment row, per §6 external input
/// columns (`worker_id, date, shift-name, start-time, end-time`).
#[derive(Debug, Clone)]
pub struct RawPriorAssignment {
    pub worker_id: String,
    pub date: NaiveDate,
    pub shift_name: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Default)]
pub struct WorkerHistory {
    pub tail_workday_block: u32,
    pub tail_night_block: u32,
    pub worked_last_weekend: bool,
    pub last_worked_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryIndex {
    pub by_date: BTreeMap<NaiveDate, Vec<PriorAssignment>>,
    worker_histories: HashMap<WorkerId, WorkerHistory>,
    /// True when no prior assignments were supplied and a blank pseudo-history
    /// was fabricated so downstream code sees a uniform shape.
    pub fabricated: bool,
}

impl HistoryIndex {
    pub fn worker(&self, id: &WorkerId) -> WorkerHistory {
        self.worker_histories.get(id).cloned().unwrap_or_default()
    }

    /// Count of nights a worker worked whose `global_week` falls in
    /// `[lo, hi]` (inclusive), used by C7.3's rolling 13-week cap to fold
    /// in pre-horizon nights.
    pub fn nights_in_global_week_range(&self, worker: &WorkerId, lo: i64, hi: i64) -> i32 {
        self.by_date
            .values()
            .flatten()
            .filter(|a| a.is_night && a.global_week >= lo && a.global_week <= hi)
            .filter(|a| a.worker_id.as_ref() == Some(worker))
            .count() as i32
    }
}

/// Dates (Mon..Sun) of the calendar week immediately preceding `horizon_start`.
fn preceding_week_range(horizon_start: NaiveDate) -> (NaiveDate, NaiveDate) {
    use chrono::Datelike;
    let offset = horizon_start.weekday().num_days_from_monday() as i64;
    let this_monday = horizon_start - Duration::days(offset);
    let prior_monday = this_monday - Duration::days(7);
    (prior_monday, prior_monday + Duration::days(6))
}

pub fn normalise(raw: &[RawPriorAssignment], calendar: &CalendarIndex) -> HistoryIndex {
    if raw.is_empty() || calendar.dates.is_empty() {
        return HistoryIndex {
            by_date: BTreeMap::new(),
            worker_histories: HashMap::new(),
            fabricated: true,
        };
    }

    let horizon_start = calendar.dates[0];
    let mut by_date: BTreeMap<NaiveDate, Vec<PriorAssignment>> = BTreeMap::new();
    let mut worked_dates: HashMap<WorkerId, BTreeSet<NaiveDate>> = HashMap::new();
    let mut worked_nights: HashMap<WorkerId, BTreeSet<NaiveDate>> = HashMap::new();

    for r in raw {
        let is_night = matches!((r.start_time, r.end_time), (Some(s), Some(e)) if e <= s);
        let global_week = 1 + (r.date - calendar.epoch_monday).num_days().div_euclid(7);
        let week = global_week - (calendar.shifts.first().map(|s| s.global_week).unwrap_or(global_week) - 1);
        let worker_id = WorkerId::new(&r.worker_id);
        by_date.entry(r.date).or_default().push(PriorAssignment {
            worker_id: Some(worker_id.clone()),
            date: r.date,
            shift_id: None,
            is_night,
            week,
            global_week,
        });
        worked_dates.entry(worker_id.clone()).or_default().insert(r.date);
        if is_night {
            worked_nights.entry(worker_id).or_default().insert(r.date);
        }
    }

    let (prior_mon, prior_sun_week_sat) = preceding_week_range(horizon_start);
    let weekend_dates = [prior_mon + Duration::days(5), prior_sun_week_sat];

    let mut worker_histories = HashMap::new();
    for (worker_id, dates) in &worked_dates {
        let tail_workday_block = consecutive_tail(dates, horizon_start);
        let nights = worked_nights.get(worker_id).cloned().unwrap_or_default();
        let tail_night_block = consecutive_tail(&nights, horizon_start);
        let worked_last_weekend = weekend_dates.iter().any(|d| dates.contains(d));
        let last_worked_date = dates.iter().max().copied();
        worker_histories.insert(
            worker_id.clone(),
            WorkerHistory {
                tail_workday_block,
                tail_night_block,
                worked_last_weekend,
                last_worked_date,
            },
        );
    }

    HistoryIndex {
        by_date,
        worker_histories,
        fabricated: false,
    }
}

/// Length of the suffix of consecutive calendar days, ending at
/// `horizon_start - 1`, present in `dates`.
fn consecutive_tail(dates: &BTreeSet<NaiveDate>, horizon_start: NaiveDate) -> u32 {
    let mut len = 0u32;
    let mut cursor = horizon_start - Duration::days(1);
    while dates.contains(&cursor) {
        len += 1;
        cursor -= Duration::days(1);
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{build, TemplateRow, WeeklyTemplate};
    use std::collections::BTreeSet as Set;

    fn minimal_calendar(horizon_start: NaiveDate) -> CalendarIndex {
        let row = TemplateRow {
            shift_name: "D1".into(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            qualification: Set::from([3]),
            cells: [crate::calendar::TemplateCell::Yes; 7],
        };
        let template = WeeklyTemplate { rows: vec![row] };
        let (idx, _) = build(&template, 1, &[], horizon_start);
        idx
    }

    #[test]
    fn blank_history_is_fabricated_when_absent() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let calendar = minimal_calendar(start);
        let history = normalise(&[], &calendar);
        assert!(history.fabricated);
        assert_eq!(history.worker(&WorkerId::new("nobody")).tail_workday_block, 0);
    }

    #[test]
    fn tail_workday_block_counts_consecutive_suffix() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(); // Monday
        let calendar = minimal_calendar(start);
        let raw = vec![
            RawPriorAssignment {
                worker_id: "w1".into(),
                date: start - Duration::days(1),
                shift_name: Some("D1".into()),
                start_time: Some(NaiveTime::from_hms_opt(8, 0, 0).unwrap()),
                end_time: Some(NaiveTime::from_hms_opt(16, 0, 0).unwrap()),
            },
            RawPriorAssignment {
                worker_id: "w1".into(),
                date: start - Duration::days(2),
                shift_name: Some("D1".into()),
                start_time: Some(NaiveTime::from_hms_opt(8, 0, 0).unwrap()),
                end_time: Some(NaiveTime::from_hms_opt(16, 0, 0).unwrap()),
            },
            RawPriorAssignment {
                worker_id: "w1".into(),
                date: start - Duration::days(4), // gap at day -3
                shift_name: Some("D1".into()),
                start_time: Some(NaiveTime::from_hms_opt(8, 0, 0).unwrap()),
                end_time: Some(NaiveTime::from_hms_opt(16, 0, 0).unwrap()),
            },
        ];
        let history = normalise(&raw, &calendar);
        let id = WorkerId::new("w1");
        assert_eq!(history.worker(&id).tail_workday_block, 2);
    }
}
