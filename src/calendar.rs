//! Calendar Builder (spec §4.1): expands a weekly shift template into
//! concrete dated shift instances across a horizon, and aligns every date
//! to a global week index that stays stable across successive runs.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike, Weekday};

use crate::model::{ConstantShiftTemplate, ShiftId, ShiftInstance, ShiftRequirement, ShiftType};

pub const CONSTANT_SHIFT_NAMES: [&str; 2] = ["KOK", "FM"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateCell {
    Yes,
    Facultative,
    No,
}

/// One row of the weekly shift template: a shift definition plus its
/// yes/facultative/no cell for each of the seven weekdays (index 0 = Monday).
#[derive(Debug, Clone)]
pub struct TemplateRow {
    pub shift_name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub qualification: BTreeSet<u8>,
    pub cells: [TemplateCell; 7],
}

impl TemplateRow {
    fn duration_min(&self) -> u32 {
        let start = self.start_time.num_seconds_from_midnight() as i64;
        let end = self.end_time.num_seconds_from_midnight() as i64;
        let secs = if end <= start { end + 24 * 3600 - start } else { end - start };
        (secs / 60) as u32
    }

    fn is_night(&self) -> bool {
        self.end_time <= self.start_time
    }

    fn is_constant(&self) -> bool {
        CONSTANT_SHIFT_NAMES.contains(&self.shift_name.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeeklyTemplate {
    pub rows: Vec<TemplateRow>,
}

/// Derived indexes over the densified shift set, computed once and
/// immutable for the remainder of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct CalendarIndex {
    pub shifts: Vec<ShiftInstance>,
    pub horizon_weeks: u32,
    pub epoch_monday: NaiveDate,
    pub dates: Vec<NaiveDate>,
    pub by_date: BTreeMap<NaiveDate, Vec<ShiftId>>,
    pub by_week: BTreeMap<u32, Vec<ShiftId>>,
    pub night_by_date: BTreeMap<NaiveDate, Vec<ShiftId>>,
    pub night_by_week: BTreeMap<u32, Vec<ShiftId>>,
}

impl CalendarIndex {
    pub fn shift(&self, id: ShiftId) -> &ShiftInstance {
        &self.shifts[id.index()]
    }

    pub fn duration_of(&self, id: ShiftId) -> u32 {
        self.shift(id).duration_min
    }

    pub fn type_of(&self, id: ShiftId) -> ShiftType {
        self.shift(id).type_letter()
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }
}

fn monday_on_or_before(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday();
    date - Duration::days(offset as i64)
}

fn next_monday_on_or_after(date: NaiveDate) -> NaiveDate {
    if date.weekday() == Weekday::Mon {
        date
    } else {
        let offset = 7 - date.weekday().num_days_from_monday();
        date + Duration::days(offset as i64)
    }
}

/// Builds the horizon's shift instances and derived indexes.
///
/// `prior_dates` are the raw (un-normalised) dates of prior assignments, if
/// any — used only to pick the horizon start date and the global-week
/// epoch; `reference_date` stands in for "today" when no history exists
/// (kept as an explicit parameter rather than a clock read, so the builder
/// stays a pure function of its inputs).
pub fn build(
    template: &WeeklyTemplate,
    horizon_weeks: u32,
    prior_dates: &[NaiveDate],
    reference_date: NaiveDate,
) -> (CalendarIndex, Vec<ConstantShiftTemplate>) {
    let start_date = match prior_dates.iter().max() {
        Some(last) => *last + Duration::days(1),
        None => next_monday_on_or_after(reference_date),
    };
    let epoch_anchor = prior_dates.iter().min().copied().unwrap_or(start_date);
    let epoch_monday = monday_on_or_before(epoch_anchor);

    let constant_catalogue: Vec<ConstantShiftTemplate> = template
        .rows
        .iter()
        .filter(|r| r.is_constant())
        .map(|r| ConstantShiftTemplate {
            name: r.shift_name.clone(),
            start_time: r.start_time,
            end_time: r.end_time,
            duration_min: r.duration_min(),
        })
        .collect();

    let plannable_rows: Vec<&TemplateRow> = template.rows.iter().filter(|r| !r.is_constant()).collect();

    let mut shifts = Vec::new();
    let mut next_id = 0u32;

    for week in 1..=horizon_weeks {
        for day_of_week in 0u8..7 {
            let date = start_date + Duration::days((7 * (week - 1) + day_of_week as u32) as i64);
            for row in &plannable_rows {
                let cell = row.cells[day_of_week as usize];
                let requirement = match cell {
                    TemplateCell::Yes => ShiftRequirement::Mandatory,
                    TemplateCell::Facultative => ShiftRequirement::Facultative,
                    TemplateCell::No => continue,
                };
                let global_week = 1 + (date - epoch_monday).num_days().div_euclid(7);
                let absolute_day = 7 * (week - 1) + day_of_week as u32;
                shifts.push(ShiftInstance {
                    id: ShiftId(next_id),
                    name: row.shift_name.clone(),
                    date,
                    week,
                    global_week,
                    day_of_week,
                    absolute_day,
                    start_time: row.start_time,
                    end_time: row.end_time,
                    duration_min: row.duration_min(),
                    qualification: row.qualification.clone(),
                    is_night: row.is_night(),
                    requirement,
                });
                next_id += 1;
            }
        }
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<ShiftId>> = BTreeMap::new();
    let mut by_week: BTreeMap<u32, Vec<ShiftId>> = BTreeMap::new();
    let mut night_by_date: BTreeMap<NaiveDate, Vec<ShiftId>> = BTreeMap::new();
    let mut night_by_week: BTreeMap<u32, Vec<ShiftId>> = BTreeMap::new();
    for s in &shifts {
        by_date.entry(s.date).or_default().push(s.id);
        by_week.entry(s.week).or_default().push(s.id);
        if s.is_night {
            night_by_date.entry(s.date).or_default().push(s.id);
            night_by_week.entry(s.week).or_default().push(s.id);
        }
    }
    let dates: Vec<NaiveDate> = by_date.keys().copied().collect();

    let index = CalendarIndex {
        shifts,
        horizon_weeks,
        epoch_monday,
        dates,
        by_date,
        by_week,
        night_by_date,
        night_by_week,
    };
    (index, constant_catalogue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, start: (u32, u32), end: (u32, u32), yes_on: &[usize]) -> TemplateRow {
        let mut cells = [TemplateCell::No; 7];
        for &d in yes_on {
            cells[d] = TemplateCell::Yes;
        }
        TemplateRow {
            shift_name: name.into(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            qualification: BTreeSet::from([3]),
            cells,
        }
    }

    #[test]
    fn single_week_single_day_shift() {
        let template = WeeklyTemplate {
            rows: vec![row("D1", (8, 0), (16, 0), &[0])],
        };
        let reference = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(); // a Monday
        let (idx, catalogue) = build(&template, 1, &[], reference);
        assert!(catalogue.is_empty());
        assert_eq!(idx.shifts.len(), 1);
        assert_eq!(idx.shifts[0].date, reference);
        assert_eq!(idx.shifts[0].absolute_day, 0);
        assert!(!idx.shifts[0].is_night);
    }

    #[test]
    fn night_shift_crosses_midnight() {
        let template = WeeklyTemplate {
            rows: vec![row("N", (22, 0), (7, 0), &[0, 1, 2, 3, 4, 5, 6])],
        };
        let reference = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let (idx, _) = build(&template, 1, &[], reference);
        assert!(idx.shifts.iter().all(|s| s.is_night));
        assert_eq!(idx.shifts[0].duration_min, 9 * 60);
    }

    #[test]
    fn constant_catalogue_is_extracted_and_never_a_decision_variable() {
        let template = WeeklyTemplate {
            rows: vec![
                row("D1", (8, 0), (16, 0), &[0]),
                row("KOK", (7, 0), (15, 0), &[0, 1, 2, 3, 4]),
            ],
        };
        let reference = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let (idx, catalogue) = build(&template, 1, &[], reference);
        assert_eq!(catalogue.len(), 1);
        assert_eq!(catalogue[0].name, "KOK");
        assert!(idx.shifts.iter().all(|s| s.name != "KOK"));
    }

    #[test]
    fn start_date_follows_last_prior_date() {
        let template = WeeklyTemplate {
            rows: vec![row("D1", (8, 0), (16, 0), &[0, 1, 2, 3, 4, 5, 6])],
        };
        let prior_last = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(); // Friday
        let reference = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let (idx, _) = build(&template, 1, &[prior_last], reference);
        assert_eq!(idx.dates[0], prior_last + Duration::days(1));
    }
}
