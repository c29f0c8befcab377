//! Declares every decision and derived variable of §4.6.1, and the static
//! eligibility filter that folds C6/C8/C9/much of C10 directly into the
//! variable's domain rather than into a separate constraint (mirrors the
//! fixed-zero `create_work_variable` pattern from the grounding sample:
//! an assignment that is structurally impossible is `int(0,0)`, not a
//! free boolean plus an `== 0` constraint).

use chrono::NaiveDate;

use crate::calendar::CalendarIndex;
use crate::cp::CpModel;
use crate::model::{NightPolicy, PersonalRule, ShiftInstance, ShiftType, Worker};
use crate::unavailability::ExclusionSet;

use super::types::ModelVars;

fn forbidden_by_night_policy(worker: &Worker, shift: &ShiftInstance) -> bool {
    match worker.night_policy {
        NightPolicy::Forbidden => shift.is_night,
        NightPolicy::Only => !shift.is_night,
        NightPolicy::Other | NightPolicy::Allowed => false,
    }
}

fn forbidden_by_personal_rule(rule: &PersonalRule, shift: &ShiftInstance) -> bool {
    match rule {
        PersonalRule::NightsOnly | PersonalRule::SevenOnSevenOffNights => !shift.is_night,
        PersonalRule::WeekendOnly => !shift.is_weekend(),
        PersonalRule::FridayEveningOrWeekend => {
            let friday_evening = shift.day_of_week == 4 && shift.type_letter() == ShiftType::Evening;
            !(friday_evening || shift.is_weekend())
        }
        PersonalRule::ForbiddenWeekdays(days) => days.contains(&shift.day_of_week),
        PersonalRule::MaxThreePerWeekEveningOrNightOnly => {
            !matches!(shift.type_letter(), ShiftType::Evening | ShiftType::Night)
        }
        PersonalRule::MaxTwoInRowWithTwoOff => false,
    }
}

fn qualification_forbids(worker: &Worker, shift: &ShiftInstance) -> bool {
    match (worker.qualification_level(), shift.required_level()) {
        (Some(lvl), Some(req)) => lvl > req,
        // A worker or shift with no qualification data can never be matched.
        _ => true,
    }
}

fn is_statically_ineligible(worker: &Worker, shift: &ShiftInstance, excluded: bool) -> bool {
    excluded
        || qualification_forbids(worker, shift)
        || forbidden_by_night_policy(worker, shift)
        || worker.personal_rules.iter().any(|r| forbidden_by_personal_rule(r, shift))
}

pub fn declare(cp: &mut CpModel, calendar: &CalendarIndex, workers: &[Worker], exclusions: &ExclusionSet) -> ModelVars {
    let worker_ids = workers.iter().map(|w| w.id.clone()).collect::<Vec<_>>();

    let mut x = std::collections::HashMap::new();
    for shift in &calendar.shifts {
        for (ei, worker) in workers.iter().enumerate() {
            let excluded = exclusions.is_excluded(&worker.id, shift.id);
            let var = if is_statically_ineligible(worker, shift, excluded) {
                cp.const_var(0)
            } else {
                cp.bool_var()
            };
            x.insert((shift.id, ei), var);
        }
    }

    let mut u = std::collections::HashMap::new();
    for shift in &calendar.shifts {
        u.insert(shift.id, cp.bool_var());
    }

    let dates: Vec<NaiveDate> = calendar.dates.clone();
    let mut w = std::collections::HashMap::new();
    let mut n = std::collections::HashMap::new();
    for (ei, _worker) in workers.iter().enumerate() {
        for &date in &dates {
            let day_shifts = calendar.by_date.get(&date).cloned().unwrap_or_default();
            let day_lits: Vec<_> = day_shifts.iter().map(|s| x[&(*s, ei)]).collect();
            w.insert((ei, date), cp.reify_any(&day_lits));

            let night_shifts = calendar.night_by_date.get(&date).cloned().unwrap_or_default();
            let night_lits: Vec<_> = night_shifts.iter().map(|s| x[&(*s, ei)]).collect();
            n.insert((ei, date), cp.reify_any(&night_lits));
        }
    }

    let mut ww = std::collections::HashMap::new();
    for (ei, _worker) in workers.iter().enumerate() {
        for week in 1..=calendar.horizon_weeks {
            let week_shifts = calendar.by_week.get(&week).cloned().unwrap_or_default();
            let weekend_lits: Vec<_> = week_shifts
                .iter()
                .filter(|s| calendar.shift(**s).is_weekend())
                .map(|s| x[&(*s, ei)])
                .collect();
            ww.insert((ei, week), cp.reify_any(&weekend_lits));
        }
    }

    let types = [ShiftType::Day, ShiftType::Evening, ShiftType::Night, ShiftType::Other];
    let mut count = std::collections::HashMap::new();
    let mut total = std::collections::HashMap::new();
    let mut maxc = std::collections::HashMap::new();
    for (ei, _worker) in workers.iter().enumerate() {
        let mut dan_terms = Vec::new();
        for &t in &types {
            let terms: Vec<_> = calendar
                .shifts
                .iter()
                .filter(|s| s.type_letter() == t)
                .map(|s| x[&(s.id, ei)])
                .collect();
            let c = cp.sum(&terms);
            count.insert((ei, t), c);
            if t != ShiftType::Other {
                dan_terms.push(c);
            }
        }
        // total[e] = Σ over D/A/N only (spec §4.6.1); `Other`-type shifts
        // never enter `maxc[e]` either, so this keeps the two comparable.
        total.insert(ei, cp.sum(&dan_terms));
        maxc.insert(ei, cp.max_eq(&dan_terms));
    }

    ModelVars {
        x,
        u,
        n,
        w,
        ww,
        count,
        total,
        maxc,
        objective_terms: Vec::new(),
        worker_ids,
    }
}
