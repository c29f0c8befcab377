//! Validator (spec §4.8): independently re-checks C1–C6 and the four C7
//! night rules against a produced assignment table. Deliberately
//! re-derived from the raw assignment rows rather than sharing code with
//! the Model Builder, so a bug in one does not silently survive in both.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};

use crate::calendar::CalendarIndex;
use crate::history::HistoryIndex;
use crate::model::{NightPolicy, ShiftId, Worker, WorkerId};
use crate::solver::AssignmentRow;
use crate::unavailability::ExclusionSet;

pub fn validate(
    calendar: &CalendarIndex,
    workers: &[Worker],
    history: &HistoryIndex,
    exclusions: &ExclusionSet,
    assignments: &[AssignmentRow],
) -> Vec<String> {
    let mut violations = Vec::new();

    let mut by_worker_date: HashMap<&WorkerId, HashMap<NaiveDate, Vec<ShiftId>>> = HashMap::new();
    for row in assignments {
        let Some(worker_id) = &row.worker_id else { continue };
        let date = calendar.shift(row.shift_id).date;
        by_worker_date.entry(worker_id).or_default().entry(date).or_default().push(row.shift_id);
    }

    check_coverage(calendar, assignments, &mut violations);
    check_one_per_day(&by_worker_date, &mut violations);
    check_rest_after_night(calendar, &by_worker_date, &mut violations);
    check_weekly_cap(calendar, workers, &by_worker_date, &mut violations);
    check_contract_budget(calendar, workers, &by_worker_date, &mut violations);
    check_exclusions(exclusions, &by_worker_date, &mut violations);
    check_night_rules(calendar, history, workers, &by_worker_date, &mut violations);

    violations
}

fn check_coverage(calendar: &CalendarIndex, assignments: &[AssignmentRow], violations: &mut Vec<String>) {
    let mut seen: HashSet<ShiftId> = HashSet::new();
    for row in assignments {
        if !seen.insert(row.shift_id) {
            violations.push(format!("C1: shift {:?} appears more than once in the assignment table", row.shift_id));
        }
        if row.worker_id.is_some() != row.shift_filled {
            violations.push(format!("C1: shift {:?} has inconsistent shift_filled flag", row.shift_id));
        }
    }
    if seen.len() != calendar.len() {
        violations.push("C1: assignment table does not cover every shift exactly once".into());
    }
}

fn check_one_per_day(by_worker_date: &HashMap<&WorkerId, HashMap<NaiveDate, Vec<ShiftId>>>, violations: &mut Vec<String>) {
    for (worker, dates) in by_worker_date {
        for (date, shifts) in dates {
            if shifts.len() > 1 {
                violations.push(format!("C2: worker {worker} holds {} shifts on {date}", shifts.len()));
            }
        }
    }
}

fn check_rest_after_night(calendar: &CalendarIndex, by_worker_date: &HashMap<&WorkerId, HashMap<NaiveDate, Vec<ShiftId>>>, violations: &mut Vec<String>) {
    for (worker, dates) in by_worker_date {
        for (&date, shifts) in dates {
            let worked_night = shifts.iter().any(|s| calendar.shift(*s).is_night);
            if !worked_night {
                continue;
            }
            let next = date + Duration::days(1);
            let Some(next_shifts) = dates.get(&next) else { continue };
            if next_shifts.iter().any(|s| !calendar.shift(*s).is_night) {
                violations.push(format!("C3: worker {worker} has a non-night shift on {next} after a night shift on {date}"));
            }
        }
    }
}

fn check_weekly_cap(calendar: &CalendarIndex, workers: &[Worker], by_worker_date: &HashMap<&WorkerId, HashMap<NaiveDate, Vec<ShiftId>>>, violations: &mut Vec<String>) {
    for worker in workers {
        let Some(dates) = by_worker_date.get(&worker.id) else { continue };
        let mut per_week: HashMap<u32, u32> = HashMap::new();
        for (_date, shifts) in dates {
            for s in shifts {
                *per_week.entry(calendar.shift(*s).week).or_default() += 1;
            }
        }
        for (week, count) in per_week {
            if count > worker.max_days_per_week {
                violations.push(format!("C4: worker {} has {count} shifts in week {week} (cap {})", worker.id, worker.max_days_per_week));
            }
        }
    }
}

fn check_contract_budget(calendar: &CalendarIndex, workers: &[Worker], by_worker_date: &HashMap<&WorkerId, HashMap<NaiveDate, Vec<ShiftId>>>, violations: &mut Vec<String>) {
    for worker in workers {
        let Some(dates) = by_worker_date.get(&worker.id) else { continue };
        let minutes: u32 = dates.values().flatten().map(|s| calendar.shift(*s).duration_min).sum();
        let budget = worker.contract_minutes * calendar.horizon_weeks;
        if minutes > budget {
            violations.push(format!("C5: worker {} worked {minutes} min against a budget of {budget} min", worker.id));
        }
    }
}

fn check_exclusions(exclusions: &ExclusionSet, by_worker_date: &HashMap<&WorkerId, HashMap<NaiveDate, Vec<ShiftId>>>, violations: &mut Vec<String>) {
    for (worker, dates) in by_worker_date {
        for shifts in dates.values() {
            for s in shifts {
                if exclusions.is_excluded(worker, *s) {
                    violations.push(format!("C6: worker {worker} is assigned excluded shift {s:?}"));
                }
            }
        }
    }
}

fn check_night_rules(
    calendar: &CalendarIndex,
    history: &HistoryIndex,
    workers: &[Worker],
    by_worker_date: &HashMap<&WorkerId, HashMap<NaiveDate, Vec<ShiftId>>>,
    violations: &mut Vec<String>,
) {
    let first_global_week = calendar.shifts.first().map(|s| s.global_week).unwrap_or(1);
    for worker in workers {
        let nights_by_date: HashMap<NaiveDate, bool> = calendar
            .dates
            .iter()
            .map(|&d| {
                let worked_night = by_worker_date
                    .get(&worker.id)
                    .and_then(|dates| dates.get(&d))
                    .is_some_and(|shifts| shifts.iter().any(|s| calendar.shift(*s).is_night));
                (d, worked_night)
            })
            .collect();

        let cap: usize = if worker.night_policy != NightPolicy::Forbidden { 7 } else { 5 };
        let tail = history.worker(&worker.id).tail_night_block as usize;
        let dates = &calendar.dates;
        if dates.len() >= cap + 1 {
            for start in 0..=(dates.len() - (cap + 1)) {
                let window = &dates[start..start + cap + 1];
                let worked = window.iter().filter(|d| nights_by_date[d]).count();
                let offset = tail.saturating_sub(start).min(cap);
                if worked + offset > cap {
                    violations.push(format!("C7.1: worker {} exceeds {cap} consecutive nights around {}", worker.id, window[0]));
                }
            }
        }

        if tail >= 3 {
            for offset in 0..2 {
                if let Some(&d) = dates.get(offset) {
                    if by_worker_date.get(&worker.id).and_then(|m| m.get(&d)).is_some_and(|s| !s.is_empty()) {
                        violations.push(format!("C7.2: worker {} assigned on {d}, within rest window of a pre-horizon night block", worker.id));
                    }
                }
            }
        }
        if dates.len() >= 3 {
            for start in 0..=(dates.len() - 3) {
                let block = nights_by_date[&dates[start]] && nights_by_date[&dates[start + 1]] && nights_by_date[&dates[start + 2]];
                if !block {
                    continue;
                }
                for rest_offset in [3usize, 4] {
                    if let Some(&d) = dates.get(start + rest_offset) {
                        if by_worker_date.get(&worker.id).and_then(|m| m.get(&d)).is_some_and(|s| !s.is_empty()) {
                            violations.push(format!("C7.2: worker {} assigned on {d}, within 46h rest of a night block ending {}", worker.id, dates[start + 2]));
                        }
                    }
                }
            }
        }

        for week in 1..=calendar.horizon_weeks {
            let window_hi = (week + 12).min(calendar.horizon_weeks);
            let worked: usize = (week..=window_hi)
                .flat_map(|w| calendar.by_week.get(&w).cloned().unwrap_or_default())
                .filter(|s| calendar.shift(*s).is_night)
                .filter(|s| {
                    let d = calendar.shift(*s).date;
                    nights_by_date.get(&d).copied().unwrap_or(false)
                })
                .count();
            let global_lo = first_global_week + (week as i64 - 1);
            let global_hi = global_lo + 12;
            let prior = history.nights_in_global_week_range(&worker.id, global_lo, global_hi);
            if worked as i32 + prior > 35 {
                violations.push(format!("C7.3: worker {} exceeds 35 nights in the 13-week window starting week {week}", worker.id));
            }
        }

        if worker.age >= 55 && worker.night_policy == NightPolicy::Forbidden && nights_by_date.values().any(|&v| v) {
            violations.push(format!("C7.4: worker {} is aged 55+ with night_policy=forbidden but has night assignments", worker.id));
        }
    }
}
