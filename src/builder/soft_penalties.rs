//! Soft penalties P1–P10 (spec §4.6.3). Every term is pre-scaled by
//! `OBJECTIVE_SCALE` so the spec's fractional weights become integers,
//! and pushed onto `vars.objective_terms`; `mod.rs` sums them once at
//! the end.

use crate::calendar::CalendarIndex;
use crate::cp::CpModel;
use crate::error::{Result, RosterError};
use crate::history::HistoryIndex;
use crate::model::{NightPolicy, PersonalRule, UnavailabilityEntry, UnavailabilityKind, Worker};

use super::types::{Big, ModelVars, OBJECTIVE_SCALE};

fn weight(w: f64) -> i32 {
    (w * OBJECTIVE_SCALE as f64).round() as i32
}

/// P1: uncovered shifts, factor 0.5 for `D4`/`A3`.
pub fn uncovered_shifts(cp: &mut CpModel, calendar: &CalendarIndex, vars: &mut ModelVars) {
    for shift in &calendar.shifts {
        let factor = if shift.name == "D4" || shift.name == "A3" { 0.5 } else { 1.0 };
        let term = cp.scale(vars.u[&shift.id], weight(10.0 * factor));
        vars.objective_terms.push(term);
    }
}

/// P2/P3: squared under-coverage below the worker's horizon-wide budget,
/// weighted differently for weekend-preference workers.
///
/// `under`'s domain is bounded by `cap_n`, but `mul_eq(under, under)` gives
/// the squared term a domain bound of `cap_n^2` — checked against
/// `i32::MAX` up front (decision 3, DESIGN.md) rather than left to overflow
/// inside the CP backend's own `i32` domains.
pub fn under_coverage(cp: &mut CpModel, calendar: &CalendarIndex, vars: &mut ModelVars, workers: &[Worker]) -> Result<()> {
    for (ei, worker) in workers.iter().enumerate() {
        let cap_n = (worker.contract_minutes as i64 * calendar.horizon_weeks as i64).min(i32::MAX as i64) as i32;
        if (cap_n as i64) * (cap_n as i64) > i32::MAX as i64 {
            return Err(RosterError::ModelTooLarge(format!(
                "worker {}'s horizon-wide contract budget of {cap_n} minutes would overflow the squared P2/P3 under-coverage penalty",
                worker.id
            )));
        }
        let minute_terms: Vec<_> = calendar
            .shifts
            .iter()
            .map(|s| cp.scale(vars.x[&(s.id, ei)], s.duration_min as i32))
            .collect();
        let worked_minutes = cp.sum(&minute_terms);
        let under = cp.int_var(0, cap_n.max(0));
        cp.sum_ge_const(&[worked_minutes, under], cap_n);
        let sq = cp.mul_eq(under, under);
        let w = if worker.weekend_preference == crate::model::WeekendPreference::PrefersWeekends { 0.001 } else { 0.005 };
        let term = cp.scale(sq, weight(w));
        vars.objective_terms.push(term);
    }
    Ok(())
}

/// P4: consecutive-weekend penalty, plus continuity with the prior
/// roster's last weekend.
pub fn consecutive_weekends(cp: &mut CpModel, calendar: &CalendarIndex, history: &HistoryIndex, vars: &mut ModelVars, workers: &[Worker]) {
    for (ei, worker) in workers.iter().enumerate() {
        if worker.weekend_preference == crate::model::WeekendPreference::PrefersWeekends {
            continue;
        }
        for week in 1..calendar.horizon_weeks {
            let a = vars.ww[&(ei, week)];
            let b = vars.ww[&(ei, week + 1)];
            let both = cp.reify_all(&[a, b]);
            let term = cp.scale(both, weight(5.0));
            vars.objective_terms.push(term);
        }
        if history.worker(&worker.id).worked_last_weekend {
            let first_week_ind = vars.ww[&(ei, 1)];
            let term = cp.scale(first_week_ind, weight(5.0));
            vars.objective_terms.push(term);
        }
    }
}

/// P5: a worked day isolated by non-worked neighbours on both sides,
/// cancelled at horizon start by a worked pre-horizon tail day.
pub fn isolated_shifts(cp: &mut CpModel, calendar: &CalendarIndex, history: &HistoryIndex, vars: &mut ModelVars, workers: &[Worker]) {
    let dates = &calendar.dates;
    for (ei, worker) in workers.iter().enumerate() {
        let tail_continues = history.worker(&worker.id).tail_workday_block > 0;
        for (i, &date) in dates.iter().enumerate() {
            if i == 0 && tail_continues {
                continue;
            }
            let w_d = vars.w[&(ei, date)];
            let not_prev = if i == 0 {
                None
            } else {
                Some(cp.not_bool(vars.w[&(ei, dates[i - 1])]))
            };
            let not_next = dates.get(i + 1).map(|&d| cp.not_bool(vars.w[&(ei, d)]));
            let mut lits = vec![w_d];
            if let Some(p) = not_prev {
                lits.push(p);
            }
            if let Some(nx) = not_next {
                lits.push(nx);
            }
            let isolated = cp.reify_all(&lits);
            let term = cp.scale(isolated, weight(1.0));
            vars.objective_terms.push(term);
        }
    }
}

/// P6: heuristic penalty for working either of the two days right after
/// any night block ends (block length >= 1, unlike the hard C7.2 which
/// only restricts blocks of 3+).
pub fn rest_after_night_block(cp: &mut CpModel, calendar: &CalendarIndex, vars: &mut ModelVars, workers: &[Worker]) {
    let dates = &calendar.dates;
    for (ei, _worker) in workers.iter().enumerate() {
        for (i, &date) in dates.iter().enumerate() {
            let Some(&next) = dates.get(i + 1) else { continue };
            let n_today = vars.n[&(ei, date)];
            let not_n_next = cp.not_bool(vars.n[&(ei, next)]);
            let block_end = cp.reify_all(&[n_today, not_n_next]);

            let mut after_lits = Vec::new();
            if let Some(&d1) = dates.get(i + 1) {
                after_lits.push(vars.w[&(ei, d1)]);
            }
            if let Some(&d2) = dates.get(i + 2) {
                after_lits.push(vars.w[&(ei, d2)]);
            }
            if after_lits.is_empty() {
                continue;
            }
            let worked_after = cp.reify_any(&after_lits);
            let penalty = cp.reify_all(&[block_end, worked_after]);
            let term = cp.scale(penalty, weight(0.5));
            vars.objective_terms.push(term);
        }
    }
}

/// P7: flat penalty when one shift type dominates a worker's assignments
/// (`2*maxc[e] > total[e]`).
pub fn unequal_distribution(cp: &mut CpModel, vars: &mut ModelVars, workers: &[Worker], big: Big) {
    for (ei, _worker) in workers.iter().enumerate() {
        let maxc = vars.maxc[&ei];
        let total = vars.total[&ei];
        let double_maxc = cp.scale(maxc, 2);
        let flag = cp.reify_greater(double_maxc, total, big.0);
        let term = cp.scale(flag, weight(0.1));
        vars.objective_terms.push(term);
    }
}

/// P8: squared weekly-balance deviation, via `dev = dev+ - dev-`
/// decomposed additively. Excludes 7-on/7-off workers (their weekly
/// count is dictated by the phase, not a free choice).
pub fn weekly_balance(cp: &mut CpModel, calendar: &CalendarIndex, vars: &mut ModelVars, workers: &[Worker], big: Big) {
    for (ei, worker) in workers.iter().enumerate() {
        if worker.has_personal_rule(&PersonalRule::SevenOnSevenOffNights) {
            continue;
        }
        let total = vars.total[&ei];
        for week in 1..=calendar.horizon_weeks {
            let shift_ids = calendar.by_week.get(&week).cloned().unwrap_or_default();
            let week_terms: Vec<_> = shift_ids.iter().map(|s| vars.x[&(*s, ei)]).collect();
            let week_total = cp.sum(&week_terms);
            let target = cp.scale(week_total, calendar.horizon_weeks as i32);

            let dev_plus = cp.int_var(0, big.0);
            let dev_minus = cp.int_var(0, big.0);
            let lhs = cp.sum(&[target, dev_minus]);
            let rhs = cp.sum(&[total, dev_plus]);
            cp.eq_var(lhs, rhs);
            let abs_dev = cp.sum(&[dev_plus, dev_minus]);
            let sq = cp.mul_eq(abs_dev, abs_dev);
            let term = cp.scale(sq, weight(0.1));
            vars.objective_terms.push(term);
        }
    }
}

/// P9 (other-night penalty) and P9' (preferred-shift bonus, negative).
pub fn night_policy_other_and_preference_bonus(
    cp: &mut CpModel,
    calendar: &CalendarIndex,
    availability: &[UnavailabilityEntry],
    vars: &mut ModelVars,
    workers: &[Worker],
) {
    for (ei, worker) in workers.iter().enumerate() {
        if worker.night_policy == NightPolicy::Other {
            let nights = vars.count[&(ei, crate::model::ShiftType::Night)];
            let term = cp.scale(nights, weight(1.0));
            vars.objective_terms.push(term);
        }
    }

    for entry in availability {
        if entry.kind != UnavailabilityKind::Available {
            continue;
        }
        let Some(ei) = vars.worker_index(&entry.worker_id) else { continue };
        let Some(shift_ids) = calendar.by_date.get(&entry.date) else { continue };
        for &s in shift_ids {
            let term = cp.scale(vars.x[&(s, ei)], weight(-0.1));
            vars.objective_terms.push(term);
        }
    }
}

/// P10: qualification over-match, a build-time constant per eligible pair.
pub fn qualification_overmatch(cp: &mut CpModel, calendar: &CalendarIndex, vars: &mut ModelVars, workers: &[Worker]) {
    for (ei, worker) in workers.iter().enumerate() {
        let Some(max_q) = worker.qualification_max() else { continue };
        for shift in &calendar.shifts {
            let Some(req) = shift.required_level() else { continue };
            let d = req as i32 - max_q as i32;
            if d == 0 {
                continue;
            }
            let coeff = d * d * weight(0.1);
            if coeff == 0 {
                continue;
            }
            let term = cp.scale(vars.x[&(shift.id, ei)], coeff);
            vars.objective_terms.push(term);
        }
    }
}
