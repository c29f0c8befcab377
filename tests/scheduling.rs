#![forbid(unsafe_code)]
use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use roster_core::calendar::{self, TemplateCell, TemplateRow, WeeklyTemplate};
use roster_core::model::{DayPreference, NightPolicy, WeekendPreference, Worker, WorkerId};
use roster_core::solver::{AssignmentRow, SolveStatus, SolverConfig};
use roster_core::workers::RawWorker;
use roster_core::{pipeline, validator, ScheduleInputs};

fn reference_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap() // a Monday
}

fn day_template() -> WeeklyTemplate {
    let row = TemplateRow {
        shift_name: "D1".into(),
        start_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        qualification: BTreeSet::from([1]),
        cells: [TemplateCell::Yes; 7],
    };
    WeeklyTemplate { rows: vec![row] }
}

fn worker(id: &str) -> RawWorker {
    RawWorker {
        worker_id: id.into(),
        name: id.into(),
        competency_levels: vec![1],
        hire_date: None,
        termination_date: None,
        birthdate: NaiveDate::from_ymd_opt(1985, 6, 1).unwrap(),
        weekly_contract_hours: 70.0,
        max_days_per_week: 7,
        preferences: String::new(),
        pattern_length: None,
        min_consecutive: None,
        max_consecutive: None,
        min_rest_after_block: None,
        night_policy: NightPolicy::Allowed,
        weekend_preference: WeekendPreference::NoPreference,
        do_not_schedule: false,
        personal_rules: Vec::new(),
    }
}

#[test]
fn single_qualified_worker_covers_every_day_shift() {
    let template = day_template();
    let raw_workers = vec![worker("w1")];
    let inputs = ScheduleInputs {
        template: &template,
        horizon_weeks: 1,
        reference_date: reference_monday(),
        raw_prior_assignments: &[],
        raw_workers: &raw_workers,
        constant_schedule_rows: &[],
        unavailability: &[],
        solver_config: SolverConfig { time_limit: Duration::from_secs(10), ..SolverConfig::default() },
    };

    let output = pipeline::schedule(inputs).expect("pipeline should not error on well-formed input");

    assert!(output.result.report.status.is_success());
    assert!(output.result.uncovered.is_empty());
    assert!(output.violations.is_empty(), "unexpected violations: {:?}", output.violations);
    assert_eq!(output.result.assignments.len(), 7);
    assert!(output.result.assignments.iter().all(|a| a.shift_filled));
}

#[test]
fn do_not_schedule_flag_leaves_shifts_uncovered_but_feasible() {
    let template = day_template();
    let mut w = worker("w1");
    w.do_not_schedule = true;
    let raw_workers = vec![w];
    let inputs = ScheduleInputs {
        template: &template,
        horizon_weeks: 1,
        reference_date: reference_monday(),
        raw_prior_assignments: &[],
        raw_workers: &raw_workers,
        constant_schedule_rows: &[],
        unavailability: &[],
        solver_config: SolverConfig { time_limit: Duration::from_secs(10), ..SolverConfig::default() },
    };

    let output = pipeline::schedule(inputs).expect("a fully excluded pool is still feasible via the uncovered flag");

    assert!(output.result.report.status.is_success());
    assert_eq!(output.result.uncovered.len(), 7);
    assert!(output.workers.is_empty(), "do-not-schedule worker must not reach the model at all");
}

#[test]
fn qualification_mismatch_excludes_worker_from_eligible_pool() {
    let template = day_template();
    let mut w = worker("w1");
    w.competency_levels = vec![3]; // lower competency code == higher skill; 3 cannot cover a level-1 requirement
    let raw_workers = vec![w];
    let inputs = ScheduleInputs {
        template: &template,
        horizon_weeks: 1,
        reference_date: reference_monday(),
        raw_prior_assignments: &[],
        raw_workers: &raw_workers,
        constant_schedule_rows: &[],
        unavailability: &[],
        solver_config: SolverConfig { time_limit: Duration::from_secs(10), ..SolverConfig::default() },
    };

    let output = pipeline::schedule(inputs).unwrap();
    assert_eq!(output.result.uncovered.len(), 7);
}

fn synthetic_calendar_and_worker(horizon_weeks: u32) -> (roster_core::CalendarIndex, Worker) {
    let template = day_template();
    let (calendar, _) = calendar::build(&template, horizon_weeks, &[], reference_monday());
    let w = Worker {
        id: WorkerId::new("w1"),
        name: "w1".into(),
        hire_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        termination_date: NaiveDate::from_ymd_opt(9999, 12, 31).unwrap(),
        birthdate: NaiveDate::from_ymd_opt(1985, 6, 1).unwrap(),
        contract_minutes: 100_000,
        max_days_per_week: 5,
        age: 40,
        qualification: BTreeSet::from([1]),
        night_policy: NightPolicy::Allowed,
        weekend_preference: WeekendPreference::NoPreference,
        pattern_length: None,
        day_preference: DayPreference::default(),
        min_consecutive: None,
        max_consecutive: None,
        min_rest_after_block: None,
        do_not_schedule: false,
        personal_rules: Vec::new(),
    };
    (calendar, w)
}

#[test]
fn validator_flags_weekly_cap_overrun_independently_of_the_model_builder() {
    let (calendar, worker) = synthetic_calendar_and_worker(2);
    let history = roster_core::HistoryIndex::default();
    let exclusions = roster_core::ExclusionSet::default();

    // worker.max_days_per_week == 5, but the synthetic week is all 7 days;
    // week 2's shifts are left out of the table entirely, so coverage trips too.
    let assignments: Vec<AssignmentRow> = calendar
        .shifts
        .iter()
        .filter(|s| s.week == 1)
        .map(|s| AssignmentRow { shift_id: s.id, worker_id: Some(worker.id.clone()), shift_filled: true })
        .collect();

    let violations = validator::validate(&calendar, std::slice::from_ref(&worker), &history, &exclusions, &assignments);
    assert!(violations.iter().any(|v| v.starts_with("C1")), "week-2 shifts missing from the table should trip coverage: {violations:?}");
    assert!(violations.iter().any(|v| v.starts_with("C4")), "week of 7 shifts should trip the weekly cap: {violations:?}");
}

#[test]
fn validator_accepts_a_clean_full_coverage_assignment() {
    let (calendar, worker) = synthetic_calendar_and_worker(1);
    let history = roster_core::HistoryIndex::default();
    let exclusions = roster_core::ExclusionSet::default();

    // max_days_per_week == 5 but the single week has 7 mandatory shifts, so
    // a clean assignment must split coverage across two workers.
    let mut worker_b = worker.clone();
    worker_b.id = WorkerId::new("w2");

    let assignments: Vec<AssignmentRow> = calendar
        .shifts
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let id = if i < 5 { worker.id.clone() } else { worker_b.id.clone() };
            AssignmentRow { shift_id: s.id, worker_id: Some(id), shift_filled: true }
        })
        .collect();

    let violations = validator::validate(&calendar, &[worker, worker_b], &history, &exclusions, &assignments);
    assert!(violations.is_empty(), "expected a clean assignment, got: {violations:?}");
}
