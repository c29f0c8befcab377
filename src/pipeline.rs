//! Pipeline orchestration (spec §2 data flow): wires every component into
//! one `schedule` entry point, in the manner of the teacher's `Scheduler`
//! facade composing its own submodules.

use chrono::NaiveDate;

use crate::builder;
use crate::calendar::{self, WeeklyTemplate};
use crate::constant_schedule::{self, ConstantScheduleRow};
use crate::error::Result;
use crate::history::{self, RawPriorAssignment};
use crate::model::{ConstantShiftTemplate, UnavailabilityEntry, Worker};
use crate::solver::{self, ScheduleResult, SolverConfig};
use crate::unavailability::{self, ExclusionSet};
use crate::validator;
use crate::workers::{self, RawWorker};

pub struct ScheduleInputs<'a> {
    pub template: &'a WeeklyTemplate,
    pub horizon_weeks: u32,
    pub reference_date: NaiveDate,
    pub raw_prior_assignments: &'a [RawPriorAssignment],
    pub raw_workers: &'a [RawWorker],
    pub constant_schedule_rows: &'a [ConstantScheduleRow],
    pub unavailability: &'a [UnavailabilityEntry],
    pub solver_config: SolverConfig,
}

pub struct ScheduleOutput {
    pub calendar: calendar::CalendarIndex,
    pub constant_catalogue: Vec<ConstantShiftTemplate>,
    pub workers: Vec<Worker>,
    pub exclusions: ExclusionSet,
    pub result: ScheduleResult,
    pub violations: Vec<String>,
}

pub fn schedule(inputs: ScheduleInputs) -> Result<ScheduleOutput> {
    let prior_dates: Vec<NaiveDate> = inputs.raw_prior_assignments.iter().map(|r| r.date).collect();
    let (calendar, catalogue) = calendar::build(inputs.template, inputs.horizon_weeks, &prior_dates, inputs.reference_date);
    let history = history::normalise(inputs.raw_prior_assignments, &calendar);

    let horizon_start = calendar.dates.first().copied().unwrap_or(inputs.reference_date);
    let horizon_end = calendar.dates.last().copied().unwrap_or(horizon_start);

    let mut workers = workers::normalise(inputs.raw_workers, horizon_start, horizon_end, inputs.reference_date)?;
    let constant_entries = constant_schedule::integrate(inputs.constant_schedule_rows, &catalogue, &mut workers, horizon_start);

    let mut all_unavailability = inputs.unavailability.to_vec();
    all_unavailability.extend(constant_entries);
    let exclusions = unavailability::resolve(&all_unavailability, &calendar);

    let result = solver::solve(&calendar, &workers, &history, &exclusions, &all_unavailability, &inputs.solver_config)?;
    let violations = validator::validate(&calendar, &workers, &history, &exclusions, &result.assignments);

    Ok(ScheduleOutput { calendar, constant_catalogue: catalogue, workers, exclusions, result, violations })
}

/// Re-exported so callers that only need the model (e.g. for inspection
/// or a custom solve loop) don't have to reach into `builder` directly.
pub use builder::ModelBuildOutput;
