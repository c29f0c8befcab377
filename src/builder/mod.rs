//! Model Builder (spec §4.6, ~45% of the system): declares every decision
//! variable and emits the hard constraints C1–C10 and soft penalties
//! P1–P10 into a single `CpModel`, returning the assignment-variable map
//! the Solver Driver and Validator both need.

mod hard_constraints;
mod soft_penalties;
mod types;
mod variables;

pub use types::{Big, ModelVars, OBJECTIVE_SCALE};

use crate::calendar::CalendarIndex;
use crate::cp::CpModel;
use crate::history::HistoryIndex;
use crate::model::{UnavailabilityEntry, Worker};
use crate::unavailability::ExclusionSet;

pub struct ModelBuildOutput {
    pub cp: CpModel,
    pub vars: ModelVars,
    pub objective: selen::prelude::VarId,
}

/// Builds the full CP model for one horizon. `availability_entries` is the
/// *unfiltered* unavailability list (including `kind = available` rows,
/// which `ExclusionSet` already discards) — needed for P9's preference
/// bonus.
pub fn build(
    calendar: &CalendarIndex,
    workers: &[Worker],
    history: &HistoryIndex,
    exclusions: &ExclusionSet,
    availability_entries: &[UnavailabilityEntry],
) -> crate::error::Result<ModelBuildOutput> {
    #[cfg(feature = "logging")]
    tracing::debug!(shifts = calendar.len(), workers = workers.len(), "building model");

    let mut cp = CpModel::new();
    let big = Big((calendar.len() as i32 + 1) * (calendar.horizon_weeks as i32 + 1));

    let mut vars = variables::declare(&mut cp, calendar, workers, exclusions);

    hard_constraints::coverage(&mut cp, calendar, &vars);
    hard_constraints::one_shift_per_day(&mut cp, calendar, &vars);
    hard_constraints::rest_after_night(&mut cp, calendar, &vars);
    hard_constraints::weekly_day_cap(&mut cp, calendar, &vars, workers);
    hard_constraints::contract_budget(&mut cp, calendar, &vars, workers);
    hard_constraints::consecutive_night_cap(&mut cp, calendar, history, &vars, workers);
    hard_constraints::rest_after_long_night_block(&mut cp, calendar, history, &vars, workers);
    hard_constraints::rolling_night_cap(&mut cp, calendar, history, &vars, workers);
    hard_constraints::age_night_restriction(&mut cp, calendar, &vars, workers);
    hard_constraints::personal_rule_constraints(&mut cp, calendar, history, &vars, workers);

    soft_penalties::uncovered_shifts(&mut cp, calendar, &mut vars);
    soft_penalties::under_coverage(&mut cp, calendar, &mut vars, workers)?;
    soft_penalties::consecutive_weekends(&mut cp, calendar, history, &mut vars, workers);
    soft_penalties::isolated_shifts(&mut cp, calendar, history, &mut vars, workers);
    soft_penalties::rest_after_night_block(&mut cp, calendar, &mut vars, workers);
    soft_penalties::unequal_distribution(&mut cp, &mut vars, workers, big);
    soft_penalties::weekly_balance(&mut cp, calendar, &mut vars, workers, big);
    soft_penalties::night_policy_other_and_preference_bonus(&mut cp, calendar, availability_entries, &mut vars, workers);
    soft_penalties::qualification_overmatch(&mut cp, calendar, &mut vars, workers);

    let objective = cp.sum(&vars.objective_terms);

    #[cfg(feature = "logging")]
    tracing::debug!(objective_terms = vars.objective_terms.len(), "model built");

    Ok(ModelBuildOutput { cp, vars, objective })
}
