#![forbid(unsafe_code)]
//! Multi-week care-facility shift scheduler: turns a weekly shift template,
//! a worker pool, stated unavailability and a short prior-assignment tail
//! into a complete roster, subject to labour-rule hard constraints and a
//! weighted soft-penalty objective solved by an opaque CP backend.
//!
//! Pipeline order mirrors [`pipeline::schedule`]: Calendar Builder, History
//! Normaliser, Worker Normaliser, Constant Schedule Integrator,
//! Unavailability Resolver, Model Builder, Solver Driver, Validator.

pub mod builder;
pub mod calendar;
pub mod constant_schedule;
pub mod cp;
pub mod error;
pub mod history;
#[cfg(feature = "serde")]
pub mod io;
pub mod model;
pub mod pipeline;
pub mod solver;
pub mod unavailability;
pub mod validator;
pub mod workers;

pub use builder::{Big, ModelBuildOutput, ModelVars};
pub use calendar::{CalendarIndex, TemplateCell, TemplateRow, WeeklyTemplate};
pub use constant_schedule::{ConstantScheduleRow, Weekday7};
pub use error::{Result, RosterError};
pub use history::{HistoryIndex, RawPriorAssignment, WorkerHistory};
pub use model::{
    ConstantShiftTemplate, DayPreference, NightPolicy, PersonalRule, PriorAssignment, ShiftId,
    ShiftInstance, ShiftRequirement, ShiftType, UnavailabilityEntry, UnavailabilityKind, Worker,
    WeekendPreference, WorkerId,
};
pub use pipeline::{ScheduleInputs, ScheduleOutput};
pub use solver::{AssignmentRow, ScheduleResult, SolveReport, SolveStatus, SolverConfig};
pub use unavailability::ExclusionSet;
pub use workers::RawWorker;
