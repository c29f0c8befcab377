//! Shared types for the Model Builder (spec §4.6): the variable maps the
//! hard-constraint and soft-penalty passes both read and write, plus the
//! build configuration.

use std::collections::HashMap;

use chrono::NaiveDate;
use selen::prelude::VarId;

use crate::model::{ShiftId, ShiftType, WorkerId};

/// A safe, generously large upper bound on any single count/minute
/// quantity in the model, used as the `big` parameter of big-M
/// reifications and as a finite upper domain bound for derived integer
/// variables. Sized from the horizon rather than hard-coded so it always
/// dominates the largest value the model can actually produce.
#[derive(Debug, Clone, Copy)]
pub struct Big(pub i32);

/// Decision and derived variables declared by `variables::declare`.
/// Every hard-constraint and soft-penalty function reads from this and
/// may add to `objective_terms`.
pub struct ModelVars {
    /// `x[s,e]`: shift `s` assigned to worker index `e`. Statically
    /// ineligible pairs (C6/C8/C9/C10) are `int(0,0)` rather than a free
    /// boolean (spec §4.6.1; mirrors the fixed-zero pattern for
    /// structurally impossible work assignments).
    pub x: HashMap<(ShiftId, usize), VarId>,
    /// `u[s]`: uncovered-shift slack, one per shift.
    pub u: HashMap<ShiftId, VarId>,
    /// `n[e,d]`: worker `e` works some night shift on date `d`.
    pub n: HashMap<(usize, NaiveDate), VarId>,
    /// `w[e,d]`: worker `e` works some shift on date `d`.
    pub w: HashMap<(usize, NaiveDate), VarId>,
    /// `ww[e,week]`: worker `e` works a weekend shift in horizon week `w`.
    pub ww: HashMap<(usize, u32), VarId>,
    /// `count[e,t]`: number of shifts of type `t` assigned to worker `e`.
    pub count: HashMap<(usize, ShiftType), VarId>,
    /// `total[e]`: total shifts assigned to worker `e`.
    pub total: HashMap<usize, VarId>,
    /// `maxc[e]`: the largest of worker `e`'s per-type counts.
    pub maxc: HashMap<usize, VarId>,
    /// Running list of already-weighted objective contributions; summed
    /// once at the end of the build (spec §9: a single scalar objective,
    /// `OBJECTIVE_SCALE = 1000` turning the spec's weights into integers).
    pub objective_terms: Vec<VarId>,
    pub worker_ids: Vec<WorkerId>,
}

pub const OBJECTIVE_SCALE: i32 = 1000;

impl ModelVars {
    pub fn worker_index(&self, id: &WorkerId) -> Option<usize> {
        self.worker_ids.iter().position(|w| w == id)
    }
}
