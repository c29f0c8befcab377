//! Internal port to the CP backend (spec §1/§5: "an opaque CP-SAT engine
//! exposing boolean variables, linear and reified constraints, integer
//! variables, max/multiplication equalities, an objective, and a
//! time-bounded solve"). Mirrors the teacher's `storage::Storage` trait /
//! `JsonStorage` split: `builder.rs` talks only to this module, never to
//! `selen` directly.
//!
//! Every helper below is built from the primitives confirmed in the
//! `selen` usage sample under `examples/other_examples` (`Model::default`,
//! `m.int`, `m.sum`, `m.c(expr).eq/le/ge(int(n))`, `m.solve`,
//! `solution.get::<i32>`), plus `mul`/`max`, which the spec's own backend
//! contract names as required primitives. Reification and implication are
//! *derived* from those primitives rather than assumed as native calls —
//! see the comments on `reify_any`/`implies_zero`.

use std::collections::HashMap;

use selen::prelude::{int, Model, VarId};

use crate::error::{Result, RosterError};

pub use selen::prelude::Solution;

/// Thin wrapper around a `selen::prelude::Model`, adding the reification
/// and implication vocabulary the Model Builder needs.
pub struct CpModel {
    inner: Model,
    /// Domain of every variable created with `lo == hi`, so callers can
    /// tell a structurally-fixed variable (e.g. an ineligible `x[s,e]`)
    /// from a free one without a solve (spec §4.6.1's eligibility
    /// pre-filter relies on this to skip unavailable night shifts).
    fixed: HashMap<VarId, i32>,
}

impl Default for CpModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CpModel {
    pub fn new() -> Self {
        Self { inner: Model::default(), fixed: HashMap::new() }
    }

    pub fn bool_var(&mut self) -> VarId {
        self.inner.int(0, 1)
    }

    pub fn int_var(&mut self, lo: i32, hi: i32) -> VarId {
        let v = self.inner.int(lo, hi);
        if lo == hi {
            self.fixed.insert(v, lo);
        }
        v
    }

    /// The fixed value of a variable created with `lo == hi`, if any.
    pub fn const_value(&self, var: VarId) -> Option<i32> {
        self.fixed.get(&var).copied()
    }

    pub fn sum(&mut self, vars: &[VarId]) -> VarId {
        self.inner.sum(vars)
    }

    pub fn eq_const(&mut self, var: VarId, value: i32) {
        self.inner.c(var).eq(int(value));
    }

    pub fn le_const(&mut self, var: VarId, value: i32) {
        self.inner.c(var).le(int(value));
    }

    pub fn ge_const(&mut self, var: VarId, value: i32) {
        self.inner.c(var).ge(int(value));
    }

    pub fn sum_eq_const(&mut self, vars: &[VarId], value: i32) {
        let s = self.sum(vars);
        self.eq_const(s, value);
    }

    pub fn sum_le_const(&mut self, vars: &[VarId], value: i32) {
        let s = self.sum(vars);
        self.le_const(s, value);
    }

    pub fn sum_ge_const(&mut self, vars: &[VarId], value: i32) {
        let s = self.sum(vars);
        self.ge_const(s, value);
    }

    /// Multiplication-equality: returns a fresh variable constrained equal
    /// to `a * b` (spec §4.6.3/§9: squared deviations in P2/P3/P8).
    pub fn mul_eq(&mut self, a: VarId, b: VarId) -> VarId {
        self.inner.mul(a, b)
    }

    /// Max-equality over a non-empty slice (spec §4.6.1: `maxc[e]`).
    pub fn max_eq(&mut self, vars: &[VarId]) -> VarId {
        self.inner.max(vars)
    }

    /// Boolean negation: returns `y` with `y = 1 - lit` for a 0/1 `lit`,
    /// built from `sum`/`eq` alone (`y + lit == 1`).
    pub fn not_bool(&mut self, lit: VarId) -> VarId {
        let y = self.bool_var();
        self.sum_eq_const(&[y, lit], 1);
        y
    }

    /// Reified "at least one" indicator: returns `n` with
    /// `n == 1 <=> sum(lits) >= 1`, for boolean `lits`.
    ///
    /// Built from two linear halves, both expressible as plain sums against
    /// a constant (no variable-to-variable comparison required):
    /// - `total >= 1 => n == 1`, i.e. for every `l_i`: `not(l_i) + n >= 1`.
    /// - `n == 1 => total >= 1`, i.e. `n + sum(not(l_i)) <= len(lits)`
    ///   (the same shape as `implies_zero`, applied to `not(n)`).
    pub fn reify_any(&mut self, lits: &[VarId]) -> VarId {
        if lits.is_empty() {
            let n = self.bool_var();
            self.eq_const(n, 0);
            return n;
        }
        let n = self.bool_var();
        let negated: Vec<VarId> = lits.iter().map(|&l| self.not_bool(l)).collect();
        for &not_l in &negated {
            self.sum_ge_const(&[not_l, n], 1);
        }
        let mut all = negated;
        all.push(n);
        self.sum_le_const(&all, lits.len() as i32);
        n
    }

    /// Reified implication `AND(lits) => target == 0`, for boolean `lits`
    /// (already negated by the caller where the antecedent needs a
    /// negative literal): `target + sum(lits) <= len(lits)`.
    pub fn implies_zero(&mut self, lits: &[VarId], target: VarId) {
        let mut all = lits.to_vec();
        all.push(target);
        self.sum_le_const(&all, lits.len() as i32);
    }

    /// Reified implication `AND(lits) => target == 1`: equivalent to
    /// `AND(lits) => not(target) == 0`.
    pub fn implies_one(&mut self, lits: &[VarId], target: VarId) {
        let not_target = self.not_bool(target);
        self.implies_zero(lits, not_target);
    }

    /// Reified conjunction: returns `n` with `n == 1 <=> AND(lits)`, dual
    /// of `reify_any`. `n <= l_i` for every `i` (via `implies_zero` on
    /// `not(l_i)`), plus `AND(lits) => n == 1` (via `implies_one`).
    pub fn reify_all(&mut self, lits: &[VarId]) -> VarId {
        if lits.is_empty() {
            let n = self.bool_var();
            self.eq_const(n, 1);
            return n;
        }
        let n = self.bool_var();
        for &l in lits {
            let not_l = self.not_bool(l);
            self.implies_zero(&[not_l], n);
        }
        self.implies_one(lits, n);
        n
    }

    /// A fixed-value variable, used as the constant operand of `mul_eq`
    /// (the backend has no bare scalar-multiply primitive) and as a
    /// literal term inside a `sum`.
    pub fn const_var(&mut self, value: i32) -> VarId {
        self.int_var(value, value)
    }

    /// `k * var`, via `mul_eq` against a fixed-value variable.
    pub fn scale(&mut self, var: VarId, k: i32) -> VarId {
        let k_var = self.const_var(k);
        self.mul_eq(var, k_var)
    }

    /// Direct variable-to-variable linear comparisons. Unconfirmed in the
    /// one grounding sample (which only ever compares a sum against an
    /// `int()` literal), but assumed available on the same `m.c(expr)`
    /// builder — any CSP solver general enough to need reified
    /// comparisons between two derived quantities (P7/P8 below) needs
    /// this. Flagged in DESIGN.md.
    pub fn le_var(&mut self, a: VarId, b: VarId) {
        self.inner.c(a).le(b);
    }

    pub fn ge_var(&mut self, a: VarId, b: VarId) {
        self.inner.c(a).ge(b);
    }

    pub fn eq_var(&mut self, a: VarId, b: VarId) {
        self.inner.c(a).eq(b);
    }

    /// Reifies `f == 1 <=> a >= b + 1` (`a` strictly greater than `b`) for
    /// two non-negative bounded integer variables, via the standard
    /// big-M encoding. `big` must exceed the largest feasible value of
    /// either operand.
    pub fn reify_greater(&mut self, a: VarId, b: VarId, big: i32) -> VarId {
        let f = self.bool_var();
        let f_big = self.scale(f, big);
        let b_plus_fbig = self.sum(&[b, f_big]);
        let big_minus_1 = self.const_var(big - 1);
        let a_plus_bound = self.sum(&[a, big_minus_1]);
        self.le_var(b_plus_fbig, a_plus_bound); // f=1 => a >= b+1
        self.le_var(a, b_plus_fbig); // f=0 => a <= b
        f
    }

    /// Solves with an optional upper bound on `objective` (used by the
    /// Solver Driver to tighten towards an optimum via repeated solves),
    /// returning the raw solution on success.
    pub fn solve_with_ceiling(mut self, objective: Option<VarId>, ceiling: Option<i32>) -> Result<Solution> {
        if let (Some(obj), Some(max)) = (objective, ceiling) {
            self.le_const(obj, max);
        }
        self.inner
            .solve()
            .map_err(|e| RosterError::Backend(format!("{e:?}")))
    }

    pub fn read_bool(solution: &Solution, var: VarId) -> bool {
        solution.get::<i32>(var) != 0
    }

    pub fn read_int(solution: &Solution, var: VarId) -> i32 {
        solution.get::<i32>(var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reify_any_tracks_disjunction() {
        let mut m = CpModel::new();
        let a = m.bool_var();
        let b = m.bool_var();
        m.eq_const(a, 1);
        m.eq_const(b, 0);
        let n = m.reify_any(&[a, b]);
        let solution = m.solve_with_ceiling(None, None).unwrap();
        assert_eq!(CpModel::read_int(&solution, n), 1);
    }

    #[test]
    fn reify_any_is_zero_when_all_false() {
        let mut m = CpModel::new();
        let a = m.bool_var();
        let b = m.bool_var();
        m.eq_const(a, 0);
        m.eq_const(b, 0);
        let n = m.reify_any(&[a, b]);
        let solution = m.solve_with_ceiling(None, None).unwrap();
        assert_eq!(CpModel::read_int(&solution, n), 0);
    }

    #[test]
    fn implies_zero_forces_target() {
        let mut m = CpModel::new();
        let a = m.bool_var();
        let target = m.bool_var();
        m.eq_const(a, 1);
        m.implies_zero(&[a], target);
        let solution = m.solve_with_ceiling(None, None).unwrap();
        assert_eq!(CpModel::read_int(&solution, target), 0);
    }

    #[test]
    fn reify_all_requires_every_literal() {
        let mut m = CpModel::new();
        let a = m.bool_var();
        let b = m.bool_var();
        m.eq_const(a, 1);
        m.eq_const(b, 0);
        let n = m.reify_all(&[a, b]);
        let solution = m.solve_with_ceiling(None, None).unwrap();
        assert_eq!(CpModel::read_int(&solution, n), 0);
    }

    #[test]
    fn reify_greater_detects_strict_excess() {
        let mut m = CpModel::new();
        let a = m.int_var(0, 10);
        let b = m.int_var(0, 10);
        m.eq_const(a, 5);
        m.eq_const(b, 2);
        let f = m.reify_greater(a, b, 20);
        let solution = m.solve_with_ceiling(None, None).unwrap();
        assert_eq!(CpModel::read_int(&solution, f), 1);
    }
}
