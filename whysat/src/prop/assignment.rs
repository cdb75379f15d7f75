//! Partial assignment and the assignment trail.
use partial_ref::{partial, PartialRef};
use thiserror::Error;

use whysat_formula::{Lit, Var};

use crate::context::{parts::*, Context};

use super::Reason;

/// Current partial assignment.
#[derive(Default)]
pub struct Assignment {
    values: Vec<Option<bool>>,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.values.resize(count, None);
    }

    /// Current partial assignment as slice.
    pub fn values(&self) -> &[Option<bool>] {
        &self.values
    }

    /// Value assigned to a variable.
    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.values[var.index()]
    }

    /// Value assigned to a literal.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.values[lit.index()].map(|value| value ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.lit_value(lit) == Some(true)
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.lit_value(lit) == Some(false)
    }

    pub fn lit_is_unassigned(&self, lit: Lit) -> bool {
        self.values[lit.index()].is_none()
    }

    pub fn assign_lit(&mut self, lit: Lit) {
        self.values[lit.index()] = Some(lit.is_positive())
    }

    fn clear_var(&mut self, var: Var) {
        self.values[var.index()] = None
    }
}

/// Raised when a variable would be put on the trail twice. Always a bug in
/// the caller, never a property of the input.
#[derive(Copy, Clone, Debug, Error)]
#[error("variable {0} is already assigned")]
pub struct AlreadyAssigned(pub Var);

/// Token denoting a trail position to rewind to.
#[derive(Copy, Clone, Debug)]
pub struct Mark {
    trail_len: usize,
    level: usize,
}

/// Decision and propagation history.
#[derive(Default)]
pub struct Trail {
    /// Stack of all assigned literals in assignment order.
    trail: Vec<Lit>,
    /// Trail lengths at which decision levels started.
    decisions: Vec<usize>,
}

impl Trail {
    /// Assigned literals in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Number of assignments on the trail.
    pub fn len(&self) -> usize {
        self.trail.len()
    }

    /// Whether the trail holds no assignments.
    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    /// Current decision level. Assumptions live at level zero.
    pub fn current_level(&self) -> usize {
        self.decisions.len()
    }

    /// Start a new decision level.
    ///
    /// Does not enqueue the decision itself.
    pub fn new_decision_level(&mut self) {
        self.decisions.push(self.trail.len())
    }

    /// A token for the current trail position.
    pub fn mark(&self) -> Mark {
        Mark {
            trail_len: self.trail.len(),
            level: self.decisions.len(),
        }
    }
}

/// Enqueues the assignment of true to a literal.
///
/// This updates the assignment, trail and reason, but does not perform any
/// propagation. The literal's variable must be unassigned.
pub fn enqueue_assignment(
    mut ctx: partial!(Context, mut AssignmentP, mut ReasonsP, mut TrailP),
    lit: Lit,
    reason: Reason,
) -> Result<(), AlreadyAssigned> {
    let assignment = ctx.part_mut(AssignmentP);
    if !assignment.lit_is_unassigned(lit) {
        return Err(AlreadyAssigned(lit.var()));
    }
    assignment.assign_lit(lit);

    ctx.part_mut(TrailP).trail.push(lit);
    ctx.part_mut(ReasonsP).set_reason(lit.var(), reason);

    Ok(())
}

/// Undo all assignments made after the marked position.
pub fn rewind(mut ctx: partial!(Context, mut AssignmentP, mut TrailP), mark: Mark) {
    let (assignment, mut ctx) = ctx.split_part_mut(AssignmentP);
    let trail = ctx.part_mut(TrailP);

    for &lit in &trail.trail[mark.trail_len..] {
        assignment.clear_var(lit.var());
    }
    trail.trail.truncate(mark.trail_len);
    trail.decisions.truncate(mark.level);
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use whysat_formula::{lit, lits};

    use crate::context::set_var_count;

    #[test]
    fn mark_and_rewind() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 4);

        enqueue_assignment(ctx.borrow(), lit![1], Reason::Assumption(lit![1])).unwrap();

        let mark = ctx.part(TrailP).mark();

        ctx.part_mut(TrailP).new_decision_level();
        enqueue_assignment(ctx.borrow(), lit![-2], Reason::Decision).unwrap();
        enqueue_assignment(ctx.borrow(), lit![3], Reason::Decision).unwrap();

        assert_eq!(ctx.part(TrailP).trail(), &lits![1, -2, 3][..]);
        assert_eq!(ctx.part(TrailP).current_level(), 1);
        assert!(ctx.part(AssignmentP).lit_is_false(lit![2]));

        rewind(ctx.borrow(), mark);

        assert_eq!(ctx.part(TrailP).trail(), &lits![1][..]);
        assert_eq!(ctx.part(TrailP).current_level(), 0);
        assert!(ctx.part(AssignmentP).lit_is_unassigned(lit![2]));
        assert!(ctx.part(AssignmentP).lit_is_true(lit![1]));
    }

    #[test]
    fn double_assignment_fails() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        set_var_count(ctx.borrow(), 2);

        enqueue_assignment(ctx.borrow(), lit![1], Reason::Decision).unwrap();

        let result = enqueue_assignment(ctx.borrow(), lit![-1], Reason::Decision);
        assert!(result.is_err());

        let result = enqueue_assignment(ctx.borrow(), lit![1], Reason::Decision);
        assert!(result.is_err());
    }
}
