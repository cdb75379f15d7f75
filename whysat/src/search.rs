//! DPLL search with reason recording.
//!
//! The search is complete but deliberately plain: no learning, no restarts,
//! no nonchronological backjumping. Keeping the reason graph linear in the
//! trail is what makes the recorded conflicts explainable afterwards.
use log::trace;
use partial_ref::{partial, IntoPartialRefMut, PartialRef};

use whysat_formula::{Lit, Var};

use crate::analyze::{analyze_conflict, ConflictAnalysis};
use crate::cancel::Abort;
use crate::context::{parts::*, set_var_count, Context, SearchStats};
use crate::decision::DecisionOrder;
use crate::prop::{
    enqueue_assignment, propagate, rewind, AlreadyAssigned, Conflict, ConflictCause, Interrupt,
    Reason, Sweep,
};
use crate::store::ClauseView;

/// A total assignment satisfying the active clauses and assumptions.
#[derive(Clone, Debug)]
pub struct Model {
    values: Vec<bool>,
}

impl Model {
    /// The value of a variable.
    pub fn value(&self, var: Var) -> bool {
        self.values[var.index()]
    }

    /// Whether a literal is true under this model.
    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.value(lit.var()) == lit.is_positive()
    }

    /// Number of assigned variables.
    pub fn var_count(&self) -> usize {
        self.values.len()
    }
}

/// Outcome of one search over a clause view.
#[derive(Debug)]
pub enum Verdict {
    Sat(Model),
    Unsat(ConflictAnalysis),
}

/// Decides satisfiability of the view's clauses under the assumptions.
///
/// Assumptions are enqueued in their listed order with propagation run after
/// each, so an assumption rejected by the consequences of earlier ones is
/// detected the moment it is enqueued and reported as an assumption
/// conflict. Afterwards the recursive decision search runs to completion.
///
/// Each call owns a fresh trail; nothing is shared between probes.
pub fn solve(
    view: &ClauseView,
    var_count: usize,
    assumptions: &[Lit],
    order: &DecisionOrder,
    abort: &Abort,
    stats: &mut SearchStats,
) -> Result<Verdict, Interrupt> {
    let mut ctx = Context::default();
    let mut ctx = ctx.into_partial_ref_mut();

    set_var_count(ctx.borrow(), var_count);

    let placed = enqueue_assumptions(ctx.borrow(), view, assumptions, abort);
    let result = match placed {
        Err(interrupt) => Err(interrupt),
        Ok(Some(analysis)) => Ok(Verdict::Unsat(analysis)),
        Ok(None) => search(ctx.borrow(), view, order, abort),
    };

    stats.merge(ctx.part(StatsP));

    result
}

/// Enqueue all assumptions, propagating after each.
///
/// Returns the analysis of the conflict that rejected an assumption, or
/// `None` when all assumptions were placed without conflict.
fn enqueue_assumptions(
    mut ctx: partial!(Context, mut AssignmentP, mut ReasonsP, mut StatsP, mut TrailP),
    view: &ClauseView,
    assumptions: &[Lit],
    abort: &Abort,
) -> Result<Option<ConflictAnalysis>, Interrupt> {
    for &assumption in assumptions {
        match ctx.part(AssignmentP).lit_value(assumption) {
            Some(true) => {
                // Already implied by earlier assumptions.
                continue;
            }
            Some(false) => {
                trace!("assumption {} is rejected", assumption);
                let conflict = Conflict {
                    cause: ConflictCause::Assumptions,
                    falsified: vec![assumption],
                };
                return Ok(Some(analyze_conflict(ctx.borrow(), view, conflict)));
            }
            None => {
                enqueue_assignment(ctx.borrow(), assumption, Reason::Assumption(assumption))?;
                let sweep = propagate(ctx.borrow(), view, abort)?;
                if let Sweep::Conflict(conflict) = sweep {
                    return Ok(Some(analyze_conflict(ctx.borrow(), view, conflict)));
                }
            }
        }
    }

    Ok(None)
}

/// The recursive decision procedure.
///
/// Propagates, picks the next variable in branching order and tries the
/// positive polarity before the negated one. A conflict whose reason chain
/// survives the backtrack intact, depending on no undone decision, is
/// returned as-is: the same conflict would come back under the other
/// polarity. When both polarities fail, the conflict that closed the second
/// branch is returned.
fn search(
    mut ctx: partial!(Context, mut AssignmentP, mut ReasonsP, mut StatsP, mut TrailP),
    view: &ClauseView,
    order: &DecisionOrder,
    abort: &Abort,
) -> Result<Verdict, Interrupt> {
    let sweep = propagate(ctx.borrow(), view, abort)?;
    if let Sweep::Conflict(conflict) = sweep {
        return Ok(Verdict::Unsat(analyze_conflict(ctx.borrow(), view, conflict)));
    }

    let var = match order.next_unassigned(ctx.part(AssignmentP)) {
        None => return Ok(Verdict::Sat(extract_model(ctx.part(AssignmentP)))),
        Some(var) => var,
    };

    let mark = ctx.part(TrailP).mark();

    decide(ctx.borrow(), var.positive())?;
    let first = search(ctx.borrow(), view, order, abort)?;
    match first {
        Verdict::Sat(model) => return Ok(Verdict::Sat(model)),
        Verdict::Unsat(analysis) => {
            rewind(ctx.borrow(), mark);
            if analysis.still_grounded(ctx.part(AssignmentP)) {
                return Ok(Verdict::Unsat(analysis));
            }
        }
    }

    decide(ctx.borrow(), var.negative())?;
    let second = search(ctx.borrow(), view, order, abort)?;
    match second {
        Verdict::Sat(model) => Ok(Verdict::Sat(model)),
        Verdict::Unsat(analysis) => {
            rewind(ctx.borrow(), mark);
            Ok(Verdict::Unsat(analysis))
        }
    }
}

fn decide(
    mut ctx: partial!(Context, mut AssignmentP, mut ReasonsP, mut StatsP, mut TrailP),
    decision: Lit,
) -> Result<(), AlreadyAssigned> {
    trace!("deciding {}", decision);
    ctx.part_mut(TrailP).new_decision_level();
    ctx.part_mut(StatsP).decisions += 1;
    enqueue_assignment(ctx.borrow(), decision, Reason::Decision)
}

fn extract_model(assignment: &crate::prop::Assignment) -> Model {
    Model {
        values: assignment
            .values()
            .iter()
            .map(|value| value.unwrap_or(false))
            .collect(),
    }
}
