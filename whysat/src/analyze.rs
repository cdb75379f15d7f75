//! Conflict analysis: from a falsified clause back to the assumptions.
use std::collections::VecDeque;

use partial_ref::{partial, PartialRef};
use rustc_hash::FxHashSet;

use whysat_formula::{Lit, Var};

use crate::context::{parts::*, Context};
use crate::prop::{Assignment, Conflict, ConflictCause, Reason};
use crate::store::{ClauseId, ClauseView};

/// Everything recorded about a conflict at the moment it was detected.
///
/// The trail is rewound while the search unwinds, so the walk over reasons
/// happens eagerly and its results are kept here, self-contained.
#[derive(Clone, Debug)]
pub struct ConflictAnalysis {
    pub conflict: Conflict,
    /// Assumption literals supporting the conflict, in first-seen order.
    /// When the conflict depends on search decisions, the decision literals
    /// appear here as pseudo-assumptions.
    pub assumption_causes: Vec<Lit>,
    /// Decision variables the conflict depends on.
    pub decisions: Vec<Var>,
    /// Clauses whose propagations participate, in first-visit order. The
    /// conflicting clause itself is not listed.
    pub involved: Vec<ClauseId>,
}

impl ConflictAnalysis {
    /// Whether every decision this conflict depends on is still assigned.
    ///
    /// After a backtrack, a conflict that holds without any of the undone
    /// decisions still holds under the opposite polarity, so it closes the
    /// whole branch. A variable assigned on the trail cannot have changed
    /// value since the analysis was taken, so checking assignment alone is
    /// enough.
    pub fn still_grounded(&self, assignment: &Assignment) -> bool {
        self.decisions
            .iter()
            .all(|&var| assignment.var_value(var).is_some())
    }
}

/// Walks reason links from a conflict back to its assumption roots.
///
/// Starting from the falsified literals, each literal's variable is
/// explained by its recorded reason: assumptions are collected as causes,
/// propagations add their clause and enqueue the clause's other literals,
/// decisions are collected as pseudo-assumption causes. Variables are
/// visited at most once; termination follows from reasons only ever pointing
/// at earlier trail positions.
///
/// For an assumption conflict the rejected literal seeds the walk (its
/// variable holds the opposing value, so the walk yields the assumptions
/// responsible for that) and is then appended to the causes itself.
pub fn analyze_conflict(
    ctx: partial!(Context, AssignmentP, ReasonsP),
    view: &ClauseView,
    conflict: Conflict,
) -> ConflictAnalysis {
    let mut worklist: VecDeque<Lit> = conflict.falsified.iter().cloned().collect();
    let mut seen_vars = FxHashSet::default();
    let mut seen_clauses = FxHashSet::default();

    let mut assumption_causes = vec![];
    let mut decisions = vec![];
    let mut involved = vec![];

    while let Some(lit) = worklist.pop_front() {
        let var = lit.var();
        if !seen_vars.insert(var.index()) {
            continue;
        }

        match ctx.part(ReasonsP).reason(var) {
            Reason::Assumption(assumption) => assumption_causes.push(assumption),
            Reason::Decision => {
                let value = ctx.part(AssignmentP).var_value(var).unwrap_or(false);
                assumption_causes.push(var.lit(value));
                decisions.push(var);
            }
            Reason::Propagated(cid) => {
                if seen_clauses.insert(cid.index()) {
                    involved.push(cid);
                }
                for &clause_lit in view.lits(cid) {
                    if clause_lit.var() != var {
                        worklist.push_back(clause_lit);
                    }
                }
            }
        }
    }

    if conflict.cause == ConflictCause::Assumptions {
        if let Some(&rejected) = conflict.falsified.first() {
            assumption_causes.push(rejected);
        }
    }

    ConflictAnalysis {
        conflict,
        assumption_causes,
        decisions,
        involved,
    }
}
