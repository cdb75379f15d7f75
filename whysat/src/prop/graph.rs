//! Reason bookkeeping: why each assigned variable holds its value.
use whysat_formula::{Lit, Var};

use crate::store::ClauseId;

/// What caused a variable's current assignment.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Reason {
    /// Assigned directly by a caller assumption.
    Assumption(Lit),
    /// Assigned by a search decision.
    Decision,
    /// Forced by unit propagation of the given clause.
    Propagated(ClauseId),
}

/// What kind of conflict was detected.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ConflictCause {
    /// Every literal of this clause is false under the trail.
    Clause(ClauseId),
    /// An assumption contradicts the assignment forced by earlier
    /// assumptions. No clause of its own is involved.
    Assumptions,
}

/// A falsified clause, or a rejected assumption, found during propagation.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Conflict {
    pub cause: ConflictCause,
    /// The literals that are false under the trail at detection time: the
    /// whole falsified clause, the rejected assumption, or nothing for an
    /// empty clause.
    pub falsified: Vec<Lit>,
}

/// Reasons of all assigned variables.
///
/// Entries hold valid data only for currently assigned variables. The
/// logical graph formed by following `Propagated` reasons is acyclic: a
/// propagated literal's supporting literals were all assigned at strictly
/// earlier trail positions.
#[derive(Default)]
pub struct ReasonGraph {
    nodes: Vec<Reason>,
}

impl ReasonGraph {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.nodes.resize(count, Reason::Decision);
    }

    /// Get the reason for an assigned variable.
    ///
    /// Returns stale data if the variable isn't assigned.
    pub fn reason(&self, var: Var) -> Reason {
        self.nodes[var.index()]
    }

    /// Set the reason for a variable being assigned.
    pub fn set_reason(&mut self, var: Var, reason: Reason) {
        self.nodes[var.index()] = reason;
    }
}
