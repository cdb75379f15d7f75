//! Top-level driver: search once, explain, shrink.
use log::{debug, info};
use thiserror::Error;

use whysat_formula::{Formula, Lit};

use crate::cancel::Abort;
use crate::context::SearchStats;
use crate::decision::DecisionOrder;
use crate::outcome::Outcome;
use crate::prop::{AlreadyAssigned, ConflictCause, Interrupt};
use crate::search::{solve, Verdict};
use crate::shrink::{probe_unsat, shrink_core};
use crate::store::{ClauseSet, ClauseStore, StoreError};

/// Errors of a top-level solve.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The abort flag was set before the diagnosis finished.
    #[error("solve canceled")]
    Canceled,
    /// An internal invariant was violated. Always a bug, never a property of
    /// the input.
    #[error("internal error: {0}")]
    Internal(AlreadyAssigned),
}

impl From<Interrupt> for SolverError {
    fn from(interrupt: Interrupt) -> SolverError {
        match interrupt {
            Interrupt::Canceled => SolverError::Canceled,
            Interrupt::Invariant(err) => SolverError::Internal(err),
        }
    }
}

/// An UNSAT diagnoser for one formula.
///
/// The clause store is built once at construction and shared read-only by
/// the initial search and every shrinker probe; each of those owns its own
/// trail.
pub struct Solver {
    store: ClauseStore,
    assumptions: Vec<Lit>,
    hints: Vec<Lit>,
    abort: Abort,
}

impl Solver {
    /// Create a solver for the given formula.
    pub fn new(formula: &Formula) -> Result<Solver, StoreError> {
        Ok(Solver {
            store: ClauseStore::build(formula)?,
            assumptions: vec![],
            hints: vec![],
            abort: Abort::new(),
        })
    }

    /// Add assumptions, each a unit constraint for every following solve.
    ///
    /// Their order matters: when several assumptions are equally responsible
    /// for a conflict, the first-listed one is named first.
    pub fn assume(&mut self, lits: &[Lit]) {
        self.assumptions.extend_from_slice(lits);
    }

    /// Add core hints. Hinted variables are branched on first and seed the
    /// core shrinker; signs are ignored.
    pub fn hint(&mut self, lits: &[Lit]) {
        self.hints.extend_from_slice(lits);
    }

    /// A handle that cancels a running solve of this solver when set.
    pub fn abort_handle(&self) -> Abort {
        self.abort.clone()
    }

    /// The clause store built from the input formula.
    pub fn store(&self) -> &ClauseStore {
        &self.store
    }

    /// Diagnose the formula under the current assumptions.
    ///
    /// Returns a model when the formula is satisfiable. Otherwise the result
    /// carries the primary explanation of the conflict and a subset-minimal
    /// unsatisfiable subset of the clauses.
    pub fn solve(&self) -> Result<Outcome, SolverError> {
        let var_count = self
            .assumptions
            .iter()
            .chain(self.hints.iter())
            .map(|lit| lit.index() + 1)
            .fold(self.store.var_count(), usize::max);

        let order = DecisionOrder::new(var_count, &self.hints);
        let full = self.store.full_set();
        let mut stats = SearchStats::default();

        info!(
            "solving {} clauses over {} variables with {} assumptions",
            self.store.len(),
            var_count,
            self.assumptions.len()
        );

        let verdict = solve(
            &self.store.view(&full),
            var_count,
            &self.assumptions,
            &order,
            &self.abort,
            &mut stats,
        )?;

        match verdict {
            Verdict::Sat(model) => {
                info!("satisfiable, nothing to explain");
                Ok(Outcome::sat(&model, stats))
            }
            Verdict::Unsat(analysis) => {
                info!("unsatisfiable, deriving explanation and core");

                let mut seed = ClauseSet::empty(self.store.len());
                if let ConflictCause::Clause(cid) = analysis.conflict.cause {
                    seed.insert(cid);
                }
                for &cid in analysis.involved.iter() {
                    seed.insert(cid);
                }

                let seed = if probe_unsat(
                    &self.store,
                    &seed,
                    var_count,
                    &self.assumptions,
                    &order,
                    &self.abort,
                    &mut stats,
                )? {
                    seed
                } else {
                    debug!("explanation-derived seed probed satisfiable, shrinking the full formula");
                    full
                };

                let shrink = shrink_core(
                    &self.store,
                    seed,
                    var_count,
                    &self.assumptions,
                    &self.hints,
                    &order,
                    &self.abort,
                    &mut stats,
                )?;

                info!(
                    "done after {} decisions, {} propagations, {} probes",
                    stats.decisions, stats.propagations, stats.probes
                );

                Ok(Outcome::unsat(
                    &self.store,
                    &analysis,
                    &shrink,
                    &self.assumptions,
                    &self.hints,
                    stats,
                ))
            }
        }
    }
}
