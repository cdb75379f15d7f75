//! Full-sweep unit propagation to fixpoint.
use log::trace;
use partial_ref::{partial, PartialRef};
use thiserror::Error;

use crate::cancel::Abort;
use crate::context::{parts::*, Context};
use crate::store::ClauseView;

use super::{enqueue_assignment, AlreadyAssigned, Conflict, ConflictCause, Reason};

/// Abnormal termination of a solve.
#[derive(Debug, Error)]
pub enum Interrupt {
    /// The abort flag was set.
    #[error("solve canceled")]
    Canceled,
    /// An internal invariant was violated. Always a bug.
    #[error(transparent)]
    Invariant(#[from] AlreadyAssigned),
}

/// Result of propagating to fixpoint.
#[derive(Debug)]
pub enum Sweep {
    /// No unit or falsified clause remains under the current assignment.
    Fixpoint,
    /// A clause became falsified.
    Conflict(Conflict),
}

/// Runs unit propagation to fixpoint.
///
/// Every sweep scans the active clauses in ascending id order and literals
/// in their original clause order, so the clause reported for a conflict and
/// the order of forced assignments are reproducible across runs and across
/// probes. When a sweep forces at least one assignment another sweep
/// follows, until a sweep passes without progress or a clause is found with
/// every literal false.
///
/// An empty clause in the view is an immediate conflict with no falsifying
/// literals.
pub fn propagate(
    mut ctx: partial!(Context, mut AssignmentP, mut ReasonsP, mut StatsP, mut TrailP),
    view: &ClauseView,
    abort: &Abort,
) -> Result<Sweep, Interrupt> {
    loop {
        if abort.is_set() {
            return Err(Interrupt::Canceled);
        }
        ctx.part_mut(StatsP).sweeps += 1;

        let mut progressed = false;

        for cid in view.ids() {
            let lits = view.lits(cid);

            let mut satisfied = false;
            let mut unassigned = None;
            let mut unassigned_count = 0;

            for &lit in lits {
                match ctx.part(AssignmentP).lit_value(lit) {
                    Some(true) => {
                        satisfied = true;
                        break;
                    }
                    Some(false) => (),
                    None => {
                        unassigned_count += 1;
                        if unassigned.is_none() {
                            unassigned = Some(lit);
                        }
                    }
                }
            }

            if satisfied {
                continue;
            }

            match unassigned {
                None => {
                    trace!("clause {} is falsified", cid);
                    return Ok(Sweep::Conflict(Conflict {
                        cause: ConflictCause::Clause(cid),
                        falsified: lits.to_vec(),
                    }));
                }
                Some(lit) if unassigned_count == 1 => {
                    trace!("clause {} propagates {}", cid, lit);
                    enqueue_assignment(ctx.borrow(), lit, Reason::Propagated(cid))?;
                    ctx.part_mut(StatsP).propagations += 1;
                    progressed = true;
                }
                Some(_) => (),
            }
        }

        if !progressed {
            return Ok(Sweep::Fixpoint);
        }
    }
}
