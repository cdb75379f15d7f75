//! Diagnoses why a CNF formula is unsatisfiable under unit assumptions.
//!
//! The entry point is [`Solver`]: load a [`whysat_formula::Formula`] whose
//! clauses carry rule metadata, add assumptions and optional core hints, and
//! call [`Solver::solve`]. A satisfiable instance yields a model; an
//! unsatisfiable one yields the falsified clause, the assumption chain whose
//! propagation produced the conflict, and a subset-minimal unsatisfiable
//! subset of the clauses.
pub mod analyze;
pub mod cancel;
pub mod context;
pub mod decision;
pub mod outcome;
pub mod prop;
pub mod search;
pub mod shrink;
pub mod solver;
pub mod store;

pub use cancel::Abort;
pub use outcome::{ClauseReport, Explanation, Outcome};
pub use solver::{Solver, SolverError};
pub use store::{ClauseId, ClauseSet, ClauseStore, ClauseView, StoreError};
