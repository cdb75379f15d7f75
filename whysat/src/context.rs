//! Central per-solve data structure.
//!
//! This module defines the `Context` data structure which holds the mutable
//! state of one solve. The clause store is deliberately not part of it: a
//! store outlives the many probe contexts the core shrinker creates.
use partial_ref::{part, partial, PartialRef, PartialRefTarget};
use serde::Serialize;

use crate::prop::{Assignment, ReasonGraph, Trail};

/// Counters collected over one solve, including all shrinker probes.
#[derive(Copy, Clone, Default, Debug, Serialize)]
pub struct SearchStats {
    pub decisions: u64,
    pub propagations: u64,
    pub sweeps: u64,
    pub probes: u64,
}

impl SearchStats {
    /// Fold another stats block into this one.
    pub fn merge(&mut self, other: &SearchStats) {
        self.decisions += other.decisions;
        self.propagations += other.propagations;
        self.sweeps += other.sweeps;
        self.probes += other.probes;
    }
}

/// Part declarations for the [`Context`] struct.
pub mod parts {
    use super::*;

    part!(pub AssignmentP: Assignment);
    part!(pub ReasonsP: ReasonGraph);
    part!(pub StatsP: SearchStats);
    part!(pub TrailP: Trail);
}

use parts::*;

/// Central per-solve data structure.
///
/// Functions operating on multiple fields of the context use partial
/// references provided by the `partial_ref` crate. This documents the data
/// dependencies and makes the borrow checker happy without the overhead of
/// passing individual references.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part(AssignmentP)]
    pub assignment: Assignment,
    #[part(ReasonsP)]
    pub reasons: ReasonGraph,
    #[part(StatsP)]
    pub stats: SearchStats,
    #[part(TrailP)]
    pub trail: Trail,
}

/// Update structures for a new variable count.
pub fn set_var_count(mut ctx: partial!(Context, mut AssignmentP, mut ReasonsP), count: usize) {
    ctx.part_mut(AssignmentP).set_var_count(count);
    ctx.part_mut(ReasonsP).set_var_count(count);
}
