//! Structured solve results handed to the serializer.
//!
//! The types here are the complete caller-facing result; turning them into
//! JSON (or anything else) is the front end's job. Literals are reported in
//! their signed integer encoding and clause ids with their 1-based numbers.
use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::Serialize;

use whysat_formula::{Lit, Var};

use crate::analyze::ConflictAnalysis;
use crate::context::SearchStats;
use crate::prop::ConflictCause;
use crate::search::Model;
use crate::shrink::ShrinkResult;
use crate::store::{ClauseId, ClauseStore};

/// A clause as reported to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClauseReport {
    pub cid: usize,
    pub rule_id: String,
    pub note: String,
    pub literals: Vec<isize>,
}

impl ClauseReport {
    fn from_store(store: &ClauseStore, cid: ClauseId) -> ClauseReport {
        let meta = store.meta(cid);
        ClauseReport {
            cid: cid.number(),
            rule_id: meta.rule_id.clone(),
            note: meta.note.clone(),
            literals: store.lits(cid).iter().map(|lit| lit.to_dimacs()).collect(),
        }
    }
}

/// The primary explanation: the falsified clause and what led to it.
#[derive(Clone, Debug, Serialize)]
pub struct Explanation {
    /// The directly falsified clause. Absent when assumptions clash with
    /// each other without a clause of their own.
    pub conflict_clause: Option<ClauseReport>,
    /// The falsifying literals, in clause order.
    pub falsified_literals: Vec<isize>,
    /// Assumption literals behind the conflict, in first-seen order.
    /// Decision literals the conflict depended on are included as
    /// pseudo-assumptions.
    pub assumption_causes: Vec<isize>,
    /// The conflict clause first, then every clause whose propagation
    /// participated, in first-visit order.
    pub involved_rules: Vec<ClauseReport>,
}

/// Structured result of one diagnosis.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Sat {
        model: BTreeMap<isize, bool>,
        stats: SearchStats,
    },
    UnsatWithCore {
        primary_explanation: Explanation,
        mus_size: usize,
        mus_clauses: Vec<ClauseReport>,
        mus_rules: Vec<String>,
        hints_used: Vec<isize>,
        hint_fallback: bool,
        assumptions: Vec<isize>,
        shrink_probes: u64,
        stats: SearchStats,
    },
}

impl Outcome {
    /// Whether the diagnosis found a satisfying assignment.
    pub fn is_sat(&self) -> bool {
        match self {
            Outcome::Sat { .. } => true,
            Outcome::UnsatWithCore { .. } => false,
        }
    }

    pub(crate) fn sat(model: &Model, stats: SearchStats) -> Outcome {
        Outcome::Sat {
            model: (0..model.var_count())
                .map(|index| {
                    let var = Var::from_index(index);
                    (var.to_dimacs(), model.value(var))
                })
                .collect(),
            stats,
        }
    }

    pub(crate) fn unsat(
        store: &ClauseStore,
        analysis: &ConflictAnalysis,
        shrink: &ShrinkResult,
        assumptions: &[Lit],
        hints: &[Lit],
        stats: SearchStats,
    ) -> Outcome {
        let conflict_clause = match analysis.conflict.cause {
            ConflictCause::Clause(cid) => Some(ClauseReport::from_store(store, cid)),
            ConflictCause::Assumptions => None,
        };

        let mut involved_rules = vec![];
        involved_rules.extend(conflict_clause.clone());
        involved_rules.extend(
            analysis
                .involved
                .iter()
                .map(|&cid| ClauseReport::from_store(store, cid)),
        );

        let mus_clauses: Vec<ClauseReport> = shrink
            .core
            .iter()
            .map(|cid| ClauseReport::from_store(store, cid))
            .collect();

        let mut seen_rules = FxHashSet::default();
        let mut mus_rules = vec![];
        for report in mus_clauses.iter() {
            if seen_rules.insert(report.rule_id.clone()) {
                mus_rules.push(report.rule_id.clone());
            }
        }

        Outcome::UnsatWithCore {
            primary_explanation: Explanation {
                conflict_clause,
                falsified_literals: dimacs_vec(&analysis.conflict.falsified),
                assumption_causes: dimacs_vec(&analysis.assumption_causes),
                involved_rules,
            },
            mus_size: mus_clauses.len(),
            mus_clauses,
            mus_rules,
            hints_used: dimacs_vec(hints),
            hint_fallback: shrink.hint_fallback,
            assumptions: dimacs_vec(assumptions),
            shrink_probes: stats.probes,
            stats,
        }
    }
}

fn dimacs_vec(lits: &[Lit]) -> Vec<isize> {
    lits.iter().map(|lit| lit.to_dimacs()).collect()
}
