//! Deletion-based shrinking of an unsatisfiable clause set.
use log::{debug, info};
use rustc_hash::FxHashSet;

use whysat_formula::Lit;

use crate::cancel::Abort;
use crate::context::SearchStats;
use crate::decision::DecisionOrder;
use crate::prop::Interrupt;
use crate::search::{solve, Verdict};
use crate::store::{ClauseSet, ClauseStore};

/// Outcome of shrinking an unsatisfiable clause set.
#[derive(Clone, Debug)]
pub struct ShrinkResult {
    /// Subset-minimal unsatisfiable subset: still unsatisfiable under the
    /// assumptions, while dropping any single clause makes it satisfiable.
    pub core: ClauseSet,
    /// Whether the hint-focused seed probed satisfiable and the shrinker
    /// fell back to its full input set.
    pub hint_fallback: bool,
}

/// Shrinks an unsatisfiable clause set to a subset-minimal one.
///
/// The input set must be unsatisfiable under the assumptions; the caller
/// confirms this with a probe before handing it over. When hints are given,
/// the subset of input clauses mentioning a hinted variable is probed first
/// and used as the starting point if it is already unsatisfiable.
///
/// The deletion pass visits clauses in ascending id order and probes the
/// working set without each one. Satisfiability is monotone under clause
/// removal, so a clause found essential stays essential while the working
/// set shrinks and a single pass suffices for subset-minimality. Every probe
/// is a full re-solve.
pub fn shrink_core(
    store: &ClauseStore,
    seed: ClauseSet,
    var_count: usize,
    assumptions: &[Lit],
    hints: &[Lit],
    order: &DecisionOrder,
    abort: &Abort,
    stats: &mut SearchStats,
) -> Result<ShrinkResult, Interrupt> {
    let mut hint_fallback = false;

    let mut working = if hints.is_empty() {
        seed
    } else {
        let hint_vars: FxHashSet<usize> = hints.iter().map(|lit| lit.index()).collect();

        let mut focused = ClauseSet::empty(store.len());
        for cid in seed.iter() {
            if store
                .lits(cid)
                .iter()
                .any(|lit| hint_vars.contains(&lit.index()))
            {
                focused.insert(cid);
            }
        }

        if probe_unsat(store, &focused, var_count, assumptions, order, abort, stats)? {
            debug!(
                "hint-focused seed of {} clauses is unsatisfiable",
                focused.len()
            );
            focused
        } else {
            debug!(
                "hint-focused seed probed satisfiable, keeping all {} seed clauses",
                seed.len()
            );
            hint_fallback = true;
            seed
        }
    };

    for cid in store.ids() {
        if !working.contains(cid) {
            continue;
        }

        let candidate = working.without(cid);
        if probe_unsat(store, &candidate, var_count, assumptions, order, abort, stats)? {
            debug!("clause {} dropped from the core", cid);
            working = candidate;
        } else {
            debug!("clause {} is essential", cid);
        }
    }

    info!("core shrunk to {} clauses", working.len());

    Ok(ShrinkResult {
        core: working,
        hint_fallback,
    })
}

/// Probe whether a clause subset is unsatisfiable under the assumptions.
pub fn probe_unsat(
    store: &ClauseStore,
    active: &ClauseSet,
    var_count: usize,
    assumptions: &[Lit],
    order: &DecisionOrder,
    abort: &Abort,
    stats: &mut SearchStats,
) -> Result<bool, Interrupt> {
    stats.probes += 1;
    match solve(
        &store.view(active),
        var_count,
        assumptions,
        order,
        abort,
        stats,
    )? {
        Verdict::Sat(_) => Ok(false),
        Verdict::Unsat(_) => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use whysat_formula::{formula, lits, Formula};

    fn shrink(
        input: &Formula,
        assumptions: &[Lit],
        hints: &[Lit],
    ) -> (ShrinkResult, SearchStats) {
        let store = ClauseStore::build(input).unwrap();
        let var_count = assumptions
            .iter()
            .chain(hints.iter())
            .map(|lit| lit.index() + 1)
            .fold(store.var_count(), usize::max);
        let order = DecisionOrder::new(var_count, hints);
        let mut stats = SearchStats::default();

        let result = shrink_core(
            &store,
            store.full_set(),
            var_count,
            assumptions,
            hints,
            &order,
            &Abort::new(),
            &mut stats,
        )
        .unwrap();

        (result, stats)
    }

    #[test]
    fn redundant_clauses_are_dropped() {
        let input = formula![
            -1, 2;
            -2, 3;
            -3;
            5, 6;
            -5, 6;
        ];

        let (result, _) = shrink(&input, &lits![1], &[]);

        let core: Vec<usize> = result.core.iter().map(|cid| cid.number()).collect();
        assert_eq!(core, vec![1, 2, 3]);
        assert!(!result.hint_fallback);
    }

    #[test]
    fn unrelated_hints_fall_back() {
        let input = formula![
            -1, 2;
            -2, 3;
            -3;
        ];

        let (result, _) = shrink(&input, &lits![1], &lits![99]);

        let core: Vec<usize> = result.core.iter().map(|cid| cid.number()).collect();
        assert_eq!(core, vec![1, 2, 3]);
        assert!(result.hint_fallback);
    }

    #[test]
    fn probes_are_counted() {
        let input = formula![
            -1;
            1;
        ];

        let (result, stats) = shrink(&input, &[], &[]);

        assert_eq!(result.core.len(), 2);
        // One probe per deletion candidate.
        assert_eq!(stats.probes, 2);
    }
}
