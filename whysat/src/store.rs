//! Immutable clause storage and active-subset views.
use std::fmt;
use std::ops::Range;

use log::debug;
use thiserror::Error;

use whysat_formula::{ClauseMeta, Formula, Lit};

/// Dense identifier of a stored clause.
///
/// Ids are assigned in input order when the store is built and stay stable
/// for the lifetime of a solve. Like variables they are displayed 1-based.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ClauseId {
    index: u32,
}

impl ClauseId {
    /// Creates a clause id from a 0-based index.
    #[inline]
    pub fn from_index(index: usize) -> ClauseId {
        ClauseId {
            index: index as u32,
        }
    }

    /// The 0-based index of this clause id.
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// The 1-based number used when reporting this clause.
    #[inline]
    pub fn number(self) -> usize {
        self.index as usize + 1
    }
}

/// Uses the 1-based numbering.
impl fmt::Debug for ClauseId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Uses the 1-based numbering.
impl fmt::Display for ClauseId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Errors while building a clause store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("clause {clause}: duplicate literal {literal}")]
    DuplicateLiteral { clause: usize, literal: Lit },
}

/// Immutable catalogue of the clauses of one solve.
///
/// Built once per top-level solve and never mutated afterwards. Clauses
/// containing a variable in both polarities are trivially true and are
/// elided at construction; the remaining clauses get dense ids. Empty
/// clauses are kept, they falsify any assignment.
#[derive(Default)]
pub struct ClauseStore {
    var_count: usize,
    literals: Vec<Lit>,
    clause_ranges: Vec<Range<usize>>,
    metas: Vec<ClauseMeta>,
}

impl ClauseStore {
    /// Build a store from a formula.
    ///
    /// Fails if any clause contains the same literal twice.
    pub fn build(formula: &Formula) -> Result<ClauseStore, StoreError> {
        let mut store = ClauseStore {
            var_count: formula.var_count(),
            ..ClauseStore::default()
        };

        let mut scratch = vec![];

        for (position, (lits, meta)) in formula.iter().enumerate() {
            scratch.clear();
            scratch.extend_from_slice(lits);
            scratch.sort_by_key(|lit| (lit.index(), lit.is_negative()));

            let mut tautology = false;
            for pair in scratch.windows(2) {
                if pair[0] == pair[1] {
                    return Err(StoreError::DuplicateLiteral {
                        clause: position + 1,
                        literal: pair[0],
                    });
                }
                if pair[0].var() == pair[1].var() {
                    tautology = true;
                }
            }

            if tautology {
                debug!("eliding tautological clause {} at load", position + 1);
                continue;
            }

            let begin = store.literals.len();
            store.literals.extend_from_slice(lits);
            store.clause_ranges.push(begin..store.literals.len());
            store.metas.push(meta.clone());
        }

        Ok(store)
    }

    /// Number of stored clauses.
    pub fn len(&self) -> usize {
        self.clause_ranges.len()
    }

    /// Whether the store holds no clauses.
    pub fn is_empty(&self) -> bool {
        self.clause_ranges.is_empty()
    }

    /// Number of variables covered by the stored clauses.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// The literals of a clause, in their original order.
    pub fn lits(&self, cid: ClauseId) -> &[Lit] {
        &self.literals[self.clause_ranges[cid.index()].clone()]
    }

    /// The metadata of a clause.
    pub fn meta(&self, cid: ClauseId) -> &ClauseMeta {
        &self.metas[cid.index()]
    }

    /// All clause ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ClauseId> {
        (0..self.len()).map(ClauseId::from_index)
    }

    /// An active set containing every stored clause.
    pub fn full_set(&self) -> ClauseSet {
        let mut set = ClauseSet::empty(self.len());
        for cid in self.ids() {
            set.insert(cid);
        }
        set
    }

    /// A read-only view of the store restricted to the given active set.
    pub fn view<'a>(&'a self, active: &'a ClauseSet) -> ClauseView<'a> {
        ClauseView {
            store: self,
            active,
        }
    }
}

/// Subset of the stored clauses.
///
/// Iteration is always in ascending clause id order, which keeps every scan
/// over a set deterministic.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ClauseSet {
    members: Vec<bool>,
    len: usize,
}

impl ClauseSet {
    /// The empty subset of a store with the given clause count.
    pub fn empty(store_len: usize) -> ClauseSet {
        ClauseSet {
            members: vec![false; store_len],
            len: 0,
        }
    }

    /// Number of clauses in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the set contains no clauses.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the given clause is in the set.
    pub fn contains(&self, cid: ClauseId) -> bool {
        self.members.get(cid.index()).cloned().unwrap_or(false)
    }

    /// Add a clause to the set. Returns whether it was newly added.
    pub fn insert(&mut self, cid: ClauseId) -> bool {
        let member = &mut self.members[cid.index()];
        if *member {
            false
        } else {
            *member = true;
            self.len += 1;
            true
        }
    }

    /// Remove a clause from the set. Returns whether it was present.
    pub fn remove(&mut self, cid: ClauseId) -> bool {
        let member = &mut self.members[cid.index()];
        if *member {
            *member = false;
            self.len -= 1;
            true
        } else {
            false
        }
    }

    /// A copy of this set with one clause removed.
    pub fn without(&self, cid: ClauseId) -> ClauseSet {
        let mut copy = self.clone();
        copy.remove(cid);
        copy
    }

    /// The contained clause ids in ascending order.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = ClauseId> + 'a {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, &member)| member)
            .map(|(index, _)| ClauseId::from_index(index))
    }
}

/// Read-only access to the clauses of an active subset.
#[derive(Copy, Clone)]
pub struct ClauseView<'a> {
    store: &'a ClauseStore,
    active: &'a ClauseSet,
}

impl<'a> ClauseView<'a> {
    /// The underlying store.
    pub fn store(&self) -> &'a ClauseStore {
        self.store
    }

    /// Whether the given clause is active in this view.
    pub fn contains(&self, cid: ClauseId) -> bool {
        self.active.contains(cid)
    }

    /// The literals of an active clause.
    pub fn lits(&self, cid: ClauseId) -> &'a [Lit] {
        debug_assert!(self.contains(cid));
        self.store.lits(cid)
    }

    /// The metadata of an active clause.
    pub fn meta(&self, cid: ClauseId) -> &'a ClauseMeta {
        debug_assert!(self.contains(cid));
        self.store.meta(cid)
    }

    /// The active clause ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ClauseId> + 'a {
        self.active.iter()
    }

    /// Number of active clauses.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether the view contains no clauses.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use whysat_formula::{formula, lit, lits, rule_formula};

    #[test]
    fn dense_ids_skip_tautologies() {
        let formula = rule_formula![
            "a", "" => 1, 2;
            "b", "" => 1, -2, 3, 2;
            "c", "" => -3;
        ];

        let store = ClauseStore::build(&formula).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.lits(ClauseId::from_index(0)), &lits![1, 2][..]);
        assert_eq!(store.lits(ClauseId::from_index(1)), &lits![-3][..]);
        assert_eq!(store.meta(ClauseId::from_index(1)).rule_id, "c");
    }

    #[test]
    fn duplicate_literal_is_fatal() {
        let formula = formula![
            1, 2;
            -3, 1, -3;
        ];

        match ClauseStore::build(&formula) {
            Err(StoreError::DuplicateLiteral { clause: 2, literal }) => {
                assert_eq!(literal, lit![-3]);
            }
            other => panic!("unexpected result {:?}", other.map(|store| store.len())),
        }
    }

    #[test]
    fn empty_clause_is_kept() {
        let formula = formula![
            1, 2;
            ;
        ];

        let store = ClauseStore::build(&formula).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.lits(ClauseId::from_index(1)).is_empty());
    }

    #[test]
    fn subset_iteration_is_ascending() {
        let formula = formula![
            1; 2; 3; 4; 5;
        ];

        let store = ClauseStore::build(&formula).unwrap();
        let mut set = ClauseSet::empty(store.len());
        set.insert(ClauseId::from_index(3));
        set.insert(ClauseId::from_index(0));
        set.insert(ClauseId::from_index(4));

        let ids: Vec<_> = set.iter().map(|cid| cid.index()).collect();
        assert_eq!(ids, vec![0, 3, 4]);

        let smaller = set.without(ClauseId::from_index(3));
        let ids: Vec<_> = smaller.iter().map(|cid| cid.index()).collect();
        assert_eq!(ids, vec![0, 4]);
        assert_eq!(set.len(), 3);
    }
}
