//! CNF formulas with per-clause rule metadata.
use std::cmp::max;
use std::fmt;
use std::ops::Range;

use crate::lit::Lit;

/// Caller-supplied metadata attached to a clause.
///
/// The `rule_id` names the rule a clause was generated from and is not
/// required to be unique; the `note` is free-form text. Both are opaque to
/// the solver and are only echoed back in explanations.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClauseMeta {
    pub rule_id: String,
    pub note: String,
}

impl ClauseMeta {
    /// Create metadata from a rule id and a note.
    pub fn new(rule_id: impl Into<String>, note: impl Into<String>) -> ClauseMeta {
        ClauseMeta {
            rule_id: rule_id.into(),
            note: note.into(),
        }
    }

    /// Whether neither a rule id nor a note is present.
    pub fn is_empty(&self) -> bool {
        self.rule_id.is_empty() && self.note.is_empty()
    }
}

impl fmt::Debug for ClauseMeta {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.rule_id, self.note)
    }
}

/// A formula in conjunctive normal form with clause metadata.
///
/// Equivalent to `Vec<(Vec<Lit>, ClauseMeta)>` but stores all literals in a
/// single buffer.
#[derive(Default, Eq)]
pub struct Formula {
    var_count: usize,
    literals: Vec<Lit>,
    clause_ranges: Vec<Range<usize>>,
    metas: Vec<ClauseMeta>,
}

impl Formula {
    /// Create an empty formula.
    pub fn new() -> Formula {
        Formula::default()
    }

    /// Number of variables in the formula.
    ///
    /// This also counts missing variables if a variable with a higher index
    /// is present. A vector of this length can be indexed with the variable
    /// indices present.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Increase the number of variables in the formula.
    ///
    /// If the parameter is less than the current variable count do nothing.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_count = max(self.var_count, count)
    }

    /// Number of clauses in the formula.
    pub fn len(&self) -> usize {
        self.clause_ranges.len()
    }

    /// Whether the formula contains no clauses.
    pub fn is_empty(&self) -> bool {
        self.clause_ranges.is_empty()
    }

    /// Appends a clause with metadata to the formula.
    pub fn add_clause(&mut self, literals: impl IntoIterator<Item = Lit>, meta: ClauseMeta) {
        let begin = self.literals.len();
        self.literals.extend(literals);
        let end = self.literals.len();

        for &lit in self.literals[begin..end].iter() {
            self.var_count = max(lit.index() + 1, self.var_count);
        }

        self.clause_ranges.push(begin..end);
        self.metas.push(meta);
    }

    /// The literals of the clause at the given position.
    pub fn clause(&self, index: usize) -> &[Lit] {
        &self.literals[self.clause_ranges[index].clone()]
    }

    /// The metadata of the clause at the given position.
    pub fn meta(&self, index: usize) -> &ClauseMeta {
        &self.metas[index]
    }

    /// Iterator over all clauses with their metadata.
    pub fn iter(&self) -> impl Iterator<Item = (&[Lit], &ClauseMeta)> {
        let literals = &self.literals;
        self.clause_ranges
            .iter()
            .zip(self.metas.iter())
            .map(move |(range, meta)| (&literals[range.clone()], meta))
    }
}

/// Convert any iterable of [`Lit`] iterables into a Formula with empty
/// metadata on every clause.
impl<F, I> From<F> for Formula
where
    F: IntoIterator<Item = I>,
    I: IntoIterator<Item = Lit>,
{
    fn from(clauses: F) -> Formula {
        let mut formula = Formula::new();
        for clause in clauses {
            formula.add_clause(clause, ClauseMeta::default());
        }
        formula
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.var_count(), f)?;
        f.debug_list()
            .entries(self.iter().map(|(lits, _)| lits.to_vec()))
            .finish()
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Formula) -> bool {
        self.var_count() == other.var_count()
            && self.len() == other.len()
            && (0..self.len())
                .all(|index| self.clause(index) == other.clause(index))
            && self.metas == other.metas
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{collection::SizeRange, prelude::*, *};

    use crate::lit::strategy::lit;

    pub fn vec_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Vec<Vec<Lit>>> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        // Not using ind_flat_map makes shrinking too expensive
        vars.prop_ind_flat_map(move |vars| {
            collection::vec(
                collection::vec(lit(0..vars), clause_len.clone()),
                clauses.clone(),
            )
        })
    }

    /// Formula with numbered rule ids attached to every clause.
    pub fn formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = Formula> {
        vec_formula(vars, clauses, clause_len).prop_map(|clauses| {
            let mut formula = Formula::new();
            for (index, clause) in clauses.into_iter().enumerate() {
                let meta = ClauseMeta::new(format!("r{}", index + 1), "");
                formula.add_clause(clause, meta);
            }
            formula
        })
    }
}
