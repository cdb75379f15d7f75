//! Literals and variables.
use std::{fmt, ops};

/// A boolean variable.
///
/// Variables are identified by their positive 1-based number, the same number
/// used to denote them in the DIMACS CNF format. A 0-based index is available
/// for code that stores per-variable data in vectors.
///
/// Variable numbers above `i32::max_value()` are unsupported, so that every
/// literal over a valid variable fits the signed code representation.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var {
    number: u32,
}

impl Var {
    /// Creates a variable from its positive 1-based DIMACS number.
    #[inline]
    pub fn from_dimacs(number: isize) -> Var {
        debug_assert!(number > 0);
        debug_assert!(number <= i32::max_value() as isize);
        Var {
            number: number as u32,
        }
    }

    /// Creates a variable from a 0-based index.
    #[inline]
    pub fn from_index(index: usize) -> Var {
        debug_assert!(index < i32::max_value() as usize);
        Var {
            number: index as u32 + 1,
        }
    }

    /// The 1-based number representing this variable in the DIMACS CNF
    /// encoding.
    #[inline]
    pub fn to_dimacs(self) -> isize {
        self.number as isize
    }

    /// The 0-based index of this variable.
    #[inline]
    pub fn index(self) -> usize {
        (self.number - 1) as usize
    }

    /// Creates a literal from this var and a `bool` that is `true` when the
    /// literal is positive.
    #[inline]
    pub fn lit(self, polarity: bool) -> Lit {
        Lit::from_var(self, polarity)
    }

    /// Creates a positive literal from this var.
    #[inline]
    pub fn positive(self) -> Lit {
        Lit::positive(self)
    }

    /// Creates a negative literal from this var.
    #[inline]
    pub fn negative(self) -> Lit {
        Lit::negative(self)
    }
}

/// Uses the 1-based DIMACS CNF encoding.
impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// Uses the 1-based DIMACS CNF encoding.
impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A boolean literal.
///
/// A literal is a variable or the negation of a variable.
///
/// Internally a literal is stored as the signed nonzero integer of the DIMACS
/// CNF encoding: the variable's number when the literal is positive and the
/// negated number when it is negative. This is also the representation the
/// rest of the system speaks, so conversions are free.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Lit {
    code: i32,
}

impl Lit {
    /// Creates a literal from a `Var` and a `bool` that is `true` when the
    /// literal is positive.
    #[inline]
    pub fn from_var(var: Var, polarity: bool) -> Lit {
        let number = var.number as i32;
        Lit {
            code: if polarity { number } else { -number },
        }
    }

    /// Create a positive literal from a `Var`.
    #[inline]
    pub fn positive(var: Var) -> Lit {
        Lit::from_var(var, true)
    }

    /// Create a negative literal from a `Var`.
    #[inline]
    pub fn negative(var: Var) -> Lit {
        Lit::from_var(var, false)
    }

    /// Create a literal from a variable index and a `bool` that is `true`
    /// when the literal is positive.
    #[inline]
    pub fn from_index(index: usize, polarity: bool) -> Lit {
        Lit::from_var(Var::from_index(index), polarity)
    }

    /// Creates a literal from a signed nonzero integer.
    ///
    /// The absolute value is the variable's 1-based number, the sign of the
    /// integer is the sign of the literal.
    #[inline]
    pub fn from_dimacs(number: isize) -> Lit {
        debug_assert!(number != 0);
        debug_assert!(number.abs() <= i32::max_value() as isize);
        Lit {
            code: number as i32,
        }
    }

    /// Signed integer representation of the literal, opposite of
    /// `from_dimacs`.
    #[inline]
    pub fn to_dimacs(self) -> isize {
        self.code as isize
    }

    /// 0-based index of the literal's _variable_.
    #[inline]
    pub fn index(self) -> usize {
        (self.code.abs() - 1) as usize
    }

    /// The literal's variable.
    #[inline]
    pub fn var(self) -> Var {
        Var {
            number: self.code.abs() as u32,
        }
    }

    /// Whether the literal is negative, i.e. a negated variable.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.code < 0
    }

    /// Whether the literal is positive, i.e. a non-negated variable.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.code > 0
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit { code: -self.code }
    }
}

impl ops::BitXor<bool> for Lit {
    type Output = Lit;

    #[inline]
    fn bitxor(self, rhs: bool) -> Lit {
        if rhs {
            !self
        } else {
            self
        }
    }
}

impl From<Var> for Lit {
    #[inline]
    fn from(var: Var) -> Lit {
        Lit::positive(var)
    }
}

/// Uses the 1-based DIMACS CNF encoding.
impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// Uses the 1-based DIMACS CNF encoding.
impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;
    use proptest::{prelude::*, *};

    pub fn var(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Var> {
        index.prop_map(|index| Var::from_index(index))
    }

    pub fn lit(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Lit> {
        (var(index), bool::ANY).prop_map(|(var, polarity)| var.lit(polarity))
    }
}
