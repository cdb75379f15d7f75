//! Basic formula data types used by the whysat UNSAT diagnoser.

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! lit {
    ($x:expr) => {
        $crate::lit::Lit::from_dimacs($x)
    };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! var {
    ($x:expr) => {
        $crate::lit::Var::from_dimacs($x)
    };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! lits {
    ( $( $x:expr ),* ) => { [ $( $crate::lit!( $x ) ),* ] };
    ( $( $x:expr ),* , ) => { $crate::lits! [ $( $x ),* ] };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! formula {
    ( $( $( $x:expr ),* );* ; ) => {
        $crate::cnf::Formula::from(
            [ $( &[ $( $crate::lit!( $x ) ),* ] as &[$crate::Lit] ),* ]
                .iter()
                .map(|clause| clause.iter().cloned()),
        )
    };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! rule_formula {
    ( $( $rule:expr , $note:expr => $( $x:expr ),* );* ; ) => {{
        let mut formula = $crate::cnf::Formula::new();
        $(
            formula.add_clause(
                (&$crate::lits![ $( $x ),* ] as &[$crate::Lit]).iter().cloned(),
                $crate::cnf::ClauseMeta::new($rule, $note),
            );
        )*
        formula
    }};
}

pub mod cnf;
pub mod lit;


pub use cnf::{ClauseMeta, Formula};
pub use lit::{Lit, Var};
