//! DIMACS CNF parser and writer for the whysat UNSAT diagnoser.
//!
//! The accepted format is standard DIMACS CNF plus one comment extension: a
//! comment of the form `c rule <rule-id> [note...]` attaches the given rule
//! id and note to the next clause. The rule id must be a single token; the
//! note is the remainder of the comment line. Clauses without a preceding
//! rule comment get empty metadata.
use std::io;

use whysat_formula::{ClauseMeta, Formula, Lit};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {}: unexpected token in DIMACS CNF input: {:?}", line, token)]
    UnexpectedToken { line: usize, token: String },
    #[error("line {}: literal out of range: {}", line, token)]
    LiteralTooLarge { line: usize, token: String },
    #[error("line {}: invalid header syntax: {:?}", line, header)]
    InvalidHeader { line: usize, header: String },
    #[error("line {}: unterminated clause", line)]
    UnterminatedClause { line: usize },
    #[error(
        "formula has {} variables while the header specifies {} variables",
        var_count,
        header_var_count
    )]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error(
        "formula has {} clauses while the header specifies {} clauses",
        clause_count,
        header_clause_count
    )]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
}

/// Variable and clause count present in a DIMACS CNF header.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Parser for DIMACS CNF files with rule metadata comments.
#[derive(Default)]
pub struct DimacsParser {
    formula: Formula,
    partial_clause: Vec<Lit>,
    pending_meta: Option<ClauseMeta>,
    header: Option<DimacsHeader>,

    line_number: usize,
    clause_count: usize,
}

impl DimacsParser {
    /// Create a new DIMACS CNF parser.
    pub fn new() -> DimacsParser {
        DimacsParser::default()
    }

    /// Parse the given input and check the header if present.
    pub fn parse(input: impl io::Read) -> Result<Formula, Error> {
        use io::BufRead;

        let mut parser = DimacsParser::new();

        for line in io::BufReader::new(input).lines() {
            parser.parse_line(&line?)?;
        }
        parser.eof()?;
        parser.check_header()?;

        Ok(parser.into_formula())
    }

    /// Parse a single input line.
    pub fn parse_line(&mut self, line: &str) -> Result<(), ParserError> {
        self.line_number += 1;

        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            Ok(())
        } else if trimmed.starts_with('c') {
            self.parse_comment(trimmed);
            Ok(())
        } else if trimmed.starts_with('p') {
            self.parse_header_line(trimmed)
        } else {
            for token in trimmed.split_whitespace() {
                self.parse_literal_token(token)?;
            }
            Ok(())
        }
    }

    /// Finish parsing the input.
    ///
    /// This does not check whether the header information was correct, call
    /// [`check_header`](DimacsParser::check_header) for this.
    pub fn eof(&self) -> Result<(), ParserError> {
        if !self.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }
        Ok(())
    }

    /// Verifies the header information when present.
    ///
    /// Does nothing when the input doesn't contain a header.
    pub fn check_header(&self) -> Result<(), ParserError> {
        if let Some(header) = self.header {
            let var_count = self.formula.var_count();
            if var_count != header.var_count {
                return Err(ParserError::VarCount {
                    var_count,
                    header_var_count: header.var_count,
                });
            }

            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }

        Ok(())
    }

    /// The parsed formula.
    pub fn into_formula(self) -> Formula {
        self.formula
    }

    /// Return the DIMACS CNF header data if present.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables in the parsed formula.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    fn parse_comment(&mut self, trimmed: &str) {
        let mut tokens = trimmed[1..].split_whitespace();

        if tokens.next() == Some("rule") {
            if let Some(rule_id) = tokens.next() {
                let note = tokens.collect::<Vec<_>>().join(" ");
                self.pending_meta = Some(ClauseMeta::new(rule_id, note));
            }
        }
    }

    fn parse_header_line(&mut self, trimmed: &str) -> Result<(), ParserError> {
        let invalid_header = || ParserError::InvalidHeader {
            line: self.line_number,
            header: trimmed.to_owned(),
        };

        if self.header.is_some() {
            return Err(invalid_header());
        }

        let mut tokens = trimmed.split_whitespace();

        if tokens.next() != Some("p") || tokens.next() != Some("cnf") {
            return Err(invalid_header());
        }

        let var_count: usize = match tokens.next().and_then(|value| str::parse(value).ok()) {
            None => return Err(invalid_header()),
            Some(value) => value,
        };

        if var_count > i32::max_value() as usize {
            return Err(ParserError::LiteralTooLarge {
                line: self.line_number,
                token: var_count.to_string(),
            });
        }

        let clause_count: usize = match tokens.next().and_then(|value| str::parse(value).ok()) {
            None => return Err(invalid_header()),
            Some(value) => value,
        };

        if tokens.next().is_some() {
            return Err(invalid_header());
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        self.formula.set_var_count(var_count);

        Ok(())
    }

    fn parse_literal_token(&mut self, token: &str) -> Result<(), ParserError> {
        let number: isize = match str::parse(token) {
            Err(_) => {
                return Err(ParserError::UnexpectedToken {
                    line: self.line_number,
                    token: token.to_owned(),
                })
            }
            Ok(number) => number,
        };

        if number == 0 {
            let meta = self.pending_meta.take().unwrap_or_default();
            self.formula
                .add_clause(self.partial_clause.drain(..), meta);
            self.clause_count += 1;
        } else if number.checked_abs().map_or(true, |abs| {
            abs > i32::max_value() as isize
        }) {
            return Err(ParserError::LiteralTooLarge {
                line: self.line_number,
                token: token.to_owned(),
            });
        } else {
            self.partial_clause.push(Lit::from_dimacs(number));
        }

        Ok(())
    }
}

/// Write a DIMACS CNF header.
///
/// Can be used with [`write_dimacs_clauses`] to implement incremental
/// writing.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write a formula's clauses as headerless DIMACS CNF with rule comments.
///
/// A clause whose rule id is empty is written without a rule comment, so its
/// metadata does not round-trip. Rule ids containing whitespace do not
/// round-trip either; they are written as-is.
pub fn write_dimacs_clauses(target: &mut impl io::Write, formula: &Formula) -> io::Result<()> {
    for (lits, meta) in formula.iter() {
        if !meta.rule_id.is_empty() {
            if meta.note.is_empty() {
                writeln!(target, "c rule {}", meta.rule_id)?;
            } else {
                writeln!(target, "c rule {} {}", meta.rule_id, meta.note)?;
            }
        }
        for lit in lits {
            itoa::write(&mut *target, lit.to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a formula as DIMACS CNF.
pub fn write_dimacs(target: &mut impl io::Write, formula: &Formula) -> io::Result<()> {
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula)
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Error;
    use proptest::{test_runner::TestCaseError, *};

    use whysat_formula::{cnf::strategy::*, formula, rule_formula};

    #[test]
    fn odd_whitespace() -> Result<(), Error> {
        let parsed = DimacsParser::parse(
            b"p  cnf  4   3  \n  1  \n 2  3\n0 -4 0 2\nccomment  \n\n0\n\n" as &[_],
        )?;

        let expected = formula![
            1, 2, 3;
            -4;
            2;
        ];

        assert_eq!(parsed, expected);

        Ok(())
    }

    #[test]
    fn rule_comments() -> Result<(), Error> {
        let parsed = DimacsParser::parse(
            b"p cnf 3 3\n\
              c rule antenna mast is blocked\n\
              1 2 0\n\
              c just a comment\n\
              -2 3 0\n\
              c rule power\n\
              -3 0\n" as &[_],
        )?;

        let expected = rule_formula![
            "antenna", "mast is blocked" => 1, 2;
            "", "" => -2, 3;
            "power", "" => -3;
        ];

        assert_eq!(parsed, expected);

        Ok(())
    }

    macro_rules! expect_error {
        ( $input:expr, $( $cases:tt )* ) => {
            match DimacsParser::parse($input as &[_]) {
                Ok(parsed) => panic!("expected error but got {:?}", parsed),
                Err(err) => match err.downcast_ref() {
                    Some(casted_err) => match casted_err {
                        $( $cases )*,
                        _ => panic!("unexpected error {:?}", casted_err),
                    },
                    None => panic!("unexpected error type {:?}", err),
                }
            }
        };
    }

    #[test]
    fn invalid_headers() {
        expect_error!(b"p notcnf 1 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf 1", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf 1 2 3", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf foo bar", ParserError::InvalidHeader { .. } => ());
        expect_error!(b"p cnf -3 -6", ParserError::InvalidHeader { .. } => ());
        expect_error!(
            b"p cnf 1 2\np cnf 1 2\n",
            ParserError::InvalidHeader { .. } => ()
        );
    }

    #[test]
    fn invalid_header_data() {
        expect_error!(
            b"p cnf 1 1\n 2 0",
            ParserError::VarCount { var_count: 2, header_var_count: 1 } => ()
        );

        expect_error!(
            b"p cnf 10 1\n 1 0 0",
            ParserError::ClauseCount { clause_count: 2, header_clause_count: 1 } => ()
        );

        expect_error!(
            b"p cnf 10 4\n 1 0",
            ParserError::ClauseCount { clause_count: 1, header_clause_count: 4 } => ()
        );
    }

    #[test]
    fn syntax_errors() {
        expect_error!(
            b"1 2 ?foo 0",
            ParserError::UnexpectedToken { .. } => ()
        );

        expect_error!(
            b"1 2 - 3 0",
            ParserError::UnexpectedToken { .. } => ()
        );

        expect_error!(
            b"1 2 --3 0",
            ParserError::UnexpectedToken { .. } => ()
        );
    }

    #[test]
    fn unterminated_clause() {
        expect_error!(
            b"1 2 3",
            ParserError::UnterminatedClause { .. } => ()
        );
    }

    #[test]
    fn literal_too_large() {
        expect_error!(
            format!("1 {} 2 0", i32::max_value() as i64 + 1).as_bytes(),
            ParserError::LiteralTooLarge { .. } => ()
        );
    }

    proptest! {
        #[test]
        fn roundtrip(input in formula(1..100usize, 0..500, 0..10)) {
            let mut buf = vec![];

            write_dimacs(&mut buf, &input)?;

            let parsed = DimacsParser::parse(&buf[..])
                .map_err(|e| TestCaseError::fail(e.to_string()))?;

            prop_assert_eq!(parsed, input);
        }
    }
}
