use std::env;
use std::fs;
use std::io::{self, Write};
use std::process;

use anyhow::{ensure, Context as _, Error};
use clap::{App, AppSettings, Arg, ArgMatches};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};
use serde::Serialize;

use whysat::{Outcome, Solver, SolverError};
use whysat_dimacs::DimacsParser;
use whysat_formula::Lit;

/// Structured error value emitted in place of an outcome.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ErrorReport {
    Error { kind: &'static str, message: String },
}

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{:#}", err);
            let (kind, code) = classify(&err);
            emit_error(kind, format!("{:#}", err));
            code
        }
        Ok(exit_code) => exit_code,
    };
    process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "{}", record.args())
        } else {
            writeln!(buf, "{}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stderr)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("WHYSAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is whysat {}", env!("CARGO_PKG_VERSION"));
}

fn classify(err: &Error) -> (&'static str, i32) {
    match err.downcast_ref::<SolverError>() {
        Some(SolverError::Canceled) => ("canceled", 130),
        Some(SolverError::Internal(_)) => ("internal_error", 3),
        None => ("malformed_input", 2),
    }
}

fn emit_error(kind: &'static str, message: String) {
    let report = ErrorReport::Error { kind, message };
    if let Ok(json) = serde_json::to_string(&report) {
        println!("{}", json);
    }
}

fn parse_lit_args(matches: &ArgMatches, name: &str) -> Result<Vec<Lit>, Error> {
    let mut lits = vec![];
    if let Some(values) = matches.values_of(name) {
        for value in values {
            let number: isize = value
                .parse()
                .with_context(|| format!("invalid --{} literal {:?}", name, value))?;
            ensure!(number != 0, "literal 0 is not allowed in --{}", name);
            lits.push(Lit::from_dimacs(number));
        }
    }
    Ok(lits)
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("whysat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Explains why a CNF formula is unsatisfiable under assumptions")
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
        .arg(
            Arg::from_usage("[assume] -a --assume 'Assume a literal for this solve'")
                .value_name("LIT")
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::from_usage(
                "[hint] -H --hint 'Branch on a hinted variable first and seed the core from it'",
            )
            .value_name("LIT")
            .multiple(true)
            .number_of_values(1)
            .allow_hyphen_values(true),
        )
        .arg_from_usage("--pretty 'Pretty-print the JSON output'")
        .get_matches();

    init_logging();
    banner();

    let assumptions = parse_lit_args(&matches, "assume")?;
    let hints = parse_lit_args(&matches, "hint")?;

    let formula = match matches.value_of("INPUT") {
        Some(path) => {
            info!("reading file '{}'", path);
            let file = fs::File::open(path).with_context(|| format!("cannot open {:?}", path))?;
            DimacsParser::parse(file)?
        }
        None => {
            info!("reading from stdin");
            let stdin = io::stdin();
            let locked = stdin.lock();
            DimacsParser::parse(locked)?
        }
    };

    let mut solver = Solver::new(&formula)?;
    solver.assume(&assumptions);
    solver.hint(&hints);

    let abort = solver.abort_handle();
    signal_hook::flag::register(signal_hook::consts::SIGINT, abort.flag())?;

    let outcome = solver.solve()?;

    let json = if matches.is_present("pretty") {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{}", json);

    Ok(match outcome {
        Outcome::Sat { .. } => 0,
        Outcome::UnsatWithCore { .. } => 1,
    })
}
