use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use whysat_formula::test::conditional_pigeon_hole;
use whysat_formula::{lits, rule_formula, ClauseMeta, Formula, Lit};

use whysat::{Outcome, Solver};

fn lits_of(numbers: &[isize]) -> Vec<Lit> {
    numbers.iter().map(|&number| Lit::from_dimacs(number)).collect()
}

fn diagnose(input: &Formula, assumptions: &[Lit], hints: &[Lit]) -> Outcome {
    let mut solver = Solver::new(input).expect("malformed input");
    solver.assume(assumptions);
    solver.hint(hints);
    solver.solve().expect("solve failed")
}

/// The formula of the hint scenarios: six satisfiable filler clauses over
/// variables 1..6, then an unsatisfiable chain as clauses 7, 8 and 9 over
/// variables 10, 11 and 12.
fn filler_and_chain() -> Formula {
    rule_formula![
        "f1", "" => 1, 2;
        "f2", "" => -1, 2;
        "f3", "" => 3, 4;
        "f4", "" => -3, 4;
        "f5", "" => 5, 6;
        "f6", "" => -5, 6;
        "c1", "" => -10, 11;
        "c2", "" => -11, 12;
        "c3", "" => -12;
    ]
}

fn unsat_parts(outcome: &Outcome) -> (&whysat::Explanation, Vec<usize>, Vec<isize>, bool) {
    match outcome {
        Outcome::UnsatWithCore {
            primary_explanation,
            mus_clauses,
            hint_fallback,
            ..
        } => (
            primary_explanation,
            mus_clauses.iter().map(|clause| clause.cid).collect(),
            primary_explanation.assumption_causes.clone(),
            *hint_fallback,
        ),
        Outcome::Sat { .. } => panic!("expected an unsat outcome"),
    }
}

#[test]
fn assumption_clash_without_any_clause() {
    let input = rule_formula![
        "r1", "" => 1, 2;
        "r2", "" => -1, 2;
    ];

    let outcome = diagnose(&input, &lits![1, -1], &[]);
    let (explanation, mus, causes, _) = unsat_parts(&outcome);

    assert!(explanation.conflict_clause.is_none());
    assert_eq!(causes, vec![1, -1]);
    assert!(mus.is_empty());
}

#[test]
fn unit_propagation_chain() {
    let input = rule_formula![
        "a", "" => -1, 2;
        "b", "" => -2, 3;
        "c", "" => -3;
    ];

    let outcome = diagnose(&input, &lits![1], &[]);
    let (explanation, mus, causes, _) = unsat_parts(&outcome);

    let conflict = explanation.conflict_clause.as_ref().expect("conflict clause");
    assert_eq!(conflict.cid, 3);
    assert_eq!(conflict.rule_id, "c");
    assert_eq!(explanation.falsified_literals, vec![-3]);
    assert_eq!(causes, vec![1]);

    let mut involved: Vec<usize> = explanation
        .involved_rules
        .iter()
        .map(|clause| clause.cid)
        .collect();
    assert_eq!(involved[0], 3);
    involved.sort_unstable();
    assert_eq!(involved, vec![1, 2, 3]);

    assert_eq!(mus, vec![1, 2, 3]);
}

#[test]
fn redundant_clauses_are_excluded_from_the_core() {
    let input = rule_formula![
        "a", "" => -1, 2;
        "b", "" => -2, 3;
        "c", "" => -3;
        "d", "" => 5, 6;
        "e", "" => -5, 6;
    ];

    let outcome = diagnose(&input, &lits![1], &[]);
    let (_, mus, _, _) = unsat_parts(&outcome);

    assert_eq!(mus, vec![1, 2, 3]);
}

#[test]
fn satisfiable_instance_yields_a_model() {
    let input = rule_formula![
        "a", "" => 1, 2;
        "b", "" => -1, 3;
    ];

    match diagnose(&input, &lits![1], &[]) {
        Outcome::Sat { model, .. } => {
            assert_eq!(model.get(&1), Some(&true));
            assert_eq!(model.get(&3), Some(&true));
            assert!(model.contains_key(&2));
        }
        Outcome::UnsatWithCore { .. } => panic!("expected a model"),
    }
}

#[test]
fn unrelated_hints_fall_back_to_the_full_formula() {
    let outcome = diagnose(&filler_and_chain(), &lits![10], &lits![99]);
    let (_, mus, _, hint_fallback) = unsat_parts(&outcome);

    assert!(hint_fallback);
    assert_eq!(mus, vec![7, 8, 9]);

    match &outcome {
        Outcome::UnsatWithCore { hints_used, .. } => assert_eq!(hints_used, &vec![99]),
        Outcome::Sat { .. } => unreachable!(),
    }
}

#[test]
fn focused_hints_seed_the_shrinker() {
    let outcome = diagnose(&filler_and_chain(), &lits![10], &lits![10, 11, 12]);
    let (_, mus, _, hint_fallback) = unsat_parts(&outcome);

    assert!(!hint_fallback);
    assert_eq!(mus, vec![7, 8, 9]);
}

#[test]
fn empty_clause_is_its_own_explanation() {
    let mut input = Formula::new();
    input.add_clause(None, ClauseMeta::new("r", ""));
    input.add_clause(lits![1, 2].iter().cloned(), ClauseMeta::new("s", ""));

    let outcome = diagnose(&input, &lits![2], &[]);
    let (explanation, mus, causes, _) = unsat_parts(&outcome);

    let conflict = explanation.conflict_clause.as_ref().expect("conflict clause");
    assert_eq!(conflict.cid, 1);
    assert!(explanation.falsified_literals.is_empty());
    assert!(causes.is_empty());
    assert_eq!(mus, vec![1]);
}

#[test]
fn identical_runs_serialize_identically() {
    let input = rule_formula![
        "a", "" => -1, 2;
        "b", "" => -2, 3;
        "c", "" => -3;
        "d", "" => 5, 6;
    ];

    let first = serde_json::to_string(&diagnose(&input, &lits![1], &lits![2])).unwrap();
    let second = serde_json::to_string(&diagnose(&input, &lits![1], &lits![2])).unwrap();

    assert_eq!(first, second);
}

#[test]
fn hints_change_neither_verdict_nor_core() {
    let input = rule_formula![
        "a", "" => -1, 2;
        "b", "" => -2, 3;
        "c", "" => -3;
        "d", "" => 5, 6;
        "e", "" => -5, 6;
    ];

    let baseline = diagnose(&input, &lits![1], &[]);
    let (_, baseline_mus, _, _) = unsat_parts(&baseline);

    for hints in &[lits![2].to_vec(), lits![3].to_vec(), lits![2, 5].to_vec()] {
        let hinted = diagnose(&input, &lits![1], hints);
        let (_, mus, _, _) = unsat_parts(&hinted);
        assert_eq!(mus, baseline_mus);
    }
}

#[test]
fn sat_output_schema() {
    let input = rule_formula![
        "a", "" => 1;
    ];

    let value = serde_json::to_value(&diagnose(&input, &[], &[])).unwrap();

    assert_eq!(value["type"], "sat");
    assert_eq!(value["model"]["1"], true);
}

#[test]
fn unsat_output_schema() {
    let input = rule_formula![
        "a", "first step" => -1, 2;
        "b", "" => -2;
    ];

    let value = serde_json::to_value(&diagnose(&input, &lits![1], &[])).unwrap();

    assert_eq!(value["type"], "unsat_with_core");
    assert_eq!(value["primary_explanation"]["conflict_clause"]["cid"], 2);
    assert_eq!(value["primary_explanation"]["assumption_causes"][0], 1);
    assert_eq!(value["mus_size"], 2);
    assert_eq!(value["mus_rules"][0], "a");
    assert_eq!(value["mus_rules"][1], "b");
    assert_eq!(value["hint_fallback"], false);
    assert_eq!(value["assumptions"][0], 1);
    assert!(value["stats"]["probes"].as_u64().unwrap() >= 1);
}

fn formula_from_reports(reports: &[whysat::ClauseReport]) -> Formula {
    let mut formula = Formula::new();
    for report in reports {
        formula.add_clause(
            report.literals.iter().map(|&lit| Lit::from_dimacs(lit)),
            ClauseMeta::new(report.rule_id.clone(), report.note.clone()),
        );
    }
    formula
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The reported core is unsatisfiable, and dropping any single clause
    /// from it makes it satisfiable.
    #[test]
    fn reported_cores_are_subset_minimal(
        (enable_row, _, input) in conditional_pigeon_hole(1..3usize, 1..3usize),
    ) {
        let outcome = diagnose(&input, &enable_row, &[]);

        let mus_clauses = match &outcome {
            Outcome::UnsatWithCore { mus_clauses, .. } => mus_clauses,
            Outcome::Sat { .. } => {
                return Err(TestCaseError::fail("pigeon hole must be unsat"));
            }
        };

        let core = formula_from_reports(mus_clauses);
        prop_assert!(!diagnose(&core, &enable_row, &[]).is_sat());

        for skip in 0..mus_clauses.len() {
            let mut reports = mus_clauses.clone();
            let _ = reports.remove(skip);
            let weakened = formula_from_reports(&reports);
            prop_assert!(diagnose(&weakened, &enable_row, &[]).is_sat());
        }
    }

    /// A pure implication chain conflicts by propagation alone, so the
    /// explanation closes on exactly the assumption at the chain's root and
    /// every chain clause shows up as involved.
    #[test]
    fn chain_explanations_close_on_the_root_assumption(len in 1..12usize) {
        let mut input = Formula::new();
        for link in 1..len {
            input.add_clause(
                lits_of(&[-(link as isize), link as isize + 1]),
                ClauseMeta::new(format!("link{}", link), ""),
            );
        }
        input.add_clause(
            lits_of(&[-(len as isize)]),
            ClauseMeta::new("terminal", ""),
        );

        let outcome = diagnose(&input, &lits![1], &[]);

        let (explanation, mus, causes, _) = unsat_parts(&outcome);

        prop_assert_eq!(causes, vec![1]);

        let conflict = explanation.conflict_clause.as_ref().expect("conflict clause");
        prop_assert_eq!(explanation.involved_rules[0].cid, conflict.cid);

        let mut involved: Vec<usize> = explanation
            .involved_rules
            .iter()
            .map(|clause| clause.cid)
            .collect();
        involved.sort_unstable();
        prop_assert_eq!(involved, (1..=len).collect::<Vec<_>>());

        prop_assert_eq!(mus, (1..=len).collect::<Vec<_>>());
    }
}
