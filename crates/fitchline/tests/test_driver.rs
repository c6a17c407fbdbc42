//! Integration tests driving whole proofs through the engine

use fitchline::{
    applicable_rules, apply_backward, builtin_registry, justify, EngineError, LineRef, Op, Proof,
    ProofLine, Registry, Relator, Subproof, Term,
};
use fitchline::{Element, LineId};

fn imp(a: Term, b: Term) -> Term {
    Term::compound(Op::Imp, vec![a, b])
}

fn setup() -> Registry {
    builtin_registry().unwrap()
}

#[test]
fn test_conjunction_scenario() {
    let registry = setup();
    let mut proof = Proof::new(
        vec![Term::atom("A"), Term::atom("B")],
        Term::compound(Op::And, vec![Term::atom("A"), Term::atom("B")]),
    );

    let applied = justify(&registry, &mut proof, "and-i", 3).unwrap();
    assert_eq!(applied.references, vec![LineRef::Line(1), LineRef::Line(2)]);
    assert!(proof.all_lines().iter().all(|line| !line.is_placeholder()));
    assert!(proof.is_complete().is_ok());
}

#[test]
fn test_negation_introduction_proof() {
    // from (imp p contradiction), prove (not p)
    let registry = setup();
    let mut proof = Proof::new(
        vec![imp(Term::atom("p"), Term::Contradiction)],
        Term::compound(Op::Not, vec![Term::atom("p")]),
    );

    let opened = apply_backward(&registry, &mut proof, "not-i", 2).unwrap();
    let LineRef::Range(_, subgoal) = opened.obligations[0] else {
        panic!("expected a subproof obligation");
    };
    assert!(proof.is_complete().is_err());

    // inside the subproof: contradiction by imp-e from the premise and the
    // local assumption p
    justify(&registry, &mut proof, "imp-e", subgoal).unwrap();
    // close the goal citing the discharged subproof
    justify(&registry, &mut proof, "not-i", 2).unwrap();
    assert!(proof.is_complete().is_ok());
}

#[test]
fn test_disjunction_elimination_proof() {
    // from (or p q), (imp p r), (imp q r), prove r
    let registry = setup();
    let p = Term::atom("p");
    let q = Term::atom("q");
    let r = Term::atom("r");
    let mut proof = Proof::new(
        vec![
            Term::compound(Op::Or, vec![p.clone(), q.clone()]),
            imp(p.clone(), r.clone()),
            imp(q.clone(), r.clone()),
        ],
        r.clone(),
    );
    let goal: LineId = 4;

    // open one case subproof per disjunct by hand
    let mut case_goals = Vec::new();
    for hypothesis in [p, q] {
        let local = proof.fresh_id();
        let inner = proof.fresh_id();
        let sub = Subproof::new(vec![
            Element::Line(ProofLine::premise(local, hypothesis)),
            Element::Line(ProofLine::unproved(inner, r.clone())),
        ]);
        proof.insert_before(goal, Element::Subproof(sub)).unwrap();
        case_goals.push(inner);
    }
    proof.normalize_placeholders();

    for inner in case_goals {
        justify(&registry, &mut proof, "imp-e", inner).unwrap();
    }
    let applied = justify(&registry, &mut proof, "or-e", goal).unwrap();
    assert_eq!(applied.references.len(), 3);
    assert!(matches!(applied.references[0], LineRef::Line(1)));
    assert!(matches!(applied.references[1], LineRef::Range(_, _)));
    assert!(matches!(applied.references[2], LineRef::Range(_, _)));
    assert!(proof.is_complete().is_ok());
}

#[test]
fn test_linear_order_case_split() {
    // (rel or (rel <= t0 t1) (rel <= t1 t0)) holds by linearity
    let registry = setup();
    let goal = Term::rel(
        Relator::Or,
        vec![
            Term::rel(Relator::LessEq, vec![Term::atom("t0"), Term::atom("t1")]),
            Term::rel(Relator::LessEq, vec![Term::atom("t1"), Term::atom("t0")]),
        ],
    );
    let mut proof = Proof::new(vec![], goal);

    let applied = justify(&registry, &mut proof, "<=linear", 1).unwrap();
    assert!(applied.references.is_empty());
    assert_eq!(applied.binding.get("i"), Some(&Term::atom("t0")));
    assert_eq!(applied.binding.get("j"), Some(&Term::atom("t1")));
    assert!(proof.is_complete().is_ok());
}

#[test]
fn test_temporal_chain() {
    // from (at (always p) t0), (rel succ t0 t1), prove (at p t1)
    let registry = setup();
    let always_p = Term::indexed(
        Term::compound(Op::Always, vec![Term::atom("p")]),
        Term::atom("t0"),
    );
    let succ = Term::rel(Relator::Succ, vec![Term::atom("t0"), Term::atom("t1")]);
    let goal = Term::indexed(Term::atom("p"), Term::atom("t1"));
    let mut proof = Proof::new(vec![always_p, succ], goal);

    // the ordering fact (rel <= t0 t1) is needed first
    let le = Term::rel(Relator::LessEq, vec![Term::atom("t0"), Term::atom("t1")]);
    let le_id = proof.fresh_id();
    proof
        .insert_after(2, Element::Line(ProofLine::unproved(le_id, le)))
        .unwrap();
    proof.normalize_placeholders();

    justify(&registry, &mut proof, "succ-<=", le_id).unwrap();
    justify(&registry, &mut proof, "always-e", 3).unwrap();
    assert!(proof.is_complete().is_ok());
}

#[test]
fn test_applicable_rules_suggestions() {
    let registry = setup();
    let mut proof = Proof::new(
        vec![Term::atom("A"), Term::atom("B")],
        Term::compound(Op::And, vec![Term::atom("A"), Term::atom("B")]),
    );

    let rules = applicable_rules(&registry, &proof, 3).unwrap();
    assert!(rules.contains(&"and-i".to_string()));

    // after justification the target is settled and suggestions are a
    // scope violation
    justify(&registry, &mut proof, "and-i", 3).unwrap();
    assert!(matches!(
        applicable_rules(&registry, &proof, 3),
        Err(EngineError::ScopeViolation(_))
    ));
}

#[test]
fn test_match_failures_leave_tree_untouched() {
    let registry = setup();
    let mut proof = Proof::new(
        vec![Term::atom("A")],
        Term::compound(Op::Or, vec![Term::atom("B"), Term::atom("C")]),
    );
    let before = proof.clone();

    for rule in ["or-i1", "or-i2", "and-i", "imp-e"] {
        assert!(matches!(
            justify(&registry, &mut proof, rule, 2),
            Err(EngineError::MatchFailure { .. })
        ));
        assert_eq!(proof, before);
    }
}
