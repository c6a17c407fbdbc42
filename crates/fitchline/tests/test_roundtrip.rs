//! Integration tests for theorem export, catalog round trips, and reuse

use fitchline::{
    apply_backward, builtin_registry, justify, load_catalog, write_theorem_file, LineRef, Op,
    Proof, Registry, Term,
};

/// Prove (and q p) from (and p q) and export it
fn prove_commuted_conjunction() -> fitchline::Roth {
    let registry = builtin_registry().unwrap();
    let p = Term::atom("p");
    let q = Term::atom("q");
    let mut proof = Proof::new(
        vec![Term::compound(Op::And, vec![p.clone(), q.clone()])],
        Term::compound(Op::And, vec![q, p]),
    );

    let opened = apply_backward(&registry, &mut proof, "and-i", 2).unwrap();
    let (first, second) = match opened.obligations[..] {
        [LineRef::Line(a), LineRef::Line(b)] => (a, b),
        _ => panic!("expected two line obligations"),
    };
    justify(&registry, &mut proof, "and-e2", first).unwrap();
    justify(&registry, &mut proof, "and-e1", second).unwrap();
    justify(&registry, &mut proof, "and-i", 2).unwrap();

    proof.export_theorem("and-comm").unwrap()
}

#[test]
fn test_export_requires_complete_proof() {
    let proof = Proof::new(vec![Term::atom("p")], Term::atom("q"));
    let err = proof.export_theorem("nope").unwrap_err();
    assert!(matches!(
        err,
        fitchline::EngineError::IncompleteProof { positions } if !positions.is_empty()
    ));
}

#[test]
fn test_exported_theorem_registers_and_applies() {
    let theorem = prove_commuted_conjunction();
    assert!(theorem.is_theorem());

    let mut registry = builtin_registry().unwrap();
    registry.register(theorem).unwrap();

    // the theorem now applies exactly like a rule
    let p = Term::atom("p");
    let q = Term::atom("q");
    let mut proof = Proof::new(
        vec![Term::compound(Op::And, vec![p.clone(), q.clone()])],
        Term::compound(Op::And, vec![q, p]),
    );
    let applied = justify(&registry, &mut proof, "and-comm", 2).unwrap();
    assert_eq!(applied.references, vec![LineRef::Line(1)]);
    assert!(proof.is_complete().is_ok());
}

#[test]
fn test_theorem_file_round_trip() {
    let theorem = prove_commuted_conjunction();

    let mut registry = Registry::new();
    registry.register(theorem).unwrap();
    let exported = write_theorem_file(&registry);
    assert!(exported.starts_with("; fitchline catalog\n; generated at "));

    let mut fresh = Registry::new();
    let report = load_catalog(&exported, &mut fresh).unwrap();
    assert_eq!(report.loaded, vec!["and-comm"]);
    assert!(report.rejected.is_empty());

    // identical given/conclusion and compiled structures
    let original = registry.get("and-comm").unwrap();
    let reloaded = fresh.get("and-comm").unwrap();
    assert_eq!(original.roth.given, reloaded.roth.given);
    assert_eq!(original.roth.conclusion, reloaded.roth.conclusion);
    assert_eq!(original.forward, reloaded.forward);
    assert_eq!(original.backward, reloaded.backward);

    // regenerating from the reloaded registry reproduces the records
    let again = write_theorem_file(&fresh);
    let original_records: Vec<&str> =
        exported.lines().filter(|l| !l.starts_with(';')).collect();
    let reloaded_records: Vec<&str> = again.lines().filter(|l| !l.starts_with(';')).collect();
    assert_eq!(original_records, reloaded_records);
}

#[test]
fn test_partial_catalog_import() {
    let text = "
        ; a good record, a malformed record, and a duplicate
        (rule double (given phi) (conclusion (and phi phi)))
        (rule broken (given phi))
        (rule double (given psi) (conclusion psi))
    ";
    let mut registry = builtin_registry().unwrap();
    let before = registry.len();
    let report = load_catalog(text, &mut registry).unwrap();

    assert_eq!(report.loaded, vec!["double"]);
    assert_eq!(report.rejected.len(), 2);
    assert_eq!(registry.len(), before + 1);
}
