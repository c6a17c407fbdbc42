//! Conversion of parsed forms into roths and proofs, with per-record
//! schema validation

use super::sexpr::{parse_forms, Sexpr};
use crate::error::EngineError;
use crate::logic::{metavar_kind, Op, Pattern, Relator, Term};
use crate::proof::{Element, Justification, LineContent, LineRef, Proof, ProofLine, Subproof};
use crate::registry::{Registry, Roth};
use std::collections::HashSet;

/// Outcome of a catalog import: every record either loads or is rejected
/// individually.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub rejected: Vec<EngineError>,
}

/// Import every record of a catalog text into the registry. Malformed or
/// conflicting records are rejected one by one; the import as a whole fails
/// only when the text does not parse or no record survives.
pub fn load_catalog(text: &str, registry: &mut Registry) -> Result<LoadReport, EngineError> {
    let forms = parse_forms(text).map_err(|reason| EngineError::InvalidDefinition {
        record: "<catalog>".to_string(),
        reason,
    })?;

    let mut report = LoadReport::default();
    for form in &forms {
        let outcome = roth_from_record(form).and_then(|roth| {
            let id = roth.id.clone();
            registry.register(roth)?;
            Ok(id)
        });
        match outcome {
            Ok(id) => report.loaded.push(id),
            Err(err) => report.rejected.push(err),
        }
    }
    if report.loaded.is_empty() && !report.rejected.is_empty() {
        return Err(EngineError::InvalidDefinition {
            record: "<catalog>".to_string(),
            reason: format!("all {} records are invalid", report.rejected.len()),
        });
    }
    Ok(report)
}

fn invalid(record: &str, reason: String) -> EngineError {
    EngineError::InvalidDefinition {
        record: record.to_string(),
        reason,
    }
}

/// Convert one top-level form into a roth
pub fn roth_from_record(form: &Sexpr) -> Result<Roth, EngineError> {
    let items = form
        .as_list()
        .ok_or_else(|| invalid("<unnamed>", "record must be a list".to_string()))?;
    let kind = items
        .first()
        .and_then(Sexpr::as_sym)
        .ok_or_else(|| invalid("<unnamed>", "record must start with rule/theorem".to_string()))?;
    if kind != "rule" && kind != "theorem" {
        return Err(invalid(
            "<unnamed>",
            format!("unknown record kind '{}'", kind),
        ));
    }
    let id = items
        .get(1)
        .and_then(Sexpr::as_sym)
        .ok_or_else(|| invalid("<unnamed>", "record is missing its id".to_string()))?;

    let mut given: Option<Vec<Pattern>> = None;
    let mut extra: Option<Vec<Pattern>> = None;
    let mut conclusion: Option<Vec<Pattern>> = None;
    let mut proof: Option<Proof> = None;

    for field in &items[2..] {
        let parts = field
            .as_list()
            .ok_or_else(|| invalid(id, format!("stray token '{}' in record", field)))?;
        let name = parts
            .first()
            .and_then(Sexpr::as_sym)
            .ok_or_else(|| invalid(id, "field must start with a name".to_string()))?;
        let body = &parts[1..];
        match name {
            "given" | "extra" | "conclusion" => {
                let patterns = body
                    .iter()
                    .map(pattern_from_sexpr)
                    .collect::<Result<Vec<_>, String>>()
                    .map_err(|reason| invalid(id, format!("in field '{}': {}", name, reason)))?;
                let slot = match name {
                    "given" => &mut given,
                    "extra" => &mut extra,
                    _ => &mut conclusion,
                };
                if slot.replace(patterns).is_some() {
                    return Err(invalid(id, format!("duplicate field '{}'", name)));
                }
            }
            "proof" => {
                let parsed = proof_from_sexprs(body)
                    .map_err(|reason| invalid(id, format!("in field 'proof': {}", reason)))?;
                if proof.replace(parsed).is_some() {
                    return Err(invalid(id, "duplicate field 'proof'".to_string()));
                }
            }
            other => return Err(invalid(id, format!("unknown field '{}'", other))),
        }
    }

    match (kind, &proof) {
        ("rule", Some(_)) => return Err(invalid(id, "a rule carries no proof".to_string())),
        ("theorem", None) => return Err(invalid(id, "a theorem requires a proof".to_string())),
        _ => {}
    }

    let roth = Roth {
        id: id.to_string(),
        given: given.unwrap_or_default(),
        extra: extra.unwrap_or_default(),
        conclusion: conclusion
            .ok_or_else(|| invalid(id, "missing field 'conclusion'".to_string()))?,
        proof,
    };
    roth.validate()?;
    Ok(roth)
}

/// Convert an s-expression into a pattern (term, or `infer` at top level)
pub fn pattern_from_sexpr(sx: &Sexpr) -> Result<Pattern, String> {
    if let Some(items) = sx.as_list() {
        if items.first().and_then(Sexpr::as_sym) == Some("infer") {
            if items.len() != 3 {
                return Err("infer takes a local list and a goal".to_string());
            }
            let locals = items[1]
                .as_list()
                .ok_or_else(|| "infer locals must be a list".to_string())?
                .iter()
                .map(term_from_sexpr)
                .collect::<Result<Vec<_>, _>>()?;
            let goal = term_from_sexpr(&items[2])?;
            return Ok(Pattern::infer(locals, goal));
        }
    }
    term_from_sexpr(sx).map(Pattern::Term)
}

/// Convert an s-expression into a term, enforcing the fixed operator
/// vocabulary and its arities
pub fn term_from_sexpr(sx: &Sexpr) -> Result<Term, String> {
    match sx {
        Sexpr::Sym(name) => Ok(match name.as_str() {
            "truth" => Term::Truth,
            "contradiction" => Term::Contradiction,
            _ => {
                if metavar_kind(name).is_some() {
                    Term::var(name)
                } else {
                    Term::atom(name)
                }
            }
        }),
        Sexpr::Nat(n) => Ok(Term::atom(&n.to_string())),
        Sexpr::List(items) => {
            let head = items
                .first()
                .and_then(Sexpr::as_sym)
                .ok_or_else(|| "compound term must start with an operator".to_string())?;
            let args = &items[1..];
            match head {
                "at" => {
                    if args.len() != 2 {
                        return Err(format!("'at' takes 2 arguments, got {}", args.len()));
                    }
                    let formula = term_from_sexpr(&args[0])?;
                    let time = term_from_sexpr(&args[1])?;
                    if !time.is_time_term() {
                        return Err(format!("'{}' is not a time point", time));
                    }
                    Ok(Term::indexed(formula, time))
                }
                "rel" => {
                    let relator = args
                        .first()
                        .and_then(Sexpr::as_sym)
                        .and_then(Relator::from_name)
                        .ok_or_else(|| "rel requires a relator (=, <=, succ, or)".to_string())?;
                    let operands = args[1..]
                        .iter()
                        .map(term_from_sexpr)
                        .collect::<Result<Vec<_>, _>>()?;
                    match relator.arity() {
                        Some(n) if operands.len() != n => {
                            return Err(format!(
                                "relator '{}' takes {} operands, got {}",
                                relator.name(),
                                n,
                                operands.len()
                            ));
                        }
                        None if operands.len() < 2 => {
                            return Err("relational 'or' takes at least 2 disjuncts".to_string());
                        }
                        _ => {}
                    }
                    if relator == Relator::Or {
                        if let Some(bad) =
                            operands.iter().find(|t| !matches!(t, Term::Rel(_, _)))
                        {
                            return Err(format!("'{}' is not a relational atom", bad));
                        }
                    } else if let Some(bad) = operands.iter().find(|t| !t.is_time_term()) {
                        return Err(format!("'{}' is not a time point", bad));
                    }
                    Ok(Term::rel(relator, operands))
                }
                "infer" => Err("infer is only allowed as a hypothesis pattern".to_string()),
                _ => {
                    let op = Op::from_name(head)
                        .ok_or_else(|| format!("unknown operator '{}'", head))?;
                    let operands = args
                        .iter()
                        .map(term_from_sexpr)
                        .collect::<Result<Vec<_>, _>>()?;
                    match op.arity() {
                        Some(n) if operands.len() != n => Err(format!(
                            "operator '{}' takes {} arguments, got {}",
                            op.name(),
                            n,
                            operands.len()
                        )),
                        None if operands.len() < 2 => Err(format!(
                            "operator '{}' takes at least 2 arguments",
                            op.name()
                        )),
                        _ => Ok(Term::compound(op, operands)),
                    }
                }
            }
        }
    }
}

/// Rebuild a proof from the body of a `(proof ...)` field
pub fn proof_from_sexprs(items: &[Sexpr]) -> Result<Proof, String> {
    let mut seen = HashSet::new();
    let elements = items
        .iter()
        .map(|item| element_from_sexpr(item, &mut seen))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Proof::from_parts(elements))
}

fn element_from_sexpr(sx: &Sexpr, seen: &mut HashSet<u32>) -> Result<Element, String> {
    let items = sx
        .as_list()
        .ok_or_else(|| format!("expected (line ...) or (subproof ...), got '{}'", sx))?;
    match items.first().and_then(Sexpr::as_sym) {
        Some("subproof") => {
            let elements = items[1..]
                .iter()
                .map(|item| element_from_sexpr(item, seen))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Element::Subproof(Subproof::new(elements)))
        }
        Some("line") => {
            let id = items
                .get(1)
                .and_then(Sexpr::as_nat)
                .ok_or_else(|| "line requires a numeric id".to_string())?
                as u32;
            if !seen.insert(id) {
                return Err(format!("duplicate line id {}", id));
            }
            if items.get(2).and_then(Sexpr::as_sym) == Some("todo") {
                return Ok(Element::Line(ProofLine::placeholder(id)));
            }
            if items.len() != 5 {
                return Err(format!("malformed line {}", id));
            }
            let formula = term_from_sexpr(&items[2])?;
            let justification = justification_from_sexpr(&items[3])?;
            let references = items[4]
                .as_list()
                .ok_or_else(|| format!("line {} references must be a list", id))?
                .iter()
                .map(line_ref_from_sexpr)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Element::Line(ProofLine {
                id,
                content: LineContent::Formula(formula),
                justification,
                references,
            }))
        }
        _ => Err(format!("expected (line ...) or (subproof ...), got '{}'", sx)),
    }
}

fn justification_from_sexpr(sx: &Sexpr) -> Result<Option<Justification>, String> {
    match sx {
        Sexpr::Sym(s) if s == "premise" => Ok(Some(Justification::Premise)),
        Sexpr::Sym(s) if s == "open" => Ok(None),
        Sexpr::List(items)
            if items.first().and_then(Sexpr::as_sym) == Some("by") && items.len() == 2 =>
        {
            let rule = items[1]
                .as_sym()
                .ok_or_else(|| "by requires a rule id".to_string())?;
            Ok(Some(Justification::Rule(rule.to_string())))
        }
        other => Err(format!("malformed justification '{}'", other)),
    }
}

fn line_ref_from_sexpr(sx: &Sexpr) -> Result<LineRef, String> {
    match sx {
        Sexpr::Nat(n) => Ok(LineRef::Line(*n as u32)),
        Sexpr::List(items) if items.len() == 2 => {
            let a = items[0]
                .as_nat()
                .ok_or_else(|| format!("malformed reference '{}'", sx))?;
            let b = items[1]
                .as_nat()
                .ok_or_else(|| format!("malformed reference '{}'", sx))?;
            Ok(LineRef::Range(a as u32, b as u32))
        }
        other => Err(format!("malformed reference '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_conversion() {
        let forms = parse_forms("(and phi (not p)) (at (always phi) i) (rel <= i j)").unwrap();
        assert_eq!(
            term_from_sexpr(&forms[0]).unwrap(),
            Term::compound(
                Op::And,
                vec![
                    Term::var("phi"),
                    Term::compound(Op::Not, vec![Term::atom("p")])
                ]
            )
        );
        assert!(matches!(
            term_from_sexpr(&forms[1]).unwrap(),
            Term::Indexed(_, _)
        ));
        assert!(matches!(
            term_from_sexpr(&forms[2]).unwrap(),
            Term::Rel(Relator::LessEq, _)
        ));
    }

    #[test]
    fn test_arity_enforced() {
        let forms = parse_forms("(not p q) (imp p) (rel <= i) (at p (not q))").unwrap();
        for form in &forms {
            assert!(term_from_sexpr(form).is_err(), "accepted '{}'", form);
        }
    }

    #[test]
    fn test_rule_record() {
        let forms =
            parse_forms("(rule and-i (given phi psi) (conclusion (and phi psi)))").unwrap();
        let roth = roth_from_record(&forms[0]).unwrap();
        assert_eq!(roth.id, "and-i");
        assert_eq!(roth.given.len(), 2);
        assert!(!roth.is_theorem());
    }

    #[test]
    fn test_record_validation_errors() {
        let bad = [
            "(rule)",
            "(widget w (conclusion p))",
            "(rule r1 (given phi))",
            "(rule r2 (conclusion p) (conclusion q))",
            "(rule r3 (mystery p) (conclusion p))",
            "(rule r4 (extra (infer (p) q)) (conclusion p))",
            "(theorem t1 (given p) (conclusion p))",
        ];
        for text in bad {
            let forms = parse_forms(text).unwrap();
            assert!(
                matches!(
                    roth_from_record(&forms[0]),
                    Err(EngineError::InvalidDefinition { .. })
                ),
                "accepted '{}'",
                text
            );
        }
    }

    #[test]
    fn test_partial_import() {
        let text = "
            (rule good (given phi) (conclusion phi))
            (rule bad (given phi))
            (rule good (given phi) (conclusion phi))
        ";
        let mut registry = Registry::new();
        let report = load_catalog(text, &mut registry).unwrap();
        assert_eq!(report.loaded, vec!["good"]);
        assert_eq!(report.rejected.len(), 2);
        assert!(matches!(
            report.rejected[1],
            EngineError::RegistryConflict(_)
        ));
    }

    #[test]
    fn test_all_invalid_import_fails() {
        let mut registry = Registry::new();
        assert!(load_catalog("(rule bad (given phi))", &mut registry).is_err());
    }

    #[test]
    fn test_theorem_with_proof() {
        let text = "
            (theorem self (given p) (conclusion p)
              (proof
                (line 1 p premise ())
                (line 2 p (by copy) (1))))
        ";
        let forms = parse_forms(text).unwrap();
        let roth = roth_from_record(&forms[0]).unwrap();
        assert!(roth.is_theorem());
        let proof = roth.proof.unwrap();
        assert!(proof.is_complete().is_ok());
    }

    #[test]
    fn test_duplicate_line_id_rejected() {
        let text = "
            (theorem dup (given p) (conclusion p)
              (proof
                (line 1 p premise ())
                (line 1 p (by copy) (1))))
        ";
        let forms = parse_forms(text).unwrap();
        assert!(roth_from_record(&forms[0]).is_err());
    }
}
