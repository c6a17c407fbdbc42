//! The deduction driver: applies compiled rule structures to a proof tree
//!
//! Forward application matches a rule's premise slots against the content
//! visible from a target line and justifies the target; backward application
//! unifies a rule conclusion with a goal and opens the residual obligations.

use crate::error::EngineError;
use crate::logic::{Substitution, Term};
use crate::matching::{match_infer, match_with_subst, MatchError};
use crate::proof::{Element, Justification, LineId, LineRef, Proof, ProofLine, Subproof};
use crate::registry::{Obligation, Registry, Slot};

/// Outcome of a successful forward justification
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub rule: String,
    pub target: LineId,
    pub references: Vec<LineRef>,
    pub binding: Substitution,
}

/// Outcome of a backward application: the obligations opened before the goal
#[derive(Debug, Clone, PartialEq)]
pub struct Opened {
    pub rule: String,
    pub goal: LineId,
    pub obligations: Vec<LineRef>,
}

/// Content a premise slot may match: a justified visible line, or a whole
/// discharged visible subproof.
#[derive(Debug, Clone)]
enum Candidate {
    Line {
        id: LineId,
        term: Term,
    },
    Sub {
        first: LineId,
        last: LineId,
        locals: Vec<Term>,
        goal: Term,
    },
}

/// A subproof is citable once discharged: every line justified and a
/// derived closing line.
fn discharged(sub: &Subproof) -> Option<Candidate> {
    if sub.all_lines().iter().any(|line| line.is_unproved()) {
        return None;
    }
    let closing = sub.closing_line()?;
    if !matches!(closing.justification, Some(Justification::Rule(_))) {
        return None;
    }
    let goal = closing.formula()?.clone();
    let locals: Vec<Term> = sub.local_premises().into_iter().cloned().collect();
    Some(Candidate::Sub {
        first: sub.first_line_id()?,
        last: sub.last_line_id()?,
        locals,
        goal,
    })
}

fn candidates(proof: &Proof, target: LineId) -> Result<Vec<Candidate>, EngineError> {
    let mut out = Vec::new();
    for element in proof.scope_of(target)? {
        match element {
            Element::Line(line) if line.id != target && line.is_justified() => {
                if let Some(term) = line.formula() {
                    out.push(Candidate::Line {
                        id: line.id,
                        term: term.clone(),
                    });
                }
            }
            Element::Subproof(sub) => {
                if let Some(candidate) = discharged(sub) {
                    out.push(candidate);
                }
            }
            _ => {}
        }
    }
    Ok(out)
}

fn try_slot(slot: &Slot, candidate: &Candidate, subst: &Substitution) -> Option<(Substitution, LineRef)> {
    match (slot, candidate) {
        (Slot::Plain(pattern), Candidate::Line { id, term }) => {
            let mut trial = subst.clone();
            match_with_subst(pattern, term, &mut trial)
                .ok()
                .map(|_| (trial, LineRef::Line(*id)))
        }
        (
            Slot::Infer {
                locals: local_pats,
                goal: goal_pat,
            },
            Candidate::Sub {
                first,
                last,
                locals,
                goal,
            },
        ) => {
            let mut trial = subst.clone();
            match_infer(local_pats, goal_pat, locals, goal, &mut trial)
                .ok()
                .map(|_| (trial, LineRef::Range(*first, *last)))
        }
        _ => None,
    }
}

/// Backtracking assignment of candidates to slots, in slot order, closing
/// with a conclusion match against the target formula. First full
/// assignment wins, so the result is deterministic in scope order.
fn search(
    slots: &[Slot],
    conclusions: &[Term],
    target: &Term,
    candidates: &[Candidate],
    subst: &mut Substitution,
    refs: &mut Vec<LineRef>,
) -> bool {
    let Some((slot, rest)) = slots.split_first() else {
        for conclusion in conclusions {
            let mut trial = subst.clone();
            if match_with_subst(conclusion, target, &mut trial).is_ok() {
                *subst = trial;
                return true;
            }
        }
        return false;
    };
    for candidate in candidates {
        if let Some((mut trial, r)) = try_slot(slot, candidate, subst) {
            refs.push(r);
            if search(rest, conclusions, target, candidates, &mut trial, refs) {
                *subst = trial;
                return true;
            }
            refs.pop();
        }
    }
    false
}

fn lookup<'a>(
    registry: &'a Registry,
    rule_id: &str,
) -> Result<&'a crate::registry::CompiledRoth, EngineError> {
    registry
        .get(rule_id)
        .ok_or_else(|| EngineError::ScopeViolation(format!("unknown rule '{}'", rule_id)))
}

fn open_target(proof: &Proof, target: LineId) -> Result<Term, EngineError> {
    let line = proof
        .line(target)
        .ok_or_else(|| EngineError::ScopeViolation(format!("no line with id {}", target)))?;
    if !line.is_unproved() {
        return Err(EngineError::ScopeViolation(format!(
            "line {} is not an open obligation",
            target
        )));
    }
    match line.formula() {
        Some(term) => Ok(term.clone()),
        None => Err(EngineError::ScopeViolation(format!(
            "line {} holds no formula",
            target
        ))),
    }
}

/// Pure forward instantiation: conclusions of a rule under a binding
pub fn derive_forward(
    registry: &Registry,
    rule_id: &str,
    subst: &Substitution,
) -> Result<Vec<Term>, EngineError> {
    Ok(lookup(registry, rule_id)?.forward.instantiate(subst))
}

fn forward_match(
    registry: &Registry,
    proof: &Proof,
    rule_id: &str,
    target: LineId,
) -> Result<(Substitution, Vec<LineRef>), EngineError> {
    let compiled = lookup(registry, rule_id)?;
    let goal = open_target(proof, target)?;
    let candidates = candidates(proof, target)?;

    let mut subst = Substitution::new();
    let mut refs = Vec::new();
    if search(
        &compiled.forward.slots,
        &compiled.forward.conclusion,
        &goal,
        &candidates,
        &mut subst,
        &mut refs,
    ) {
        Ok((subst, refs))
    } else {
        Err(EngineError::MatchFailure {
            rule: rule_id.to_string(),
            reason: MatchError::NoAssignment,
        })
    }
}

fn commit(
    proof: &mut Proof,
    rule_id: &str,
    target: LineId,
    subst: Substitution,
    refs: Vec<LineRef>,
) -> Result<Applied, EngineError> {
    {
        let line = proof
            .line_mut(target)
            .ok_or_else(|| EngineError::ScopeViolation(format!("no line with id {}", target)))?;
        line.justification = Some(Justification::Rule(rule_id.to_string()));
        line.references = refs.clone();
    }
    proof.normalize_placeholders();
    Ok(Applied {
        rule: rule_id.to_string(),
        target,
        references: refs,
        binding: subst,
    })
}

/// Justify an open line by the named rule, searching its visible scope for
/// the rule's premises.
pub fn justify(
    registry: &Registry,
    proof: &mut Proof,
    rule_id: &str,
    target: LineId,
) -> Result<Applied, EngineError> {
    let (subst, refs) = forward_match(registry, proof, rule_id, target)?;
    commit(proof, rule_id, target, subst, refs)
}

/// Justify an open line by the named rule with caller-chosen references.
pub fn justify_with(
    registry: &Registry,
    proof: &mut Proof,
    rule_id: &str,
    target: LineId,
    refs: &[LineRef],
) -> Result<Applied, EngineError> {
    let compiled = lookup(registry, rule_id)?;
    let goal = open_target(proof, target)?;
    if compiled.forward.slots.len() != refs.len() {
        return Err(EngineError::ScopeViolation(format!(
            "rule '{}' takes {} references, got {}",
            rule_id,
            compiled.forward.slots.len(),
            refs.len()
        )));
    }

    let visible = candidates(proof, target)?;
    let mut subst = Substitution::new();
    for (slot, r) in compiled.forward.slots.iter().zip(refs.iter()) {
        let candidate = visible
            .iter()
            .find(|candidate| match (r, candidate) {
                (LineRef::Line(id), Candidate::Line { id: cid, .. }) => id == cid,
                (LineRef::Range(a, b), Candidate::Sub { first, last, .. }) => {
                    a == first && b == last
                }
                _ => false,
            })
            .ok_or_else(|| {
                EngineError::ScopeViolation(format!(
                    "reference {} is not visible and discharged from line {}",
                    r, target
                ))
            })?;
        let (extended, _) = try_slot(slot, candidate, &subst).ok_or_else(|| {
            EngineError::MatchFailure {
                rule: rule_id.to_string(),
                reason: MatchError::NoAssignment,
            }
        })?;
        subst = extended;
    }

    let mut matched = false;
    for conclusion in &compiled.forward.conclusion {
        let mut trial = subst.clone();
        if match_with_subst(conclusion, &goal, &mut trial).is_ok() {
            subst = trial;
            matched = true;
            break;
        }
    }
    if !matched {
        return Err(EngineError::MatchFailure {
            rule: rule_id.to_string(),
            reason: MatchError::NoAssignment,
        });
    }
    commit(proof, rule_id, target, subst, refs.to_vec())
}

/// Ids of every registered rule whose forward application would succeed at
/// the target. Match failures are consumed silently.
pub fn applicable_rules(
    registry: &Registry,
    proof: &Proof,
    target: LineId,
) -> Result<Vec<String>, EngineError> {
    // surface scope problems once, up front
    open_target(proof, target)?;
    let mut out = Vec::new();
    for id in registry.ids() {
        match forward_match(registry, proof, id, target) {
            Ok(_) => out.push(id.to_string()),
            Err(EngineError::MatchFailure { .. }) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(out)
}

/// Apply a rule backward at an open goal: unify a conclusion pattern with
/// the goal formula and insert the residual obligations before it. The goal
/// stays open; it is justified later by a forward application citing the
/// discharged obligations.
pub fn apply_backward(
    registry: &Registry,
    proof: &mut Proof,
    rule_id: &str,
    goal: LineId,
) -> Result<Opened, EngineError> {
    let compiled = lookup(registry, rule_id)?;
    let goal_term = open_target(proof, goal)?;

    let mut subst = None;
    for conclusion in &compiled.backward.conclusion {
        let mut trial = Substitution::new();
        if match_with_subst(conclusion, &goal_term, &mut trial).is_ok() {
            subst = Some(trial);
            break;
        }
    }
    let subst = subst.ok_or_else(|| EngineError::MatchFailure {
        rule: rule_id.to_string(),
        reason: MatchError::NoAssignment,
    })?;

    let mut created = Vec::new();
    let mut elements = Vec::new();
    for obligation in &compiled.backward.obligations {
        match obligation {
            Obligation::Line(term) => {
                let id = proof.fresh_id();
                elements.push(Element::Line(ProofLine::unproved(id, term.apply(&subst))));
                created.push(LineRef::Line(id));
            }
            Obligation::Cases(disjuncts) => {
                for disjunct in disjuncts {
                    let id = proof.fresh_id();
                    elements.push(Element::Line(ProofLine::unproved(
                        id,
                        disjunct.apply(&subst),
                    )));
                    created.push(LineRef::Line(id));
                }
            }
            Obligation::Subproof {
                locals,
                goal: subgoal,
            } => {
                let mut inner = Vec::new();
                let mut first = None;
                for local in locals {
                    let id = proof.fresh_id();
                    first.get_or_insert(id);
                    inner.push(Element::Line(ProofLine::premise(id, local.apply(&subst))));
                }
                let subgoal_id = proof.fresh_id();
                let first = first.unwrap_or(subgoal_id);
                inner.push(Element::Line(ProofLine::unproved(
                    subgoal_id,
                    subgoal.apply(&subst),
                )));
                elements.push(Element::Subproof(Subproof::new(inner)));
                created.push(LineRef::Range(first, subgoal_id));
            }
        }
    }

    for element in elements {
        proof.insert_before(goal, element)?;
    }
    proof.normalize_placeholders();
    Ok(Opened {
        rule: rule_id.to_string(),
        goal,
        obligations: created,
    })
}
