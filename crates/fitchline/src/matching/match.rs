//! One-way matching of rule patterns against concrete terms

use crate::logic::term::VarKind;
use crate::logic::{Relator, Substitution, Term};
use thiserror::Error;

/// Result of a matching attempt
pub type MatchResult = Result<(), MatchError>;

/// Why a match failed. Recoverable: callers try the next candidate or rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("operator clash: {0} vs {1}")]
    OperatorClash(String, String),
    #[error("arity mismatch: {0} vs {1}")]
    ArityMismatch(usize, usize),
    #[error("rigid symbol clash: {0} vs {1}")]
    SymbolClash(String, String),
    #[error("metavariable {0} is already bound to a different term")]
    BindingMismatch(String),
    #[error("time metavariable {0} cannot bind a non-time term")]
    KindMismatch(String),
    #[error("no operand assignment matches")]
    NoAssignment,
    #[error("term shapes differ")]
    Shape,
}

/// Match `pattern` against `term`, returning the binding of the pattern's
/// metavariables. Only the pattern side may contain metavariables.
pub fn match_terms(pattern: &Term, term: &Term) -> Result<Substitution, MatchError> {
    let mut subst = Substitution::new();
    match_with_subst(pattern, term, &mut subst)?;
    Ok(subst)
}

/// Match under an existing substitution, extending it in place.
///
/// On failure the substitution may hold partial bindings; callers that
/// backtrack work on a clone.
pub fn match_with_subst(pattern: &Term, term: &Term, subst: &mut Substitution) -> MatchResult {
    match (pattern, term) {
        (Term::Var(name), t) => {
            if crate::logic::metavar_kind(name) == Some(VarKind::Time) && !t.is_time_term() {
                return Err(MatchError::KindMismatch(name.clone()));
            }
            if let Some(bound) = subst.get(name) {
                if bound.equals_modulo_comm(t) {
                    Ok(())
                } else {
                    Err(MatchError::BindingMismatch(name.clone()))
                }
            } else {
                subst.insert(name, t.clone());
                Ok(())
            }
        }

        (Term::Atom(a), Term::Atom(b)) => {
            if a == b {
                Ok(())
            } else {
                Err(MatchError::SymbolClash(a.clone(), b.clone()))
            }
        }

        (Term::Truth, Term::Truth) | (Term::Contradiction, Term::Contradiction) => Ok(()),

        (Term::Compound(op1, args1), Term::Compound(op2, args2)) => {
            if op1 != op2 {
                return Err(MatchError::OperatorClash(
                    op1.name().to_string(),
                    op2.name().to_string(),
                ));
            }
            if args1.len() != args2.len() {
                return Err(MatchError::ArityMismatch(args1.len(), args2.len()));
            }
            if op1.is_commutative() {
                match_commutative(args1, args2, subst)
            } else {
                for (a, b) in args1.iter().zip(args2.iter()) {
                    match_with_subst(a, b, subst)?;
                }
                Ok(())
            }
        }

        (Term::Indexed(f1, t1), Term::Indexed(f2, t2)) => {
            match_with_subst(f1, f2, subst)?;
            match_with_subst(t1, t2, subst)
        }

        // A disjunctive relation pattern against a plain relational atom:
        // some disjunct must match (declared order, first win).
        (Term::Rel(Relator::Or, disjuncts), t @ Term::Rel(relator, _))
            if *relator != Relator::Or =>
        {
            for disjunct in disjuncts {
                let mut trial = subst.clone();
                if match_with_subst(disjunct, t, &mut trial).is_ok() {
                    *subst = trial;
                    return Ok(());
                }
            }
            Err(MatchError::NoAssignment)
        }

        (Term::Rel(r1, args1), Term::Rel(r2, args2)) => {
            if r1 != r2 {
                return Err(MatchError::OperatorClash(
                    r1.name().to_string(),
                    r2.name().to_string(),
                ));
            }
            if args1.len() != args2.len() {
                return Err(MatchError::ArityMismatch(args1.len(), args2.len()));
            }
            for (a, b) in args1.iter().zip(args2.iter()) {
                match_with_subst(a, b, subst)?;
            }
            Ok(())
        }

        _ => Err(MatchError::Shape),
    }
}

/// Backtracking operand assignment for And/Or. Pattern-operand order drives
/// the search; term operands are tried in declared order, first full
/// assignment wins.
fn match_commutative(pats: &[Term], terms: &[Term], subst: &mut Substitution) -> MatchResult {
    let mut used = vec![false; terms.len()];
    if assign(pats, terms, &mut used, subst) {
        Ok(())
    } else {
        Err(MatchError::NoAssignment)
    }
}

fn assign(pats: &[Term], terms: &[Term], used: &mut [bool], subst: &mut Substitution) -> bool {
    let Some((pat, rest)) = pats.split_first() else {
        return true;
    };
    for idx in 0..terms.len() {
        if used[idx] {
            continue;
        }
        let mut trial = subst.clone();
        if match_with_subst(pat, &terms[idx], &mut trial).is_ok() {
            used[idx] = true;
            if assign(rest, terms, used, &mut trial) {
                *subst = trial;
                return true;
            }
            used[idx] = false;
        }
    }
    false
}

/// Match an `Infer` pattern against the shape of a discharged subproof:
/// local patterns against the subproof's leading premises (pairwise, in
/// order), then the goal pattern against its final formula.
pub fn match_infer(
    local_pats: &[Term],
    goal_pat: &Term,
    locals: &[Term],
    goal: &Term,
    subst: &mut Substitution,
) -> MatchResult {
    if local_pats.len() != locals.len() {
        return Err(MatchError::ArityMismatch(local_pats.len(), locals.len()));
    }
    for (pat, local) in local_pats.iter().zip(locals.iter()) {
        match_with_subst(pat, local, subst)?;
    }
    match_with_subst(goal_pat, goal, subst)
}
