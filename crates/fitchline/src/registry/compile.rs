//! Compilation of roths into forward and backward application structures
//!
//! Both structures are pure data interpreted by the deduction driver; the
//! same (rule, binding) pair always instantiates to the same terms, which
//! keeps rule application reproducible and theorem export stable.

use super::roth::Roth;
use crate::logic::{Pattern, Relator, Substitution, Term};
use serde::{Deserialize, Serialize};

/// One premise slot of a forward application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Slot {
    /// Matches an already-justified visible line
    Plain(Term),
    /// Matches an already-discharged visible subproof
    Infer { locals: Vec<Term>, goal: Term },
}

/// Forward structure: match every slot against visible content, then the
/// instantiated conclusions follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardStructure {
    pub slots: Vec<Slot>,
    pub conclusion: Vec<Term>,
}

impl ForwardStructure {
    /// Conclusions under a binding; unbound metavariables remain in place.
    pub fn instantiate(&self, subst: &Substitution) -> Vec<Term> {
        self.conclusion.iter().map(|term| term.apply(subst)).collect()
    }
}

/// One residual obligation of a backward application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Obligation {
    /// A new unproved line
    Line(Term),
    /// A new subproof: locals entered as local premises, goal as its
    /// required final line
    Subproof { locals: Vec<Term>, goal: Term },
    /// A disjunctive relational given: one residual line per disjunct, all
    /// of which must be discharged
    Cases(Vec<Term>),
}

/// Backward structure: unify a conclusion with the goal, then the residual
/// obligations remain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackwardStructure {
    pub conclusion: Vec<Term>,
    pub obligations: Vec<Obligation>,
}

/// Compile the given/extra/conclusion patterns of a roth. Assumes the roth
/// has passed validation (conclusions and extras are plain term patterns).
pub fn compile(roth: &Roth) -> (ForwardStructure, BackwardStructure) {
    let conclusion: Vec<Term> = roth
        .conclusion
        .iter()
        .filter_map(Pattern::as_term)
        .cloned()
        .collect();

    let mut slots = Vec::new();
    let mut obligations = Vec::new();
    for pattern in roth.given.iter().chain(roth.extra.iter()) {
        match pattern {
            Pattern::Term(term) => {
                slots.push(Slot::Plain(term.clone()));
                match term {
                    Term::Rel(Relator::Or, disjuncts) => {
                        obligations.push(Obligation::Cases(disjuncts.clone()));
                    }
                    _ => obligations.push(Obligation::Line(term.clone())),
                }
            }
            Pattern::Infer { locals, goal } => {
                slots.push(Slot::Infer {
                    locals: locals.clone(),
                    goal: goal.clone(),
                });
                obligations.push(Obligation::Subproof {
                    locals: locals.clone(),
                    goal: goal.clone(),
                });
            }
        }
    }

    (
        ForwardStructure {
            slots,
            conclusion: conclusion.clone(),
        },
        BackwardStructure {
            conclusion,
            obligations,
        },
    )
}
