//! Rule patterns

use super::substitution::Substitution;
use super::term::Term;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A rule pattern: a term that may contain metavariables, or an `Infer`
/// obligation ("assuming locals, goal must be derivable") realized as a
/// subproof scope when the rule is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Term(Term),
    Infer { locals: Vec<Term>, goal: Term },
}

impl Pattern {
    pub fn term(term: Term) -> Pattern {
        Pattern::Term(term)
    }

    pub fn infer(locals: Vec<Term>, goal: Term) -> Pattern {
        Pattern::Infer { locals, goal }
    }

    pub fn is_infer(&self) -> bool {
        matches!(self, Pattern::Infer { .. })
    }

    pub fn as_term(&self) -> Option<&Term> {
        match self {
            Pattern::Term(term) => Some(term),
            Pattern::Infer { .. } => None,
        }
    }

    /// All metavariable names, in first-occurrence order
    pub fn free_names(&self) -> IndexSet<String> {
        let mut names = IndexSet::new();
        match self {
            Pattern::Term(term) => term.collect_free_names(&mut names),
            Pattern::Infer { locals, goal } => {
                for local in locals {
                    local.collect_free_names(&mut names);
                }
                goal.collect_free_names(&mut names);
            }
        }
        names
    }

    /// Apply a substitution to every embedded term
    pub fn instantiate(&self, subst: &Substitution) -> Pattern {
        match self {
            Pattern::Term(term) => Pattern::Term(term.apply(subst)),
            Pattern::Infer { locals, goal } => Pattern::Infer {
                locals: locals.iter().map(|local| local.apply(subst)).collect(),
                goal: goal.apply(subst),
            },
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Term(term) => write!(f, "{}", term),
            Pattern::Infer { locals, goal } => {
                write!(f, "(infer (")?;
                for (i, local) in locals.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", local)?;
                }
                write!(f, ") {})", goal)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::term::Op;

    #[test]
    fn test_infer_free_names() {
        let p = Pattern::infer(vec![Term::var("phi")], Term::Contradiction);
        let free = p.free_names();
        let names: Vec<&String> = free.iter().collect();
        assert_eq!(names, vec!["phi"]);
    }

    #[test]
    fn test_instantiate_infer() {
        let mut subst = Substitution::new();
        subst.insert("phi", Term::atom("p"));

        let p = Pattern::infer(vec![Term::var("phi")], Term::Contradiction);
        assert_eq!(
            p.instantiate(&subst),
            Pattern::infer(vec![Term::atom("p")], Term::Contradiction)
        );
    }

    #[test]
    fn test_display() {
        let p = Pattern::infer(
            vec![Term::var("phi")],
            Term::compound(Op::Not, vec![Term::var("psi")]),
        );
        assert_eq!(p.to_string(), "(infer (phi) (not psi))");
    }
}
