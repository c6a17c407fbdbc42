//! Metavariable substitutions

use super::term::Term;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A substitution mapping metavariable names to terms.
///
/// Keys are unique; within one match a metavariable is bound at most once
/// (the matcher enforces consistency on re-encounter).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Substitution {
    map: IndexMap<String, Term>,
}

impl Substitution {
    pub fn new() -> Self {
        Substitution {
            map: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, term: Term) {
        self.map.insert(name.to_string(), term);
    }

    pub fn get(&self, name: &str) -> Option<&Term> {
        self.map.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, term)) in self.map.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} -> {}", name, term)?;
        }
        write!(f, "}}")
    }
}

impl Term {
    /// Apply a substitution to this term. Unbound metavariables remain.
    pub fn apply(&self, subst: &Substitution) -> Term {
        match self {
            Term::Var(name) => subst
                .get(name)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            Term::Atom(_) | Term::Truth | Term::Contradiction => self.clone(),
            Term::Compound(op, args) => {
                Term::Compound(*op, args.iter().map(|arg| arg.apply(subst)).collect())
            }
            Term::Indexed(formula, time) => Term::Indexed(
                Box::new(formula.apply(subst)),
                Box::new(time.apply(subst)),
            ),
            Term::Rel(relator, operands) => Term::Rel(
                *relator,
                operands.iter().map(|operand| operand.apply(subst)).collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::term::Op;

    #[test]
    fn test_apply_substitution() {
        let mut subst = Substitution::new();
        subst.insert("phi", Term::atom("p"));

        let pattern = Term::compound(Op::And, vec![Term::var("phi"), Term::var("psi")]);
        let result = pattern.apply(&subst);
        assert_eq!(
            result,
            Term::compound(Op::And, vec![Term::atom("p"), Term::var("psi")])
        );
    }

    #[test]
    fn test_apply_into_indexed() {
        let mut subst = Substitution::new();
        subst.insert("phi", Term::atom("p"));
        subst.insert("i", Term::atom("t0"));

        let pattern = Term::indexed(Term::var("phi"), Term::var("i"));
        assert_eq!(
            pattern.apply(&subst),
            Term::indexed(Term::atom("p"), Term::atom("t0"))
        );
    }

    #[test]
    fn test_lookup() {
        let mut subst = Substitution::new();
        subst.insert("phi", Term::atom("p"));

        assert!(subst.contains("phi"));
        assert!(!subst.contains("psi"));
        assert_eq!(subst.get("phi"), Some(&Term::atom("p")));
        assert_eq!(subst.get("psi"), None);
    }
}
