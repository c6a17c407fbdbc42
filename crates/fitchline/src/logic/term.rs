//! Terms of the proof language

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connectives of the formula language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    And,
    Or,
    Not,
    Imp,
    Iff,
    Always,
    Eventually,
    Next,
}

impl Op {
    pub fn name(self) -> &'static str {
        match self {
            Op::And => "and",
            Op::Or => "or",
            Op::Not => "not",
            Op::Imp => "imp",
            Op::Iff => "iff",
            Op::Always => "always",
            Op::Eventually => "eventually",
            Op::Next => "next",
        }
    }

    pub fn from_name(name: &str) -> Option<Op> {
        match name {
            "and" => Some(Op::And),
            "or" => Some(Op::Or),
            "not" => Some(Op::Not),
            "imp" => Some(Op::Imp),
            "iff" => Some(Op::Iff),
            "always" => Some(Op::Always),
            "eventually" => Some(Op::Eventually),
            "next" => Some(Op::Next),
            _ => None,
        }
    }

    /// And/Or compare and match their operands as multisets
    pub fn is_commutative(self) -> bool {
        matches!(self, Op::And | Op::Or)
    }

    /// Fixed arity, or None for the variadic connectives (two or more operands)
    pub fn arity(self) -> Option<usize> {
        match self {
            Op::And | Op::Or => None,
            Op::Not | Op::Always | Op::Eventually | Op::Next => Some(1),
            Op::Imp | Op::Iff => Some(2),
        }
    }
}

/// Relators of the time-point relation atoms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relator {
    Equal,
    LessEq,
    Succ,
    Or,
}

impl Relator {
    pub fn name(self) -> &'static str {
        match self {
            Relator::Equal => "=",
            Relator::LessEq => "<=",
            Relator::Succ => "succ",
            Relator::Or => "or",
        }
    }

    pub fn from_name(name: &str) -> Option<Relator> {
        match name {
            "=" => Some(Relator::Equal),
            "<=" => Some(Relator::LessEq),
            "succ" => Some(Relator::Succ),
            "or" => Some(Relator::Or),
            _ => None,
        }
    }

    /// Fixed operand count, or None for the variadic disjunction
    pub fn arity(self) -> Option<usize> {
        match self {
            Relator::Equal | Relator::LessEq | Relator::Succ => Some(2),
            Relator::Or => None,
        }
    }
}

/// What a metavariable may bind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Binds any formula term
    Formula,
    /// Binds only a time point
    Time,
}

/// Reserved formula-metavariable stems (greek-letter names)
const FORMULA_METAVARS: &[&str] = &[
    "phi", "psi", "chi", "theta", "alpha", "beta", "gamma", "delta", "omega",
];

/// Classify a symbol name under the metavariable naming convention.
///
/// Greek-letter names (optionally digit-suffixed) are formula metavariables;
/// the single letters `i`..`n` (optionally digit-suffixed) are time-point
/// metavariables. Every other name is rigid.
pub fn metavar_kind(name: &str) -> Option<VarKind> {
    let stem = name.trim_end_matches(|c: char| c.is_ascii_digit());
    if FORMULA_METAVARS.contains(&stem) {
        return Some(VarKind::Formula);
    }
    let mut chars = stem.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if ('i'..='n').contains(&c) => Some(VarKind::Time),
        _ => None,
    }
}

/// A term: a formula, a time-point, or a relation atom over time points
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Rigid symbol: proposition letter or named time point
    Atom(String),
    /// Metavariable (name follows the reserved convention)
    Var(String),
    Truth,
    Contradiction,
    Compound(Op, Vec<Term>),
    /// "at time t, the formula holds"; second component is a time term
    Indexed(Box<Term>, Box<Term>),
    /// Relation atom; operands are time terms, or nested relations under `or`
    Rel(Relator, Vec<Term>),
}

impl Term {
    pub fn atom(name: &str) -> Term {
        Term::Atom(name.to_string())
    }

    pub fn var(name: &str) -> Term {
        Term::Var(name.to_string())
    }

    pub fn compound(op: Op, args: Vec<Term>) -> Term {
        Term::Compound(op, args)
    }

    pub fn indexed(formula: Term, time: Term) -> Term {
        Term::Indexed(Box::new(formula), Box::new(time))
    }

    pub fn rel(relator: Relator, operands: Vec<Term>) -> Term {
        Term::Rel(relator, operands)
    }

    pub fn is_metavariable(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    /// Kind of this metavariable, None for rigid terms
    pub fn var_kind(&self) -> Option<VarKind> {
        match self {
            Term::Var(name) => metavar_kind(name),
            _ => None,
        }
    }

    /// A term usable in a time position: a named point or a time metavariable
    pub fn is_time_term(&self) -> bool {
        match self {
            Term::Atom(_) => true,
            Term::Var(name) => metavar_kind(name) == Some(VarKind::Time),
            _ => false,
        }
    }

    /// Structural equality with And/Or operands compared as multisets
    pub fn equals_modulo_comm(&self, other: &Term) -> bool {
        match (self, other) {
            (Term::Compound(op1, args1), Term::Compound(op2, args2)) => {
                if op1 != op2 || args1.len() != args2.len() {
                    return false;
                }
                if op1.is_commutative() {
                    multiset_equal(args1, args2)
                } else {
                    args1
                        .iter()
                        .zip(args2.iter())
                        .all(|(a, b)| a.equals_modulo_comm(b))
                }
            }
            (Term::Indexed(f1, t1), Term::Indexed(f2, t2)) => {
                f1.equals_modulo_comm(f2) && t1.equals_modulo_comm(t2)
            }
            (Term::Rel(r1, args1), Term::Rel(r2, args2)) => {
                r1 == r2
                    && args1.len() == args2.len()
                    && args1
                        .iter()
                        .zip(args2.iter())
                        .all(|(a, b)| a.equals_modulo_comm(b))
            }
            _ => self == other,
        }
    }

    /// All metavariable names in this term, in first-occurrence order
    pub fn free_names(&self) -> IndexSet<String> {
        let mut names = IndexSet::new();
        self.collect_free_names(&mut names);
        names
    }

    pub(crate) fn collect_free_names(&self, names: &mut IndexSet<String>) {
        match self {
            Term::Var(name) => {
                names.insert(name.clone());
            }
            Term::Atom(_) | Term::Truth | Term::Contradiction => {}
            Term::Compound(_, args) | Term::Rel(_, args) => {
                for arg in args {
                    arg.collect_free_names(names);
                }
            }
            Term::Indexed(formula, time) => {
                formula.collect_free_names(names);
                time.collect_free_names(names);
            }
        }
    }
}

/// Multiset comparison under equals_modulo_comm. The relation is an
/// equivalence, so first-match consumption is exact.
fn multiset_equal(left: &[Term], right: &[Term]) -> bool {
    let mut used = vec![false; right.len()];
    for a in left {
        let mut found = false;
        for (idx, b) in right.iter().enumerate() {
            if !used[idx] && a.equals_modulo_comm(b) {
                used[idx] = true;
                found = true;
                break;
            }
        }
        if !found {
            return false;
        }
    }
    true
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) | Term::Var(name) => write!(f, "{}", name),
            Term::Truth => write!(f, "truth"),
            Term::Contradiction => write!(f, "contradiction"),
            Term::Compound(op, args) => {
                write!(f, "({}", op.name())?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
            Term::Indexed(formula, time) => write!(f, "(at {} {})", formula, time),
            Term::Rel(relator, operands) => {
                write!(f, "(rel {}", relator.name())?;
                for operand in operands {
                    write!(f, " {}", operand)?;
                }
                write!(f, ")")
            }
        }
    }
}
