//! Fitchline: a natural-deduction proof engine
//!
//! This library provides the core of a proof assistant for propositional
//! and linear temporal logic: declarative rule templates matched against
//! proof content by one-way unification, forward and backward rule
//! application, and a nested-scope proof tree with structural edits and a
//! completeness check.

pub mod driver;
pub mod error;
pub mod json;
pub mod logic;
pub mod matching;
pub mod parser;
pub mod proof;
pub mod registry;

// Re-export commonly used types from the term model
pub use logic::{metavar_kind, Op, Pattern, Relator, Substitution, Term, VarKind};

// Re-export matching types
pub use matching::{match_infer, match_terms, match_with_subst, MatchError};

// Re-export proof tree types
pub use proof::{
    Element, Justification, LineContent, LineId, LineRef, Proof, ProofLine, ProofPosition,
    Subproof,
};

// Re-export registry types
pub use registry::{
    builtin_registry, BackwardStructure, CompiledRoth, ForwardStructure, Obligation, Registry,
    Roth, Slot,
};

// Re-export the deduction driver
pub use driver::{
    applicable_rules, apply_backward, derive_forward, justify, justify_with, Applied, Opened,
};

// Re-export the definition format
pub use parser::{load_catalog, write_catalog, write_roth, write_theorem_file, LoadReport};

pub use error::EngineError;
pub use json::{ProofJson, ProofLineJson, RothJson};
