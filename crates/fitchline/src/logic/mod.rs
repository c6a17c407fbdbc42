//! Symbolic term model
//!
//! This module provides the fundamental types for representing proof
//! content: terms, rule patterns, and metavariable substitutions.

pub mod pattern;
pub mod substitution;
pub mod term;

pub use pattern::Pattern;
pub use substitution::Substitution;
pub use term::{metavar_kind, Op, Relator, Term, VarKind};
