//! The proof tree: nested scopes, structural edits, completeness

pub mod complete;
pub mod scope;
pub mod tree;

pub use complete::ProofPosition;
pub use tree::{
    Element, Justification, LineContent, LineId, LineRef, Path, Proof, ProofLine, Subproof,
};
