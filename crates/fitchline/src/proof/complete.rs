//! Completeness checking and theorem export

use super::tree::{Element, Proof, Subproof};
use crate::error::EngineError;
use crate::logic::Pattern;
use crate::registry::Roth;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of an unproved unit in the flattened proof. Placeholders do not
/// count; positions are 1-based over the remaining lines in depth-first
/// order. A whole subproof that cannot stand for a discharged obligation is
/// reported as its `[start, end]` span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofPosition {
    Line(usize),
    Span(usize, usize),
}

impl fmt::Display for ProofPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofPosition::Line(n) => write!(f, "{}", n),
            ProofPosition::Span(a, b) => write!(f, "[{} {}]", a, b),
        }
    }
}

/// A subproof stands for a discharged obligation only if it closes with a
/// non-premise line.
fn is_open_unit(sub: &Subproof) -> bool {
    match sub.elements.last() {
        None => true,
        Some(Element::Subproof(_)) => true,
        Some(Element::Line(line)) => line.is_placeholder() || line.is_premise(),
    }
}

fn walk(
    elements: &[Element],
    counter: &mut usize,
    out: &mut Vec<ProofPosition>,
) -> (Option<usize>, Option<usize>) {
    let mut first = None;
    let mut last = None;
    for el in elements {
        match el {
            Element::Line(line) => {
                if line.is_placeholder() {
                    continue;
                }
                *counter += 1;
                first.get_or_insert(*counter);
                last = Some(*counter);
                if line.is_unproved() {
                    out.push(ProofPosition::Line(*counter));
                }
            }
            Element::Subproof(sub) => {
                let before = *counter;
                let (sub_first, sub_last) = walk(&sub.elements, counter, out);
                if is_open_unit(sub) {
                    out.push(ProofPosition::Span(
                        sub_first.unwrap_or(before + 1),
                        sub_last.unwrap_or(before + 1),
                    ));
                }
                if let Some(f) = sub_first {
                    first.get_or_insert(f);
                }
                if sub_last.is_some() {
                    last = sub_last;
                }
            }
        }
    }
    (first, last)
}

impl Proof {
    /// Succeeds when every formula line in every scope is justified and
    /// every subproof properly closes; otherwise reports the 1-based
    /// flattened positions of the offending units.
    pub fn is_complete(&self) -> Result<(), Vec<ProofPosition>> {
        let mut positions = Vec::new();
        let mut counter = 0;
        walk(self.elements(), &mut counter, &mut positions);
        if positions.is_empty() {
            Ok(())
        } else {
            Err(positions)
        }
    }

    /// Export a completed proof as a theorem: `given` are the top-level
    /// premise bodies, `conclusion` the final line's body, and the proof
    /// travels along.
    pub fn export_theorem(&self, id: &str) -> Result<Roth, EngineError> {
        self.is_complete()
            .map_err(|positions| EngineError::IncompleteProof { positions })?;

        let given: Vec<Pattern> = self
            .elements()
            .iter()
            .filter_map(Element::as_line)
            .take_while(|line| line.is_premise())
            .filter_map(|line| line.formula())
            .map(|term| Pattern::Term(term.clone()))
            .collect();

        let conclusion = self
            .elements()
            .last()
            .and_then(Element::as_line)
            .and_then(|line| line.formula())
            .ok_or_else(|| {
                EngineError::ScopeViolation("proof does not end in a formula line".to_string())
            })?;

        Ok(Roth::theorem(
            id,
            given,
            vec![Pattern::Term(conclusion.clone())],
            self.clone(),
        ))
    }
}
