//! JSON views of proof data for front ends
//!
//! Visualization and editor layers consume these flattened shapes; they
//! carry rendered formulas plus the positions the completeness check
//! reports, so a display never re-derives numbering.

use crate::proof::{Element, Justification, LineContent, Proof};
use crate::registry::Roth;
use serde::{Deserialize, Serialize};

/// One rendered proof line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofLineJson {
    pub id: u32,
    /// Nesting depth; top level is 0
    pub depth: usize,
    /// 1-based flattened position; placeholders carry none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    pub placeholder: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub references: Vec<String>,
}

/// A whole proof, flattened in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofJson {
    pub lines: Vec<ProofLineJson>,
    pub complete: bool,
}

impl ProofJson {
    pub fn from_proof(proof: &Proof) -> ProofJson {
        fn walk(
            elements: &[Element],
            depth: usize,
            counter: &mut usize,
            out: &mut Vec<ProofLineJson>,
        ) {
            for element in elements {
                match element {
                    Element::Line(line) => {
                        let placeholder = line.is_placeholder();
                        let position = if placeholder {
                            None
                        } else {
                            *counter += 1;
                            Some(*counter)
                        };
                        out.push(ProofLineJson {
                            id: line.id,
                            depth,
                            position,
                            formula: match &line.content {
                                LineContent::Formula(term) => Some(term.to_string()),
                                LineContent::Placeholder => None,
                            },
                            placeholder,
                            justification: line.justification.as_ref().map(|j| match j {
                                Justification::Premise => "premise".to_string(),
                                Justification::Rule(rule) => rule.clone(),
                            }),
                            references: line.references.iter().map(|r| r.to_string()).collect(),
                        });
                    }
                    Element::Subproof(sub) => walk(&sub.elements, depth + 1, counter, out),
                }
            }
        }

        let mut lines = Vec::new();
        let mut counter = 0;
        walk(proof.elements(), 0, &mut counter, &mut lines);
        ProofJson {
            lines,
            complete: proof.is_complete().is_ok(),
        }
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Catalog-entry summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RothJson {
    pub id: String,
    pub theorem: bool,
    pub given: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub extra: Vec<String>,
    pub conclusion: Vec<String>,
}

impl RothJson {
    pub fn from_roth(roth: &Roth) -> RothJson {
        RothJson {
            id: roth.id.clone(),
            theorem: roth.is_theorem(),
            given: roth.given.iter().map(|p| p.to_string()).collect(),
            extra: roth.extra.iter().map(|p| p.to_string()).collect(),
            conclusion: roth.conclusion.iter().map(|p| p.to_string()).collect(),
        }
    }
}
