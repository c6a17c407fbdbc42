//! Rules and theorems ("roths")

use crate::error::EngineError;
use crate::logic::Pattern;
use crate::proof::Proof;
use serde::{Deserialize, Serialize};

/// A rule-or-theorem: the unit stored in the registry.
///
/// A theorem is a rule without side conditions that carries the proof which
/// established it; once registered it applies exactly like a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roth {
    pub id: String,
    /// Hypotheses; may contain `Infer` obligations
    pub given: Vec<Pattern>,
    /// Non-bracketing side conditions (purely relational facts)
    pub extra: Vec<Pattern>,
    /// Normally a singleton
    pub conclusion: Vec<Pattern>,
    pub proof: Option<Proof>,
}

impl Roth {
    pub fn rule(id: &str, given: Vec<Pattern>, conclusion: Vec<Pattern>) -> Roth {
        Roth {
            id: id.to_string(),
            given,
            extra: Vec::new(),
            conclusion,
            proof: None,
        }
    }

    pub fn rule_with_extra(
        id: &str,
        given: Vec<Pattern>,
        extra: Vec<Pattern>,
        conclusion: Vec<Pattern>,
    ) -> Roth {
        Roth {
            id: id.to_string(),
            given,
            extra,
            conclusion,
            proof: None,
        }
    }

    pub fn theorem(
        id: &str,
        given: Vec<Pattern>,
        conclusion: Vec<Pattern>,
        proof: Proof,
    ) -> Roth {
        Roth {
            id: id.to_string(),
            given,
            extra: Vec::new(),
            conclusion,
            proof: Some(proof),
        }
    }

    pub fn is_theorem(&self) -> bool {
        self.proof.is_some()
    }

    /// Structural schema check. Violations reject this record only.
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |reason: &str| EngineError::InvalidDefinition {
            record: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.id.is_empty() {
            return Err(invalid("empty id"));
        }
        if self.conclusion.is_empty() {
            return Err(invalid("conclusion must not be empty"));
        }
        if self.conclusion.iter().any(Pattern::is_infer) {
            return Err(invalid("infer pattern not allowed in conclusion"));
        }
        if self.extra.iter().any(Pattern::is_infer) {
            return Err(invalid("infer pattern not allowed in extra"));
        }
        if self.is_theorem() && !self.extra.is_empty() {
            return Err(invalid("a theorem carries no extra side conditions"));
        }
        Ok(())
    }
}
