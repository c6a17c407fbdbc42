//! Scope visibility for rule application

use super::tree::{Element, LineId, Proof};
use crate::error::EngineError;

impl Proof {
    /// Elements visible to the line with the given id: each enclosing
    /// scope's elements up to the point of descent, then the line's own
    /// scope up to and including itself. Sibling subproof interiors stay
    /// hidden; a whole earlier subproof is visible as a unit.
    pub fn scope_of(&self, id: LineId) -> Result<Vec<&Element>, EngineError> {
        let path = self
            .locate(id)
            .ok_or_else(|| EngineError::ScopeViolation(format!("no line with id {}", id)))?;

        let mut visible = Vec::new();
        let mut scope = self.elements();
        for (depth, &idx) in path.iter().enumerate() {
            let innermost = depth + 1 == path.len();
            let upto = if innermost { idx + 1 } else { idx };
            visible.extend(scope[..upto].iter());
            if !innermost {
                match &scope[idx] {
                    Element::Subproof(sub) => scope = &sub.elements,
                    Element::Line(_) => unreachable!("path prefix must address subproofs"),
                }
            }
        }
        Ok(visible)
    }
}
