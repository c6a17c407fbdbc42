//! The nested-scope proof tree and its structural edit operations

use crate::error::EngineError;
use crate::logic::Term;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a proof line
pub type LineId = u32;

/// Child-index path addressing an element in the tree
pub type Path = Vec<usize>;

/// A reference from a line to earlier proof content: a single line, or a
/// whole subproof cited by its first and last line ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineRef {
    Line(LineId),
    Range(LineId, LineId),
}

impl LineRef {
    pub fn mentions(&self, id: LineId) -> bool {
        match *self {
            LineRef::Line(l) => l == id,
            LineRef::Range(a, b) => a == id || b == id,
        }
    }
}

impl fmt::Display for LineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineRef::Line(id) => write!(f, "{}", id),
            LineRef::Range(a, b) => write!(f, "{}-{}", a, b),
        }
    }
}

/// What a proof line holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LineContent {
    Formula(Term),
    /// Marker for an adjacent line whose derivation is not yet supplied
    Placeholder,
}

/// How a line is justified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Justification {
    /// Premise of the whole proof, or local premise of a subproof
    Premise,
    /// Application of the named rule or theorem
    Rule(String),
}

/// A single proof line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofLine {
    pub id: LineId,
    pub content: LineContent,
    pub justification: Option<Justification>,
    pub references: Vec<LineRef>,
}

impl ProofLine {
    pub fn premise(id: LineId, formula: Term) -> ProofLine {
        ProofLine {
            id,
            content: LineContent::Formula(formula),
            justification: Some(Justification::Premise),
            references: Vec::new(),
        }
    }

    pub fn unproved(id: LineId, formula: Term) -> ProofLine {
        ProofLine {
            id,
            content: LineContent::Formula(formula),
            justification: None,
            references: Vec::new(),
        }
    }

    pub fn placeholder(id: LineId) -> ProofLine {
        ProofLine {
            id,
            content: LineContent::Placeholder,
            justification: None,
            references: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, LineContent::Placeholder)
    }

    /// A formula line still awaiting a justification
    pub fn is_unproved(&self) -> bool {
        matches!(self.content, LineContent::Formula(_)) && self.justification.is_none()
    }

    pub fn is_justified(&self) -> bool {
        self.justification.is_some()
    }

    pub fn is_premise(&self) -> bool {
        matches!(self.justification, Some(Justification::Premise))
    }

    pub fn formula(&self) -> Option<&Term> {
        match &self.content {
            LineContent::Formula(term) => Some(term),
            LineContent::Placeholder => None,
        }
    }
}

/// One element of a proof scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Line(ProofLine),
    Subproof(Subproof),
}

impl Element {
    pub fn as_line(&self) -> Option<&ProofLine> {
        match self {
            Element::Line(line) => Some(line),
            Element::Subproof(_) => None,
        }
    }

    pub fn as_subproof(&self) -> Option<&Subproof> {
        match self {
            Element::Subproof(sub) => Some(sub),
            Element::Line(_) => None,
        }
    }

    fn collect_lines<'a>(&'a self, out: &mut Vec<&'a ProofLine>) {
        match self {
            Element::Line(line) => out.push(line),
            Element::Subproof(sub) => {
                for el in &sub.elements {
                    el.collect_lines(out);
                }
            }
        }
    }
}

/// A local scope opened by hypotheses
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Subproof {
    pub elements: Vec<Element>,
}

impl Subproof {
    pub fn new(elements: Vec<Element>) -> Subproof {
        Subproof { elements }
    }

    /// Formulas of the leading local-premise lines
    pub fn local_premises(&self) -> Vec<&Term> {
        let mut out = Vec::new();
        for el in &self.elements {
            match el {
                Element::Line(line) if line.is_premise() => match line.formula() {
                    Some(term) => out.push(term),
                    None => break,
                },
                _ => break,
            }
        }
        out
    }

    /// Id of the first non-placeholder line, if any
    pub fn first_line_id(&self) -> Option<LineId> {
        self.all_lines()
            .into_iter()
            .find(|line| !line.is_placeholder())
            .map(|line| line.id)
    }

    /// Id of the last non-placeholder line, if any
    pub fn last_line_id(&self) -> Option<LineId> {
        self.all_lines()
            .into_iter()
            .rev()
            .find(|line| !line.is_placeholder())
            .map(|line| line.id)
    }

    /// Final element as a line (the subproof's closing formula)
    pub fn closing_line(&self) -> Option<&ProofLine> {
        self.elements.last().and_then(Element::as_line)
    }

    /// Every line in this subproof, depth-first
    pub fn all_lines(&self) -> Vec<&ProofLine> {
        let mut out = Vec::new();
        for el in &self.elements {
            el.collect_lines(&mut out);
        }
        out
    }
}

/// A structured proof: an ordered sequence of lines and nested subproofs,
/// with a private counter for fresh line ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    elements: Vec<Element>,
    next_id: LineId,
}

impl Proof {
    /// Build a proof skeleton: premise lines, then the unproved conclusion,
    /// with obligation markers normalized.
    pub fn new(premises: Vec<Term>, conclusion: Term) -> Proof {
        let mut proof = Proof {
            elements: Vec::new(),
            next_id: 1,
        };
        for premise in premises {
            let id = proof.fresh_id();
            proof.elements.push(Element::Line(ProofLine::premise(id, premise)));
        }
        let id = proof.fresh_id();
        proof
            .elements
            .push(Element::Line(ProofLine::unproved(id, conclusion)));
        proof.normalize_placeholders();
        proof
    }

    /// Rebuild a proof from parsed parts. The id counter resumes after the
    /// highest line id present.
    pub(crate) fn from_parts(elements: Vec<Element>) -> Proof {
        let mut max_id = 0;
        let mut stack: Vec<&Element> = elements.iter().collect();
        while let Some(el) = stack.pop() {
            match el {
                Element::Line(line) => max_id = max_id.max(line.id),
                Element::Subproof(sub) => stack.extend(sub.elements.iter()),
            }
        }
        Proof {
            elements,
            next_id: max_id + 1,
        }
    }

    pub fn fresh_id(&mut self) -> LineId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Every line in the tree, depth-first
    pub fn all_lines(&self) -> Vec<&ProofLine> {
        let mut out = Vec::new();
        for el in &self.elements {
            el.collect_lines(&mut out);
        }
        out
    }

    /// Depth-first search for the line with the given id
    pub fn locate(&self, id: LineId) -> Option<Path> {
        fn walk(elements: &[Element], id: LineId, path: &mut Path) -> bool {
            for (idx, el) in elements.iter().enumerate() {
                path.push(idx);
                match el {
                    Element::Line(line) if line.id == id => return true,
                    Element::Subproof(sub) => {
                        if walk(&sub.elements, id, path) {
                            return true;
                        }
                    }
                    _ => {}
                }
                path.pop();
            }
            false
        }
        let mut path = Vec::new();
        if walk(&self.elements, id, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    pub fn line(&self, id: LineId) -> Option<&ProofLine> {
        self.all_lines().into_iter().find(|line| line.id == id)
    }

    pub fn line_mut(&mut self, id: LineId) -> Option<&mut ProofLine> {
        fn walk<'a>(elements: &'a mut [Element], id: LineId) -> Option<&'a mut ProofLine> {
            for el in elements {
                match el {
                    Element::Line(line) if line.id == id => return Some(line),
                    Element::Subproof(sub) => {
                        if let Some(found) = walk(&mut sub.elements, id) {
                            return Some(found);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        walk(&mut self.elements, id)
    }

    fn scope_at_mut(&mut self, prefix: &[usize]) -> &mut Vec<Element> {
        let mut scope = &mut self.elements;
        for &idx in prefix {
            match &mut scope[idx] {
                Element::Subproof(sub) => scope = &mut sub.elements,
                Element::Line(_) => unreachable!("path prefix must address subproofs"),
            }
        }
        scope
    }

    fn locate_or_err(&self, id: LineId) -> Result<Path, EngineError> {
        self.locate(id)
            .ok_or_else(|| EngineError::ScopeViolation(format!("no line with id {}", id)))
    }

    /// True if any line other than `id` itself references `id`
    pub fn is_referenced(&self, id: LineId) -> bool {
        self.all_lines()
            .into_iter()
            .filter(|line| line.id != id)
            .any(|line| line.references.iter().any(|r| r.mentions(id)))
    }

    fn splice(&mut self, id: LineId, element: Element, offset: usize) -> Result<(), EngineError> {
        let mut path = self.locate_or_err(id)?;
        let idx = path.pop().unwrap_or_default();
        let scope = self.scope_at_mut(&path);
        scope.insert(idx + offset, element);
        Ok(())
    }

    /// Splice an element immediately after the line with the given id, in
    /// the same scope.
    pub fn insert_after(&mut self, id: LineId, element: Element) -> Result<(), EngineError> {
        self.splice(id, element, 1)
    }

    /// Splice an element immediately before the line with the given id, in
    /// the same scope.
    pub fn insert_before(&mut self, id: LineId, element: Element) -> Result<(), EngineError> {
        self.splice(id, element, 0)
    }

    /// Replace the line with the given id. Rejected if the id is still
    /// referenced, unless the replacement is a line carrying the same id.
    pub fn replace(&mut self, id: LineId, element: Element) -> Result<(), EngineError> {
        let keeps_id = matches!(&element, Element::Line(line) if line.id == id);
        if !keeps_id && self.is_referenced(id) {
            return Err(EngineError::ScopeViolation(format!(
                "line {} is still referenced",
                id
            )));
        }
        let mut path = self.locate_or_err(id)?;
        let idx = path.pop().unwrap_or_default();
        let scope = self.scope_at_mut(&path);
        scope[idx] = element;
        Ok(())
    }

    /// Remove the line with the given id. Rejected if it is still referenced.
    pub fn remove(&mut self, id: LineId) -> Result<(), EngineError> {
        if self.is_referenced(id) {
            return Err(EngineError::ScopeViolation(format!(
                "line {} is still referenced",
                id
            )));
        }
        let mut path = self.locate_or_err(id)?;
        let idx = path.pop().unwrap_or_default();
        let scope = self.scope_at_mut(&path);
        scope.remove(idx);
        Ok(())
    }

    /// Detach the line with the given id and splice it back immediately
    /// after the anchor line, keeping its id.
    pub fn relocate(&mut self, id: LineId, anchor: LineId) -> Result<(), EngineError> {
        if id == anchor {
            return Err(EngineError::ScopeViolation(
                "cannot relocate a line after itself".to_string(),
            ));
        }
        if self.is_referenced(id) {
            return Err(EngineError::ScopeViolation(format!(
                "line {} is still referenced",
                id
            )));
        }
        self.locate_or_err(anchor)?;
        let mut path = self.locate_or_err(id)?;
        let idx = path.pop().unwrap_or_default();
        let element = {
            let scope = self.scope_at_mut(&path);
            scope.remove(idx)
        };
        self.insert_after(anchor, element)
    }

    /// Ensure every unproved line carries an obligation marker: an
    /// immediately preceding Placeholder, or an immediately preceding
    /// subproof standing for the obligation. Placeholders whose successor
    /// is anything else are dropped. Idempotent: valid markers are kept.
    pub fn normalize_placeholders(&mut self) {
        fn normalize(elements: &mut Vec<Element>, next_id: &mut LineId) {
            for el in elements.iter_mut() {
                if let Element::Subproof(sub) = el {
                    normalize(&mut sub.elements, next_id);
                }
            }

            let old = std::mem::take(elements);
            let mut kept = Vec::with_capacity(old.len());
            let mut iter = old.into_iter().peekable();
            while let Some(el) = iter.next() {
                let drop = matches!(&el, Element::Line(line) if line.is_placeholder())
                    && !matches!(
                        iter.peek(),
                        Some(Element::Line(next)) if next.is_unproved()
                    );
                if !drop {
                    kept.push(el);
                }
            }

            let mut out: Vec<Element> = Vec::with_capacity(kept.len());
            for el in kept {
                if matches!(&el, Element::Line(line) if line.is_unproved()) {
                    let marked = match out.last() {
                        Some(Element::Line(prev)) => prev.is_placeholder(),
                        Some(Element::Subproof(_)) => true,
                        None => false,
                    };
                    if !marked {
                        let id = *next_id;
                        *next_id += 1;
                        out.push(Element::Line(ProofLine::placeholder(id)));
                    }
                }
                out.push(el);
            }
            *elements = out;
        }

        let mut elements = std::mem::take(&mut self.elements);
        let mut next_id = self.next_id;
        normalize(&mut elements, &mut next_id);
        self.elements = elements;
        self.next_id = next_id;
    }
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show(elements: &[Element], depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            for el in elements {
                match el {
                    Element::Line(line) => {
                        write!(f, "{:indent$}", "", indent = depth * 2)?;
                        match (&line.content, &line.justification) {
                            (LineContent::Placeholder, _) => writeln!(f, "{}: ...", line.id)?,
                            (LineContent::Formula(term), None) => {
                                writeln!(f, "{}: {} ?", line.id, term)?
                            }
                            (LineContent::Formula(term), Some(Justification::Premise)) => {
                                writeln!(f, "{}: {} [premise]", line.id, term)?
                            }
                            (LineContent::Formula(term), Some(Justification::Rule(rule))) => {
                                let refs: Vec<String> =
                                    line.references.iter().map(|r| r.to_string()).collect();
                                writeln!(f, "{}: {} [{} {}]", line.id, term, rule, refs.join(","))?
                            }
                        }
                    }
                    Element::Subproof(sub) => show(&sub.elements, depth + 1, f)?,
                }
            }
            Ok(())
        }
        show(&self.elements, 0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Op;

    fn sample() -> Proof {
        Proof::new(
            vec![Term::atom("p"), Term::atom("q")],
            Term::compound(Op::And, vec![Term::atom("p"), Term::atom("q")]),
        )
    }

    #[test]
    fn test_new_proof_shape() {
        let proof = sample();
        let lines = proof.all_lines();
        // two premises, one placeholder, one conclusion
        assert_eq!(lines.len(), 4);
        assert!(lines[0].is_premise());
        assert!(lines[1].is_premise());
        assert!(lines[2].is_placeholder());
        assert!(lines[3].is_unproved());
        assert_eq!(lines[0].id, 1);
        assert_eq!(lines[3].id, 3);
    }

    #[test]
    fn test_locate_and_line() {
        let proof = sample();
        assert_eq!(proof.locate(1), Some(vec![0]));
        assert_eq!(proof.locate(3), Some(vec![3]));
        assert_eq!(proof.locate(99), None);
        assert_eq!(proof.line(2).and_then(|l| l.formula()), Some(&Term::atom("q")));
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut proof = sample();
        let id = proof.fresh_id();
        proof
            .insert_after(2, Element::Line(ProofLine::unproved(id, Term::atom("r"))))
            .unwrap();
        let lines = proof.all_lines();
        assert_eq!(lines[2].id, id);

        let err = proof.insert_before(99, Element::Line(ProofLine::placeholder(50)));
        assert!(matches!(err, Err(EngineError::ScopeViolation(_))));
    }

    #[test]
    fn test_remove_referenced_rejected() {
        let mut proof = sample();
        {
            let conclusion = proof.line_mut(3).unwrap();
            conclusion.justification = Some(Justification::Rule("and-i".to_string()));
            conclusion.references = vec![LineRef::Line(1), LineRef::Line(2)];
        }
        assert!(matches!(
            proof.remove(1),
            Err(EngineError::ScopeViolation(_))
        ));
        // an unreferenced line can go
        {
            let conclusion = proof.line_mut(3).unwrap();
            conclusion.references = vec![LineRef::Line(2)];
        }
        proof.remove(1).unwrap();
        assert!(proof.line(1).is_none());
    }

    #[test]
    fn test_replace_same_id_allowed() {
        let mut proof = sample();
        {
            let conclusion = proof.line_mut(3).unwrap();
            conclusion.justification = Some(Justification::Rule("and-i".to_string()));
            conclusion.references = vec![LineRef::Line(1)];
        }
        // replacing the referenced line with a line of the same id is fine
        proof
            .replace(1, Element::Line(ProofLine::premise(1, Term::atom("r"))))
            .unwrap();
        assert_eq!(proof.line(1).and_then(|l| l.formula()), Some(&Term::atom("r")));
        // swapping it out for a different id is not
        assert!(matches!(
            proof.replace(1, Element::Line(ProofLine::premise(77, Term::atom("s")))),
            Err(EngineError::ScopeViolation(_))
        ));
    }

    #[test]
    fn test_relocate() {
        let mut proof = sample();
        proof.relocate(1, 2).unwrap();
        let lines = proof.all_lines();
        assert_eq!(lines[0].id, 2);
        assert_eq!(lines[1].id, 1);
    }

    #[test]
    fn test_normalize_idempotent() {
        let mut proof = sample();
        let once = proof.clone();
        proof.normalize_placeholders();
        assert_eq!(proof, once);
    }

    #[test]
    fn test_normalize_drops_stale_placeholder() {
        let mut proof = sample();
        {
            let conclusion = proof.line_mut(3).unwrap();
            conclusion.justification = Some(Justification::Rule("and-i".to_string()));
        }
        proof.normalize_placeholders();
        let lines = proof.all_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| !line.is_placeholder()));
    }

    #[test]
    fn test_normalize_subproof_marker() {
        // a subproof immediately before an unproved line stands for its
        // obligation; no placeholder is inserted
        let mut proof = sample();
        let premise_id = proof.fresh_id();
        let goal_id = proof.fresh_id();
        let sub = Subproof::new(vec![
            Element::Line(ProofLine::premise(premise_id, Term::atom("p"))),
            Element::Line(ProofLine::unproved(goal_id, Term::Contradiction)),
        ]);
        proof.insert_before(3, Element::Subproof(sub)).unwrap();
        proof.normalize_placeholders();

        let lines = proof.all_lines();
        // premises 1,2, subproof premise, subproof placeholder, subproof
        // goal, conclusion (its old placeholder dropped, subproof marks it)
        assert_eq!(lines.len(), 6);
        let before_conclusion = proof.elements()[proof.elements().len() - 2]
            .as_subproof()
            .is_some();
        assert!(before_conclusion);

        let again = proof.clone();
        proof.normalize_placeholders();
        assert_eq!(proof, again);
    }
}
