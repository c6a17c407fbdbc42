//! Textual export of rules, theorems, and proofs
//!
//! The export file is regenerated wholesale; reading it back reproduces the
//! same registry entries.

use crate::proof::{Element, Justification, LineContent, LineRef, Proof, Subproof};
use crate::registry::{Registry, Roth};
use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn write_line_ref(out: &mut String, r: &LineRef) {
    match r {
        LineRef::Line(id) => {
            let _ = write!(out, "{}", id);
        }
        LineRef::Range(a, b) => {
            let _ = write!(out, "({} {})", a, b);
        }
    }
}

fn write_element(out: &mut String, element: &Element, indent: usize) {
    let pad = "  ".repeat(indent);
    match element {
        Element::Line(line) => match &line.content {
            LineContent::Placeholder => {
                let _ = writeln!(out, "{}(line {} todo)", pad, line.id);
            }
            LineContent::Formula(term) => {
                let just = match &line.justification {
                    None => "open".to_string(),
                    Some(Justification::Premise) => "premise".to_string(),
                    Some(Justification::Rule(rule)) => format!("(by {})", rule),
                };
                let mut refs = String::new();
                for (i, r) in line.references.iter().enumerate() {
                    if i > 0 {
                        refs.push(' ');
                    }
                    write_line_ref(&mut refs, r);
                }
                let _ = writeln!(out, "{}(line {} {} {} ({}))", pad, line.id, term, just, refs);
            }
        },
        Element::Subproof(Subproof { elements }) => {
            let _ = writeln!(out, "{}(subproof", pad);
            for el in elements {
                write_element(out, el, indent + 1);
            }
            let _ = writeln!(out, "{})", pad);
        }
    }
}

fn write_proof(out: &mut String, proof: &Proof, indent: usize) {
    let pad = "  ".repeat(indent);
    let _ = writeln!(out, "{}(proof", pad);
    for element in proof.elements() {
        write_element(out, element, indent + 1);
    }
    let _ = writeln!(out, "{})", pad);
}

/// Render one roth as a definition record
pub fn write_roth(roth: &Roth) -> String {
    let mut out = String::new();
    let kind = if roth.is_theorem() { "theorem" } else { "rule" };
    let _ = writeln!(out, "({} {}", kind, roth.id);

    let _ = write!(out, "  (given");
    for pattern in &roth.given {
        let _ = write!(out, " {}", pattern);
    }
    let _ = writeln!(out, ")");

    if !roth.extra.is_empty() {
        let _ = write!(out, "  (extra");
        for pattern in &roth.extra {
            let _ = write!(out, " {}", pattern);
        }
        let _ = writeln!(out, ")");
    }

    let _ = write!(out, "  (conclusion");
    for pattern in &roth.conclusion {
        let _ = write!(out, " {}", pattern);
    }
    let _ = writeln!(out, ")");

    if let Some(proof) = &roth.proof {
        write_proof(&mut out, proof, 1);
    }
    out.push(')');
    out.push('\n');
    out
}

/// Regenerate a whole catalog file with a generation-time header
pub fn write_catalog<'a>(roths: impl IntoIterator<Item = &'a Roth>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "; fitchline catalog");
    let _ = writeln!(out, "; generated at {} (unix seconds)", unix_seconds());
    for roth in roths {
        out.push('\n');
        out.push_str(&write_roth(roth));
    }
    out
}

/// The theorem export file: every registered theorem, regenerated wholesale
pub fn write_theorem_file(registry: &Registry) -> String {
    write_catalog(registry.theorems())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::records::roth_from_record;
    use crate::parser::sexpr::parse_forms;
    use crate::parser::load_catalog;

    #[test]
    fn test_rule_round_trip() {
        let text = "(rule or-e
            (given (or phi psi) (infer (phi) chi) (infer (psi) chi))
            (conclusion chi))";
        let forms = parse_forms(text).unwrap();
        let roth = roth_from_record(&forms[0]).unwrap();

        let written = write_roth(&roth);
        let reparsed = roth_from_record(&parse_forms(&written).unwrap()[0]).unwrap();
        assert_eq!(roth, reparsed);
    }

    #[test]
    fn test_theorem_round_trip() {
        let text = "(theorem self (given p) (conclusion p)
            (proof
              (line 1 p premise ())
              (line 2 p (by copy) (1))))";
        let forms = parse_forms(text).unwrap();
        let roth = roth_from_record(&forms[0]).unwrap();

        let written = write_roth(&roth);
        let reparsed = roth_from_record(&parse_forms(&written).unwrap()[0]).unwrap();
        assert_eq!(roth, reparsed);
    }

    #[test]
    fn test_catalog_header_and_reload() {
        let text = "(rule copy (given phi) (conclusion phi))";
        let mut registry = Registry::new();
        load_catalog(text, &mut registry).unwrap();

        let exported = write_catalog(registry.roths());
        assert!(exported.starts_with("; fitchline catalog"));

        let mut fresh = Registry::new();
        let report = load_catalog(&exported, &mut fresh).unwrap();
        assert_eq!(report.loaded, vec!["copy"]);
        assert_eq!(
            fresh.get("copy").unwrap().roth,
            registry.get("copy").unwrap().roth
        );
    }
}
