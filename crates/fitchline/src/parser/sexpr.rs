//! S-expression reader for the definition format

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, multispace1},
    combinator::{all_consuming, map},
    multi::many0,
    sequence::{delimited, preceded, terminated},
    IResult,
};
use std::fmt;

/// One parsed s-expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sexpr {
    Sym(String),
    Nat(u64),
    List(Vec<Sexpr>),
}

impl Sexpr {
    pub fn as_sym(&self) -> Option<&str> {
        match self {
            Sexpr::Sym(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_nat(&self) -> Option<u64> {
        match self {
            Sexpr::Nat(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Sexpr]> {
        match self {
            Sexpr::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Sexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexpr::Sym(s) => write!(f, "{}", s),
            Sexpr::Nat(n) => write!(f, "{}", n),
            Sexpr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-_<>=+*/!?'.".contains(c)
}

fn comment(input: &str) -> IResult<&str, ()> {
    map(preceded(char(';'), take_while(|c| c != '\n')), |_| ())(input)
}

/// Skip whitespace and `;` line comments
fn ws(input: &str) -> IResult<&str, ()> {
    map(many0(alt((map(multispace1, |_| ()), comment))), |_| ())(input)
}

fn atom(input: &str) -> IResult<&str, Sexpr> {
    map(take_while1(is_symbol_char), |s: &str| {
        if s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse().map(Sexpr::Nat).unwrap_or_else(|_| Sexpr::Sym(s.to_string()))
        } else {
            Sexpr::Sym(s.to_string())
        }
    })(input)
}

fn list(input: &str) -> IResult<&str, Sexpr> {
    map(
        delimited(char('('), many0(sexpr), preceded(ws, char(')'))),
        Sexpr::List,
    )(input)
}

fn sexpr(input: &str) -> IResult<&str, Sexpr> {
    preceded(ws, alt((list, atom)))(input)
}

/// Parse a whole catalog text into its top-level forms
pub fn parse_forms(input: &str) -> Result<Vec<Sexpr>, String> {
    match all_consuming(terminated(many0(sexpr), ws))(input) {
        Ok((_, forms)) => Ok(forms),
        Err(err) => Err(format!("syntax error: {}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbols_and_lists() {
        let forms = parse_forms("(rule and-i (given phi psi))").unwrap();
        assert_eq!(forms.len(), 1);
        let items = forms[0].as_list().unwrap();
        assert_eq!(items[0].as_sym(), Some("rule"));
        assert_eq!(items[1].as_sym(), Some("and-i"));
    }

    #[test]
    fn test_parse_numbers_and_operators() {
        let forms = parse_forms("(line 12 (rel <= i j))").unwrap();
        let items = forms[0].as_list().unwrap();
        assert_eq!(items[1].as_nat(), Some(12));
        let rel = items[2].as_list().unwrap();
        assert_eq!(rel[1].as_sym(), Some("<="));
    }

    #[test]
    fn test_comments_skipped() {
        let text = "; header\n(a) ; trailing\n; footer\n(b)";
        let forms = parse_forms(text).unwrap();
        assert_eq!(forms.len(), 2);
    }

    #[test]
    fn test_syntax_error() {
        assert!(parse_forms("(unclosed").is_err());
        assert!(parse_forms("stray )").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let text = "(theorem t1 (given p) (conclusion (and p p)))";
        let forms = parse_forms(text).unwrap();
        assert_eq!(parse_forms(&forms[0].to_string()).unwrap(), forms);
    }
}
