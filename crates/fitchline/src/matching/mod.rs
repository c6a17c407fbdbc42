//! Pattern matching against concrete proof content

mod r#match;

pub use r#match::{match_infer, match_terms, match_with_subst, MatchError, MatchResult};
