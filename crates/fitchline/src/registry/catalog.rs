//! The built-in rule catalog

use super::Registry;
use crate::error::EngineError;
use crate::parser::load_catalog;

/// Declarative definitions of the built-in rules
pub const BUILTIN_RULES: &str = include_str!("rules.fl");

/// A registry preloaded with the built-in propositional and temporal rules
pub fn builtin_registry() -> Result<Registry, EngineError> {
    let mut registry = Registry::new();
    let report = load_catalog(BUILTIN_RULES, &mut registry)?;
    if let Some(err) = report.rejected.into_iter().next() {
        return Err(err);
    }
    Ok(registry)
}
