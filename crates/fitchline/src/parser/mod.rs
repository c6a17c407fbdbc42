//! Reader and writer for the declarative rule/theorem definition format

pub mod records;
pub mod sexpr;
pub mod writer;

pub use records::{load_catalog, roth_from_record, LoadReport};
pub use sexpr::{parse_forms, Sexpr};
pub use writer::{write_catalog, write_roth, write_theorem_file};
