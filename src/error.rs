use thiserror::Error;

use crate::{cnf::StructureError, formula::ParseError};

/// The error type returned by the public API.
#[derive(Debug, Error)]
pub enum Error {
    /// An error that occured while parsing a formula.
    #[error("failed to parse formula: {0}")]
    Parse(#[from] ParseError),

    /// The normalization pipeline produced a shape the CNF type forbids.
    #[error("malformed CNF: {0}")]
    Structure(#[from] StructureError),

    #[error("an argument needs at least one premise")]
    EmptyPremiseSet,

    /// Quantifier expansion over the given domain is meaningless.
    #[error("argument is unsolvable: quantifier domain {{{}}} is too small", .domain.join(", "))]
    UnsolvableArgument { domain: Vec<String> },

    /// The SAT solver failed.
    #[error("SAT solver failed: {0}")]
    Sat(String),

    #[error("countermodel check failed: {0}")]
    ModelCheckFailed(String),

    #[error("invalid argument file: {0}")]
    InvalidArgumentFile(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
