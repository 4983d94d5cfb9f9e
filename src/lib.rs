mod argument;
pub mod cnf;
mod error;
pub mod formula;
mod options;
pub mod sat;

pub use argument::{Argument, Verdict};
pub use cnf::{to_cnf, CnfFormula};
pub use error::Error;
pub use formula::{parse, Assignment, Domain, Formula};
pub use options::Options;
pub use sat::{Cadical, SatBackend, SatResult};
