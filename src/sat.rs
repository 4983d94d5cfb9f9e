//! Provides types and functions for encoding CNF formulas as clause lists and SAT solving

use std::fmt::Display;
use std::time::Instant;

use indexmap::IndexMap;
use rustsat::solvers::{Solve, SolverResult};
use rustsat::types::Lit;
use smallvec::SmallVec;

use crate::{
    cnf::{CnfFormula, Literal},
    error::Error,
    formula::Assignment,
};

/// A propositional variable
pub type PVar = u32;
/// A propositional literal, i.e., a variable or its negation
pub type PLit = i32;
/// A clause, i.e., a disjunction of literals
pub type Clause = SmallVec<[PLit; 4]>;

pub fn neg(var: PVar) -> PLit {
    -as_lit(var)
}
pub fn as_lit(var: PVar) -> PLit {
    var as i32
}

/// Maps atom names to propositional variables.
/// Variables are consecutive numbers starting at 1, assigned in order of first occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
    vars: IndexMap<String, PVar>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the variable of the atom, creating a new one if the atom has not been seen before.
    ///
    /// # Panics
    /// Panics if the number of propositional variables exceeds the maximum value of `i32`.
    pub fn intern(&mut self, atom: &str) -> PVar {
        if let Some(v) = self.vars.get(atom) {
            return *v;
        }
        let v = self.vars.len() as PVar + 1;
        if v > i32::MAX as u32 {
            panic!("Too many propositional variables")
        }
        self.vars.insert(atom.to_string(), v);
        v
    }

    pub fn var(&self, atom: &str) -> Option<PVar> {
        self.vars.get(atom).copied()
    }

    /// Returns the atom that was interned as the given variable.
    pub fn atom(&self, var: PVar) -> Option<&str> {
        let idx = (var as usize).checked_sub(1)?;
        self.vars.get_index(idx).map(|(a, _)| a.as_str())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    fn literal(&mut self, l: &Literal) -> PLit {
        let v = self.intern(l.atom().name());
        if l.is_negated() {
            neg(v)
        } else {
            as_lit(v)
        }
    }

    /// Translates a model of the SAT solver back to an assignment of atom names.
    /// Every interned atom is assigned. Atoms the model does not mention are `false`.
    pub fn decode(&self, model: &IndexMap<PVar, bool>) -> Assignment {
        let missing = self.vars.values().filter(|v| !model.contains_key(*v)).count();
        if missing > 0 {
            log::warn!("Model is partial, defaulting {} variable(s) to false", missing);
        }
        self.vars
            .iter()
            .map(|(a, v)| (a.clone(), model.get(v).copied().unwrap_or(false)))
            .collect()
    }
}

/// Encodes the CNF formula as a list of clauses over signed integers.
/// A positive integer is an atom, a negative integer the negation of the atom.
/// Returns the clauses together with the mapping from atoms to variables.
pub fn encode(cnf: &CnfFormula) -> (Vec<Clause>, SymbolTable) {
    let mut symbols = SymbolTable::new();
    let clauses = cnf
        .clauses()
        .iter()
        .map(|c| c.iter().map(|l| symbols.literal(l)).collect::<Clause>())
        .collect();
    (clauses, symbols)
}

/// The result of a SAT solver call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResult {
    /// The clauses are satisfiable. The model maps variables to their values.
    Sat(IndexMap<PVar, bool>),
    /// The clauses are unsatisfiable
    Unsat,
}

impl SatResult {
    /// Returns true if the clauses are satisfiable
    pub fn is_sat(&self) -> bool {
        matches!(self, SatResult::Sat(_))
    }

    /// Returns true if the clauses are unsatisfiable
    pub fn is_unsat(&self) -> bool {
        matches!(self, SatResult::Unsat)
    }

    /// Returns the model if the clauses are satisfiable
    pub fn get_model(&self) -> Option<&IndexMap<PVar, bool>> {
        match self {
            SatResult::Sat(model) => Some(model),
            SatResult::Unsat => None,
        }
    }
}

impl Display for SatResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SatResult::Sat(_) => write!(f, "sat"),
            SatResult::Unsat => write!(f, "unsat"),
        }
    }
}

/// A SAT solver that decides the satisfiability of a list of clauses.
pub trait SatBackend {
    /// Decides the satisfiability of the clauses.
    /// An empty list of clauses is satisfiable.
    fn solve(&mut self, clauses: &[Clause]) -> Result<SatResult, Error>;
}

/// Solves clauses with CaDiCaL. Every call uses a fresh solver instance.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cadical;

impl Cadical {
    pub fn new() -> Self {
        Self
    }
}

fn to_sat_lit(l: PLit) -> Result<Lit, Error> {
    Lit::from_ipasir(l).map_err(|e| Error::Sat(e.to_string()))
}

impl SatBackend for Cadical {
    fn solve(&mut self, clauses: &[Clause]) -> Result<SatResult, Error> {
        if clauses.is_empty() {
            return Ok(SatResult::Sat(IndexMap::new()));
        }
        let mut cadical = rustsat_cadical::CaDiCaL::default();
        let mut vars: Vec<PVar> = Vec::new();
        for clause in clauses {
            let lits = clause
                .iter()
                .map(|l| {
                    vars.push(l.unsigned_abs());
                    to_sat_lit(*l)
                })
                .collect::<Result<rustsat::types::Clause, _>>()?;
            cadical
                .add_clause(lits)
                .map_err(|e| Error::Sat(e.to_string()))?;
        }
        vars.sort_unstable();
        vars.dedup();

        let timer = Instant::now();
        let res = cadical.solve().map_err(|e| Error::Sat(e.to_string()))?;
        log::info!("Done SAT solving: {:?} ({:?})", res, timer.elapsed());

        match res {
            SolverResult::Sat => {
                let sol = cadical
                    .full_solution()
                    .map_err(|e| Error::Sat(e.to_string()))?;
                let mut model = IndexMap::with_capacity(vars.len());
                for v in vars {
                    let lit = to_sat_lit(as_lit(v))?;
                    model.insert(v, sol.lit_value(lit).to_bool_with_def(false));
                }
                Ok(SatResult::Sat(model))
            }
            SolverResult::Unsat => Ok(SatResult::Unsat),
            SolverResult::Interrupted => Err(Error::Sat("CaDiCaL was interrupted".to_string())),
        }
    }
}
