//! Formulas in conjunctive normal form.
//!
//! A [CnfFormula] is a conjunction of disjunctions of literals. The shape is enforced by the types:
//! a negation can only hold an [Atom], a [Disjunction] only holds [Literal]s, and a [Conjunction] only holds [Clause]s.
//! Nested disjunctions and conjunctions are flattened on construction, so a formula never has more than four levels.

use std::fmt::Display;

use indexmap::IndexSet;
use itertools::Itertools;

use crate::formula::{Assignment, BinOp, Formula};

mod convert;

pub use convert::to_cnf;

/// The error type for constructing malformed CNF formulas
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    #[error("a {connective} needs at least two operands, got {found}")]
    Arity {
        connective: &'static str,
        found: usize,
    },

    #[error("negation can only be applied to an atom, not to {0}")]
    NegatedNonAtom(String),

    #[error("a disjunction cannot contain the conjunction {0}")]
    ConjunctionInDisjunction(String),

    /// Normalization should have eliminated this connective.
    #[error("unexpected connective '{0}' in a normalized formula")]
    UnexpectedConnective(char),

    #[error("quantifier left in {0}")]
    UnexpandedQuantifier(String),
}

/// An atomic proposition
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Atom(String);

impl Atom {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// An atom or its negation
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Literal {
    atom: Atom,
    negated: bool,
}

impl Literal {
    pub fn positive(atom: Atom) -> Self {
        Self {
            atom,
            negated: false,
        }
    }

    pub fn negative(atom: Atom) -> Self {
        Self {
            atom,
            negated: true,
        }
    }

    pub fn atom(&self) -> &Atom {
        &self.atom
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn evaluate(&self, assignment: &Assignment) -> Option<bool> {
        assignment.get(self.atom.name()).map(|v| v != self.negated)
    }
}

/// A disjunction of at least two literals
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Disjunction {
    literals: Vec<Literal>,
}

impl Disjunction {
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }
}

/// An operand of a conjunction
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Clause {
    /// A clause consisting of a single literal
    Unit(Literal),
    Disjunction(Disjunction),
}

impl Clause {
    pub fn literals(&self) -> &[Literal] {
        match self {
            Clause::Unit(l) => std::slice::from_ref(l),
            Clause::Disjunction(d) => d.literals(),
        }
    }
}

/// A conjunction of at least two clauses
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Conjunction {
    clauses: Vec<Clause>,
}

impl Conjunction {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

/// A formula in conjunctive normal form.
/// The variants can be matched on, but only the constructors [CnfFormula::atom], [CnfFormula::negation], [CnfFormula::disjunction], and [CnfFormula::conjunction] can build them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CnfFormula {
    Atom(Atom),
    /// A negated atom
    Negation(Atom),
    Disjunction(Disjunction),
    Conjunction(Conjunction),
}

impl CnfFormula {
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom(Atom::new(name))
    }

    /// Negates an atom.
    ///
    /// # Errors
    /// Returns an error if the operand is not an atom.
    pub fn negation(operand: CnfFormula) -> Result<Self, StructureError> {
        match operand {
            CnfFormula::Atom(a) => Ok(CnfFormula::Negation(a)),
            other => Err(StructureError::NegatedNonAtom(other.to_string())),
        }
    }

    /// Creates the disjunction of the given literals and disjunctions.
    /// Disjunctions among the operands are flattened into the result.
    ///
    /// # Errors
    /// Returns an error if there are fewer than two operands or if an operand is a conjunction.
    pub fn disjunction(operands: Vec<CnfFormula>) -> Result<Self, StructureError> {
        if operands.len() < 2 {
            return Err(StructureError::Arity {
                connective: "disjunction",
                found: operands.len(),
            });
        }
        let mut literals = Vec::with_capacity(operands.len());
        for op in operands {
            match op {
                CnfFormula::Atom(a) => literals.push(Literal::positive(a)),
                CnfFormula::Negation(a) => literals.push(Literal::negative(a)),
                CnfFormula::Disjunction(d) => literals.extend(d.literals),
                c @ CnfFormula::Conjunction(_) => {
                    return Err(StructureError::ConjunctionInDisjunction(c.to_string()))
                }
            }
        }
        Ok(CnfFormula::Disjunction(Disjunction { literals }))
    }

    /// Creates the conjunction of the given formulas.
    /// Conjunctions among the operands are flattened into the result.
    ///
    /// # Errors
    /// Returns an error if there are fewer than two operands.
    pub fn conjunction(operands: Vec<CnfFormula>) -> Result<Self, StructureError> {
        if operands.len() < 2 {
            return Err(StructureError::Arity {
                connective: "conjunction",
                found: operands.len(),
            });
        }
        let mut clauses = Vec::with_capacity(operands.len());
        for op in operands {
            match op {
                CnfFormula::Atom(a) => clauses.push(Clause::Unit(Literal::positive(a))),
                CnfFormula::Negation(a) => clauses.push(Clause::Unit(Literal::negative(a))),
                CnfFormula::Disjunction(d) => clauses.push(Clause::Disjunction(d)),
                CnfFormula::Conjunction(c) => clauses.extend(c.clauses),
            }
        }
        Ok(CnfFormula::Conjunction(Conjunction { clauses }))
    }

    /// Returns all literals in order of occurrence, including duplicates.
    pub fn literals(&self) -> Vec<Literal> {
        self.clauses().into_iter().flatten().collect()
    }

    /// Returns the clauses of this formula.
    /// Atoms, negations, and disjunctions form a single clause, a conjunction has one clause per operand.
    pub fn clauses(&self) -> Vec<Vec<Literal>> {
        match self {
            CnfFormula::Atom(a) => vec![vec![Literal::positive(a.clone())]],
            CnfFormula::Negation(a) => vec![vec![Literal::negative(a.clone())]],
            CnfFormula::Disjunction(d) => vec![d.literals.clone()],
            CnfFormula::Conjunction(c) => c.clauses.iter().map(|cl| cl.literals().to_vec()).collect(),
        }
    }

    /// The distinct atom names in order of first occurrence.
    pub fn atoms(&self) -> IndexSet<String> {
        self.literals()
            .into_iter()
            .map(|l| l.atom.0)
            .collect()
    }

    /// The number of levels of this formula. An atom has depth 1, a conjunction of disjunctions with negated atoms depth 4.
    pub fn depth(&self) -> usize {
        fn literal_depth(l: &Literal) -> usize {
            if l.negated {
                2
            } else {
                1
            }
        }
        fn disjunction_depth(d: &Disjunction) -> usize {
            1 + d.literals.iter().map(literal_depth).max().unwrap_or(0)
        }
        match self {
            CnfFormula::Atom(_) => 1,
            CnfFormula::Negation(_) => 2,
            CnfFormula::Disjunction(d) => disjunction_depth(d),
            CnfFormula::Conjunction(c) => {
                1 + c
                    .clauses
                    .iter()
                    .map(|cl| match cl {
                        Clause::Unit(l) => literal_depth(l),
                        Clause::Disjunction(d) => disjunction_depth(d),
                    })
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// Evaluate the formula under the given assignment.
    /// Returns None if an atom is not assigned.
    pub fn evaluate(&self, assignment: &Assignment) -> Option<bool> {
        let mut result = true;
        for clause in self.clauses() {
            let mut satisfied = false;
            for l in clause {
                satisfied |= l.evaluate(assignment)?;
            }
            result &= satisfied;
        }
        Some(result)
    }

    /// Converts this formula into an unrestricted [Formula].
    /// Operands of conjunctions and disjunctions are nested to the right.
    pub fn to_formula(&self) -> Formula {
        fn literal(l: &Literal) -> Formula {
            let atom = Formula::atom(l.atom.name());
            if l.negated {
                Formula::not(atom)
            } else {
                atom
            }
        }
        fn disjunction(lits: &[Literal]) -> Formula {
            let fs = lits.iter().map(literal).collect_vec();
            Formula::fold_right(fs, BinOp::Or)
                .expect("clauses have at least one literal")
        }
        match self {
            CnfFormula::Atom(_) | CnfFormula::Negation(_) | CnfFormula::Disjunction(_) => {
                disjunction(&self.literals())
            }
            CnfFormula::Conjunction(c) => {
                let fs = c.clauses.iter().map(|cl| disjunction(cl.literals())).collect_vec();
                Formula::fold_right(fs, BinOp::And)
                    .expect("conjunctions have at least two clauses")
            }
        }
    }

    /// Returns the CNF of the negation of this formula.
    /// Negating a conjunction yields a disjunction of conjunctions, so the negation is built on the unrestricted formula and normalized again.
    pub fn negate(&self) -> Result<CnfFormula, StructureError> {
        to_cnf(Formula::not(self.to_formula()))
    }
}

/* Pretty Printing */

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "~{}", self.atom.0)
        } else {
            write!(f, "{}", self.atom.0)
        }
    }
}

impl Display for Disjunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.literals.iter().join(" ∨ "))
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Clause::Unit(l) => write!(f, "{}", l),
            Clause::Disjunction(d) => write!(f, "{}", d),
        }
    }
}

impl Display for CnfFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CnfFormula::Atom(a) => write!(f, "{}", a.0),
            CnfFormula::Negation(a) => write!(f, "~{}", a.0),
            CnfFormula::Disjunction(d) => write!(f, "{}", d),
            CnfFormula::Conjunction(c) => write!(f, "({})", c.clauses.iter().join(" ∧ ")),
        }
    }
}
