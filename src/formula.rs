//! Representation of unrestricted formulas with quantifiers

use std::fmt::Display;

use indexmap::{IndexMap, IndexSet};
use quickcheck::{Arbitrary, Gen};

mod normal;
mod parse;
mod quant;

pub use normal::{
    distribute_or_over_and, eliminate_double_negation, eliminate_implications, eliminate_xor,
    normalize, push_negations,
};
pub use parse::{parse, ParseError};
pub use quant::{expand, Domain};

/// A unary connective
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnOp {
    /// Negation
    Not,
}

impl UnOp {
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '~' | '¬' => Some(UnOp::Not),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            UnOp::Not => '~',
        }
    }
}

/// A binary connective
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    /// Conjunction
    And,
    /// Disjunction
    Or,
    /// Implication
    Imp,
    /// Exclusive or
    Xor,
    /// Bi-implication
    Iff,
}

impl BinOp {
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '∧' | 'Λ' | '&' => Some(BinOp::And),
            '∨' | '|' => Some(BinOp::Or),
            '→' => Some(BinOp::Imp),
            '⊕' => Some(BinOp::Xor),
            '↔' => Some(BinOp::Iff),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            BinOp::And => '∧',
            BinOp::Or => '∨',
            BinOp::Imp => '→',
            BinOp::Xor => '⊕',
            BinOp::Iff => '↔',
        }
    }

    /// Applies the connective to two truth values.
    pub fn apply(&self, l: bool, r: bool) -> bool {
        match self {
            BinOp::And => l && r,
            BinOp::Or => l || r,
            BinOp::Imp => !l || r,
            BinOp::Xor => l != r,
            BinOp::Iff => l == r,
        }
    }
}

/// A quantifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Universal,
    Existential,
}

impl Quantifier {
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '∀' => Some(Quantifier::Universal),
            '∃' => Some(Quantifier::Existential),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Quantifier::Universal => '∀',
            Quantifier::Existential => '∃',
        }
    }

    /// The dual quantifier, used to push negations through quantifiers.
    pub fn dual(&self) -> Self {
        match self {
            Quantifier::Universal => Quantifier::Existential,
            Quantifier::Existential => Quantifier::Universal,
        }
    }

    /// The connective that joins the instances of the body during expansion.
    pub fn join_op(&self) -> BinOp {
        match self {
            Quantifier::Universal => BinOp::And,
            Quantifier::Existential => BinOp::Or,
        }
    }
}

/// A formula of first-order logic without function symbols.
/// A formula is inductively defined as follows:
/// - An atomic proposition ([Formula::Atomic]) is a formula. Its identifier is opaque, predicate arguments such as `P(a,b)` are part of it.
/// - If `f` is a formula, then `~f` ([Formula::Unary]) is a formula
/// - If `f` and `g` are formulas, then `f ∘ g` ([Formula::Binary]) is a formula for every [BinOp] `∘`
/// - If `f` is a formula and `x` a variable, then `∀x f` and `∃x f` ([Formula::Quantified]) are formulas
///
/// Every node owns its children. Sharing a sub-formula between two parents requires a clone.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Formula {
    /// An atomic proposition
    Atomic(String),
    /// A unary connective applied to a formula
    Unary(UnOp, Box<Formula>),
    /// A binary connective applied to two formulas
    Binary(BinOp, Box<Formula>, Box<Formula>),
    /// A quantified formula binding a single-letter variable
    Quantified(Quantifier, char, Box<Formula>),
}

impl Formula {
    /// Creates an atomic proposition
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atomic(name.into())
    }

    /// Creates the negation of the given formula.
    /// Unlike a simplifying constructor, double negations are kept.
    pub fn not(f: Formula) -> Self {
        Self::Unary(UnOp::Not, Box::new(f))
    }

    pub fn binary(op: BinOp, l: Formula, r: Formula) -> Self {
        Self::Binary(op, Box::new(l), Box::new(r))
    }

    pub fn and(l: Formula, r: Formula) -> Self {
        Self::binary(BinOp::And, l, r)
    }

    pub fn or(l: Formula, r: Formula) -> Self {
        Self::binary(BinOp::Or, l, r)
    }

    pub fn imp(l: Formula, r: Formula) -> Self {
        Self::binary(BinOp::Imp, l, r)
    }

    pub fn xor(l: Formula, r: Formula) -> Self {
        Self::binary(BinOp::Xor, l, r)
    }

    pub fn iff(l: Formula, r: Formula) -> Self {
        Self::binary(BinOp::Iff, l, r)
    }

    pub fn forall(var: char, body: Formula) -> Self {
        Self::Quantified(Quantifier::Universal, var, Box::new(body))
    }

    pub fn exists(var: char, body: Formula) -> Self {
        Self::Quantified(Quantifier::Existential, var, Box::new(body))
    }

    /// Joins the given formulas with `op`, nesting to the right: `[a, b, c]` becomes `a ∘ (b ∘ c)`.
    /// Returns `None` if the list is empty.
    pub fn fold_right(fs: Vec<Formula>, op: BinOp) -> Option<Formula> {
        fs.into_iter()
            .rev()
            .reduce(|acc, f| Formula::binary(op, f, acc))
    }

    /// Returns `true` if this formula is an atomic proposition
    pub fn is_atomic(&self) -> bool {
        matches!(self, Formula::Atomic(_))
    }

    /// Returns `true` if a quantifier occurs anywhere in this formula
    pub fn has_quantifiers(&self) -> bool {
        match self {
            Formula::Atomic(_) => false,
            Formula::Unary(_, f) => f.has_quantifiers(),
            Formula::Binary(_, l, r) => l.has_quantifiers() || r.has_quantifiers(),
            Formula::Quantified(..) => true,
        }
    }

    /// The number of nodes on the longest path from the root to a leaf.
    pub fn depth(&self) -> usize {
        match self {
            Formula::Atomic(_) => 1,
            Formula::Unary(_, f) | Formula::Quantified(_, _, f) => 1 + f.depth(),
            Formula::Binary(_, l, r) => 1 + l.depth().max(r.depth()),
        }
    }

    /// Returns the distinct atom identifiers of this formula in order of first occurrence.
    pub fn atoms(&self) -> IndexSet<String> {
        let mut atoms = IndexSet::new();
        self.collect_atoms(&mut atoms);
        atoms
    }

    /// The constants quantifiers of this formula range over. See [Domain::of].
    pub fn constants(&self) -> Domain {
        Domain::of(self)
    }

    fn collect_atoms(&self, atoms: &mut IndexSet<String>) {
        match self {
            Formula::Atomic(a) => {
                atoms.insert(a.clone());
            }
            Formula::Unary(_, f) | Formula::Quantified(_, _, f) => f.collect_atoms(atoms),
            Formula::Binary(_, l, r) => {
                l.collect_atoms(atoms);
                r.collect_atoms(atoms);
            }
        }
    }

    /// Evaluate the formula under the given assignment.
    /// Returns None if an atom is not assigned or if the formula still contains a quantifier.
    pub fn evaluate(&self, assignment: &Assignment) -> Option<bool> {
        match self {
            Formula::Atomic(a) => assignment.get(a),
            Formula::Unary(UnOp::Not, f) => f.evaluate(assignment).map(|v| !v),
            Formula::Binary(op, l, r) => {
                let l = l.evaluate(assignment)?;
                let r = r.evaluate(assignment)?;
                Some(op.apply(l, r))
            }
            Formula::Quantified(..) => None,
        }
    }
}

/// An assignment of truth values to atom identifiers.
/// Iteration follows insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    values: IndexMap<String, bool>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value of an atom and returns its previous value, if any.
    pub fn set(&mut self, atom: impl Into<String>, value: bool) -> Option<bool> {
        self.values.insert(atom.into(), value)
    }

    pub fn get(&self, atom: &str) -> Option<bool> {
        self.values.get(atom).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
impl Assignment {
    /// Enumerates all assignments of the given atoms, starting with all atoms `false`.
    ///
    /// # Panics
    /// Panics if there are 64 or more atoms.
    pub(crate) fn all_over(atoms: &[String]) -> impl Iterator<Item = Assignment> + '_ {
        let n = atoms.len();
        assert!(n < u64::BITS as usize, "cannot enumerate assignments of {} atoms", n);
        (0..1u64 << n).map(move |bits| {
            atoms
                .iter()
                .enumerate()
                .map(|(i, a)| (a.clone(), bits & (1 << i) != 0))
                .collect()
        })
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Assignment {
    fn from_iter<T: IntoIterator<Item = (S, bool)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/* Pretty Printing */

impl Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Atomic(a) => write!(f, "{}", a),
            Formula::Unary(op, fm) => {
                if matches!(fm.as_ref(), Formula::Quantified(..)) {
                    write!(f, "{}({})", op.symbol(), fm)
                } else {
                    write!(f, "{}{}", op.symbol(), fm)
                }
            }
            Formula::Binary(op, l, r) => {
                // The scope of a quantifier extends to the end of the string, so quantified operands need brackets
                write!(f, "(")?;
                match l.as_ref() {
                    Formula::Quantified(..) => write!(f, "({})", l)?,
                    _ => write!(f, "{}", l)?,
                }
                write!(f, "{}", op.symbol())?;
                match r.as_ref() {
                    Formula::Quantified(..) => write!(f, "({})", r)?,
                    _ => write!(f, "{}", r)?,
                }
                write!(f, ")")
            }
            Formula::Quantified(q, v, body) => write!(f, "{}{}({})", q.symbol(), v, body),
        }
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, (atom, val)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", atom, val)?;
        }
        write!(f, "]")
    }
}

/* Arbitrary */

const ARBITRARY_ATOMS: &[&str] = &["P", "Q", "R", "S"];
const ARBITRARY_MAX_DEPTH: usize = 4;

fn arbitrary_formula(g: &mut Gen, depth: usize) -> Formula {
    if depth <= 1 {
        return Formula::atom(*g.choose(ARBITRARY_ATOMS).unwrap());
    }
    match g.choose(&[0u8, 1, 2, 3, 4, 5, 6, 7]).unwrap() {
        0 | 1 => Formula::atom(*g.choose(ARBITRARY_ATOMS).unwrap()),
        2 => Formula::not(arbitrary_formula(g, depth - 1)),
        3 => Formula::and(arbitrary_formula(g, depth - 1), arbitrary_formula(g, depth - 1)),
        4 => Formula::or(arbitrary_formula(g, depth - 1), arbitrary_formula(g, depth - 1)),
        5 => Formula::imp(arbitrary_formula(g, depth - 1), arbitrary_formula(g, depth - 1)),
        6 => Formula::xor(arbitrary_formula(g, depth - 1), arbitrary_formula(g, depth - 1)),
        _ => Formula::iff(arbitrary_formula(g, depth - 1), arbitrary_formula(g, depth - 1)),
    }
}

/// Generates quantifier-free formulas over a small set of atoms.
impl Arbitrary for Formula {
    fn arbitrary(g: &mut Gen) -> Self {
        arbitrary_formula(g, ARBITRARY_MAX_DEPTH)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Formula::Atomic(_) => quickcheck::empty_shrinker(),
            Formula::Unary(_, f) | Formula::Quantified(_, _, f) => {
                quickcheck::single_shrinker(f.as_ref().clone())
            }
            Formula::Binary(_, l, r) => {
                Box::new(vec![l.as_ref().clone(), r.as_ref().clone()].into_iter())
            }
        }
    }
}
