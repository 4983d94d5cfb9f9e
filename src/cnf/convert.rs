use crate::formula::{normalize, BinOp, Formula, UnOp};

use super::{CnfFormula, StructureError};

/// Converts an arbitrary quantifier-free formula into an equivalent [CnfFormula].
/// The formula is normalized first and then converted structurally.
///
/// # Errors
/// Returns [StructureError::UnexpandedQuantifier] if the formula still contains quantifiers.
pub fn to_cnf(f: Formula) -> Result<CnfFormula, StructureError> {
    let normalized = normalize(f);
    CnfFormula::try_from(&normalized)
}

/// Structural conversion of a formula that is already in CNF shape.
/// Fails on formulas that are not, e.g. if a negation is in front of a compound formula.
impl TryFrom<&Formula> for CnfFormula {
    type Error = StructureError;

    fn try_from(f: &Formula) -> Result<Self, Self::Error> {
        match f {
            Formula::Atomic(name) => Ok(CnfFormula::atom(name.clone())),
            Formula::Unary(UnOp::Not, g) => CnfFormula::negation(CnfFormula::try_from(g.as_ref())?),
            Formula::Binary(BinOp::And, l, r) => CnfFormula::conjunction(vec![
                CnfFormula::try_from(l.as_ref())?,
                CnfFormula::try_from(r.as_ref())?,
            ]),
            Formula::Binary(BinOp::Or, l, r) => CnfFormula::disjunction(vec![
                CnfFormula::try_from(l.as_ref())?,
                CnfFormula::try_from(r.as_ref())?,
            ]),
            Formula::Binary(op, _, _) => Err(StructureError::UnexpectedConnective(op.symbol())),
            Formula::Quantified(..) => Err(StructureError::UnexpandedQuantifier(f.to_string())),
        }
    }
}
