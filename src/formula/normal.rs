//! Equivalence-preserving rewrites that bring a formula into conjunctive normal form.
//! Every pass is total and idempotent. Quantifiers are kept and their bodies rewritten.

use super::{BinOp, Formula, UnOp};

/// Rewrites a formula into CNF shape by running all passes in order:
/// 1. [eliminate_implications]
/// 2. [eliminate_xor]
/// 3. [eliminate_double_negation]
/// 4. [push_negations]
/// 5. [distribute_or_over_and]
pub fn normalize(f: Formula) -> Formula {
    let f = eliminate_implications(f);
    log::trace!("Eliminated implications: {}", f);
    let f = eliminate_xor(f);
    log::trace!("Eliminated xor: {}", f);
    let f = eliminate_double_negation(f);
    log::trace!("Eliminated double negations: {}", f);
    let f = push_negations(f);
    log::trace!("Negation normal form: {}", f);
    let f = distribute_or_over_and(f);
    log::trace!("Distributed: {}", f);
    f
}

/// Replaces `a → b` by `¬a ∨ b` and `a ↔ b` by `(a → b) ∧ (b → a)`, which is then rewritten as well.
pub fn eliminate_implications(f: Formula) -> Formula {
    match f {
        Formula::Atomic(_) => f,
        Formula::Unary(op, g) => Formula::Unary(op, Box::new(eliminate_implications(*g))),
        Formula::Binary(BinOp::Imp, l, r) => {
            let l = eliminate_implications(*l);
            let r = eliminate_implications(*r);
            Formula::or(Formula::not(l), r)
        }
        Formula::Binary(BinOp::Iff, l, r) => {
            let (l, r) = (*l, *r);
            let left_to_right = Formula::imp(l.clone(), r.clone());
            let right_to_left = Formula::imp(r, l);
            eliminate_implications(Formula::and(left_to_right, right_to_left))
        }
        Formula::Binary(op, l, r) => {
            Formula::binary(op, eliminate_implications(*l), eliminate_implications(*r))
        }
        Formula::Quantified(q, v, g) => {
            Formula::Quantified(q, v, Box::new(eliminate_implications(*g)))
        }
    }
}

/// Replaces `a ⊕ b` by `(a ∨ b) ∧ ¬(a ∧ b)`.
pub fn eliminate_xor(f: Formula) -> Formula {
    match f {
        Formula::Atomic(_) => f,
        Formula::Unary(op, g) => Formula::Unary(op, Box::new(eliminate_xor(*g))),
        Formula::Binary(BinOp::Xor, l, r) => {
            let l = eliminate_xor(*l);
            let r = eliminate_xor(*r);
            let either = Formula::or(l.clone(), r.clone());
            let not_both = Formula::not(Formula::and(l, r));
            Formula::and(either, not_both)
        }
        Formula::Binary(op, l, r) => Formula::binary(op, eliminate_xor(*l), eliminate_xor(*r)),
        Formula::Quantified(q, v, g) => Formula::Quantified(q, v, Box::new(eliminate_xor(*g))),
    }
}

/// Replaces `¬¬a` by `a`.
/// Works bottom-up, so arbitrarily long chains of negations collapse in a single call.
pub fn eliminate_double_negation(f: Formula) -> Formula {
    match f {
        Formula::Atomic(_) => f,
        Formula::Unary(UnOp::Not, g) => match eliminate_double_negation(*g) {
            // The child is free of double negations, so its operand is not a negation
            Formula::Unary(UnOp::Not, inner) => *inner,
            g => Formula::not(g),
        },
        Formula::Binary(op, l, r) => Formula::binary(
            op,
            eliminate_double_negation(*l),
            eliminate_double_negation(*r),
        ),
        Formula::Quantified(q, v, g) => {
            Formula::Quantified(q, v, Box::new(eliminate_double_negation(*g)))
        }
    }
}

/// Converts a formula to *Negation Normal Form* (NNF) by applying De Morgan's laws until every negation is in front of an atom.
/// Negations are pushed through quantifiers by switching to the dual quantifier.
/// Negated implications, bi-implications, and exclusive ors are eliminated first.
pub fn push_negations(f: Formula) -> Formula {
    match f {
        Formula::Atomic(_) => f,
        Formula::Unary(UnOp::Not, g) => negated_nnf(*g),
        Formula::Binary(op, l, r) => Formula::binary(op, push_negations(*l), push_negations(*r)),
        Formula::Quantified(q, v, g) => Formula::Quantified(q, v, Box::new(push_negations(*g))),
    }
}

/// Returns the NNF of `¬f`.
fn negated_nnf(f: Formula) -> Formula {
    match f {
        Formula::Atomic(_) => Formula::not(f),
        Formula::Unary(UnOp::Not, g) => push_negations(*g),
        Formula::Binary(BinOp::And, l, r) => Formula::or(negated_nnf(*l), negated_nnf(*r)),
        Formula::Binary(BinOp::Or, l, r) => Formula::and(negated_nnf(*l), negated_nnf(*r)),
        Formula::Binary(BinOp::Imp | BinOp::Iff, ..) => negated_nnf(eliminate_implications(f)),
        Formula::Binary(BinOp::Xor, ..) => negated_nnf(eliminate_xor(f)),
        Formula::Quantified(q, v, g) => Formula::Quantified(q.dual(), v, Box::new(negated_nnf(*g))),
    }
}

/// Distributes disjunctions over conjunctions until no disjunction has a conjunction as an operand:
/// - `a ∨ (b ∧ c)` becomes `(a ∨ b) ∧ (a ∨ c)`
/// - `(a ∧ b) ∨ c` becomes `(a ∨ c) ∧ (b ∨ c)`
///
/// The input is expected to be in NNF.
pub fn distribute_or_over_and(f: Formula) -> Formula {
    match f {
        Formula::Atomic(_) => f,
        Formula::Binary(BinOp::Or, l, r) => {
            distribute_pair(distribute_or_over_and(*l), distribute_or_over_and(*r))
        }
        Formula::Binary(op, l, r) => {
            Formula::binary(op, distribute_or_over_and(*l), distribute_or_over_and(*r))
        }
        Formula::Unary(op, g) => Formula::Unary(op, Box::new(distribute_or_over_and(*g))),
        Formula::Quantified(q, v, g) => {
            Formula::Quantified(q, v, Box::new(distribute_or_over_and(*g)))
        }
    }
}

/// Builds the CNF of `l ∨ r` where both `l` and `r` are already distributed.
fn distribute_pair(l: Formula, r: Formula) -> Formula {
    match (l, r) {
        (Formula::Binary(BinOp::And, a, b), r) => Formula::and(
            distribute_pair(*a, r.clone()),
            distribute_pair(*b, r),
        ),
        (l, Formula::Binary(BinOp::And, a, b)) => Formula::and(
            distribute_pair(l.clone(), *a),
            distribute_pair(l, *b),
        ),
        (l, r) => Formula::or(l, r),
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use crate::formula::{parse, Assignment};

    use super::*;

    fn p(s: &str) -> Formula {
        parse(s).unwrap()
    }

    fn equivalent(f: &Formula, g: &Formula) -> bool {
        let mut atoms = f.atoms();
        atoms.extend(g.atoms());
        let atoms: Vec<String> = atoms.into_iter().collect();
        let same = Assignment::all_over(&atoms).all(|a| f.evaluate(&a) == g.evaluate(&a));
        same
    }

    /// Returns true if no disjunction has a conjunction as an operand and all negations are in front of atoms.
    fn is_cnf_shaped(f: &Formula) -> bool {
        fn is_clause(f: &Formula) -> bool {
            match f {
                Formula::Atomic(_) => true,
                Formula::Unary(UnOp::Not, g) => g.is_atomic(),
                Formula::Binary(BinOp::Or, l, r) => is_clause(l) && is_clause(r),
                _ => false,
            }
        }
        match f {
            Formula::Binary(BinOp::And, l, r) => is_cnf_shaped(l) && is_cnf_shaped(r),
            f => is_clause(f),
        }
    }

    #[test]
    fn implication_eliminated() {
        assert_eq!(eliminate_implications(p("P→Q")), p("~P∨Q"));
    }

    #[test]
    fn nested_implication_eliminated() {
        assert_eq!(
            eliminate_implications(p("(P→Q)→R")),
            p("~(~P∨Q)∨R")
        );
    }

    #[test]
    fn biconditional_eliminated() {
        assert_eq!(
            eliminate_implications(p("P↔Q")),
            p("(~P∨Q)∧(~Q∨P)")
        );
    }

    #[test]
    fn implication_elimination_idempotent() {
        let once = eliminate_implications(p("(P↔Q)→(R→S)"));
        assert_eq!(eliminate_implications(once.clone()), once);
    }

    #[test]
    fn xor_eliminated() {
        assert_eq!(eliminate_xor(p("(P⊕Q)")), p("((P∨Q)∧~(P∧Q))"));
    }

    #[test]
    fn nested_xor_eliminated() {
        let f = eliminate_xor(p("((P⊕Q)⊕R)"));
        assert!(!f.to_string().contains('⊕'));
        assert!(equivalent(&f, &p("((P⊕Q)⊕R)")));
    }

    #[test]
    fn double_negation_eliminated() {
        assert_eq!(eliminate_double_negation(p("~~P")), p("P"));
        assert_eq!(eliminate_double_negation(p("((~~P)∧Q)")), p("(P∧Q)"));
    }

    #[test]
    fn long_negation_chains_collapse() {
        assert_eq!(eliminate_double_negation(p("~~~P")), p("~P"));
        assert_eq!(eliminate_double_negation(p("~~~~P")), p("P"));
        assert_eq!(eliminate_double_negation(p("~~~~~(Q∨~~R)")), p("~(Q∨R)"));
    }

    #[test]
    fn de_morgan_and() {
        assert_eq!(push_negations(p("~(P∧Q)")), p("~P∨~Q"));
    }

    #[test]
    fn de_morgan_or() {
        assert_eq!(push_negations(p("~(P∨Q)")), p("((~P)∧(~Q))"));
    }

    #[test]
    fn negated_atom_untouched() {
        assert_eq!(push_negations(p("~P")), p("~P"));
    }

    #[test]
    fn de_morgan_nested() {
        assert_eq!(
            push_negations(p("~(P∧~(Q∨R))")),
            p("~P∨(Q∨R)")
        );
    }

    #[test]
    fn negation_through_implication() {
        assert_eq!(push_negations(p("~(P→Q)")), p("P∧~Q"));
    }

    #[test]
    fn negation_through_quantifier() {
        assert_eq!(push_negations(p("~∀x(Px)")), p("∃x(~Px)"));
        assert_eq!(push_negations(p("~∃x(Px∧Qx)")), p("∀x(~Px∨~Qx)"));
    }

    #[test]
    fn distribute_right() {
        assert_eq!(
            distribute_or_over_and(p("(P∨(Q∧R))")),
            p("((P∨Q)∧(P∨R))")
        );
    }

    #[test]
    fn distribute_left() {
        assert_eq!(
            distribute_or_over_and(p("((Q∧R)∨P)")),
            p("((Q∨P)∧(R∨P))")
        );
    }

    #[test]
    fn distribute_both_sides() {
        let f = distribute_or_over_and(p("(P∧Q)∨(R∧S)"));
        assert!(is_cnf_shaped(&f));
        assert!(equivalent(&f, &p("(P∧Q)∨(R∧S)")));
    }

    #[test]
    fn distribute_keeps_cnf() {
        let f = p("(P∨Q)∧(R∨~S)");
        assert_eq!(distribute_or_over_and(f.clone()), f);
    }

    #[test]
    fn normalize_negated_implication_of_conjunction() {
        let f = normalize(p("~((P∧Q)→(R∨S))"));
        assert!(is_cnf_shaped(&f));
        assert!(equivalent(&f, &p("~((P∧Q)→(R∨S))")));
    }

    #[quickcheck]
    fn normalize_is_idempotent(f: Formula) -> bool {
        let once = normalize(f);
        normalize(once.clone()) == once
    }

    #[quickcheck]
    fn normalize_preserves_equivalence(f: Formula) -> bool {
        equivalent(&f, &normalize(f.clone()))
    }

    #[quickcheck]
    fn normalize_yields_cnf_shape(f: Formula) -> bool {
        is_cnf_shaped(&normalize(f))
    }

    #[quickcheck]
    fn each_pass_is_idempotent(f: Formula) -> bool {
        let imp = eliminate_implications(f.clone());
        let xor = eliminate_xor(f.clone());
        let dn = eliminate_double_negation(f.clone());
        let nnf = push_negations(f);
        eliminate_implications(imp.clone()) == imp
            && eliminate_xor(xor.clone()) == xor
            && eliminate_double_negation(dn.clone()) == dn
            && push_negations(nnf.clone()) == nnf
    }
}
