//! Expansion of quantifiers over a finite domain of constants.

use std::fmt::Display;

use indexmap::IndexSet;
use itertools::Itertools;

use super::{Formula, Quantifier};

/// The finite set of constants quantifiers range over.
/// The order of the constants determines the shape of expanded formulas, but not their truth value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Domain {
    constants: IndexSet<String>,
}

impl Domain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the domain of a formula: all lowercase letters occurring in its atom identifiers, in order of first occurrence.
    /// Bound variables are lowercase letters as well and therefore part of the domain.
    pub fn of(f: &Formula) -> Self {
        f.atoms()
            .iter()
            .flat_map(|a| a.chars().filter(|c| c.is_lowercase()).collect_vec())
            .map(String::from)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.constants.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Domain {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            constants: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.constants.iter().join(", "))
    }
}

/// Expands every quantifier in the formula over the given domain.
/// `∀x φ` becomes the conjunction and `∃x φ` the disjunction of the instances of `φ` for every constant except `x` itself.
/// The instances are nested to the right.
/// Nested quantifiers are expanded innermost first.
/// If no constant other than the bound variable is left, the quantifier is kept.
///
/// Instantiation replaces every occurrence of the variable letter in the atom identifiers of the body.
/// It is not capture-avoiding, so the variable must not occur as part of unrelated identifiers.
pub fn expand(f: &mut Formula, domain: &Domain) {
    match f {
        Formula::Atomic(_) => {}
        Formula::Unary(_, g) => expand(g, domain),
        Formula::Binary(_, l, r) => {
            expand(l, domain);
            expand(r, domain);
        }
        Formula::Quantified(q, v, body) => {
            let (q, v) = (*q, *v);
            expand(body, domain);
            match instantiate(q, v, body, domain) {
                Some(joined) => *f = joined,
                None => log::debug!(
                    "Not expanding {}{}: no constant other than the variable in {}",
                    q.symbol(),
                    v,
                    domain
                ),
            }
        }
    }
}

/// Instantiates the body for every constant of the domain that is not the variable and joins the instances.
/// Returns `None` if there is no such constant.
fn instantiate(q: Quantifier, var: char, body: &Formula, domain: &Domain) -> Option<Formula> {
    let instances = domain
        .iter()
        .filter(|c| !is_variable(c, var))
        .map(|c| {
            let mut instance = body.clone();
            substitute(&mut instance, var, c);
            // An instance never carries a quantifier at its root
            match instance {
                Formula::Quantified(_, _, inner) => *inner,
                instance => instance,
            }
        })
        .collect_vec();
    Formula::fold_right(instances, q.join_op())
}

fn is_variable(constant: &str, var: char) -> bool {
    let mut chars = constant.chars();
    chars.next() == Some(var) && chars.next().is_none()
}

/// Replaces every occurrence of `var` in the atom identifiers of `f` by `constant`.
fn substitute(f: &mut Formula, var: char, constant: &str) {
    match f {
        Formula::Atomic(name) => {
            if name.contains(var) {
                *name = name.replace(var, constant);
            }
        }
        Formula::Unary(_, g) | Formula::Quantified(_, _, g) => substitute(g, var, constant),
        Formula::Binary(_, l, r) => {
            substitute(l, var, constant);
            substitute(r, var, constant);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::formula::parse;

    use super::*;

    fn p(s: &str) -> Formula {
        parse(s).unwrap()
    }

    fn dom(cs: &[&str]) -> Domain {
        cs.iter().copied().collect()
    }

    #[test]
    fn domain_of_formula() {
        let f = p("∀x(Px→Qx)∧Pa");
        assert_eq!(Domain::of(&f), dom(&["x", "a"]));
        assert!(Domain::of(&p("P→Q")).is_empty());
    }

    #[test]
    fn domain_of_predicate_arguments() {
        assert_eq!(Domain::of(&p("R(a,b)∨Sc")), dom(&["a", "b", "c"]));
    }

    #[test]
    fn expand_universal_skips_variable() {
        let mut f = p("∀x(Px→Qx)");
        expand(&mut f, &dom(&["x", "a"]));
        assert_eq!(f, p("Pa→Qa"));
    }

    #[test]
    fn expand_universal_into_conjunction() {
        let mut f = p("∀x(Px→Qx)");
        expand(&mut f, &dom(&["a", "b"]));
        assert_eq!(f, p("(Pa→Qa)∧(Pb→Qb)"));
    }

    #[test]
    fn expand_existential_into_disjunction() {
        let mut f = p("∃x(Px)");
        expand(&mut f, &dom(&["a", "b"]));
        assert_eq!(f, p("Pa∨Pb"));
    }

    #[test]
    fn instances_fold_to_the_right() {
        let mut f = p("∀x(Px)");
        expand(&mut f, &dom(&["a", "b", "c"]));
        assert_eq!(f, p("Pa∧(Pb∧Pc)"));
    }

    #[test]
    fn expand_without_constants_is_noop() {
        let mut f = p("∀x(Px)");
        expand(&mut f, &dom(&["x"]));
        assert_eq!(f, p("∀x(Px)"));
        expand(&mut f, &Domain::new());
        assert_eq!(f, p("∀x(Px)"));
    }

    #[test]
    fn nested_quantifiers_expand_innermost_first() {
        let mut f = p("∀x∃y(Rxy)");
        expand(&mut f, &dom(&["a", "b"]));
        assert_eq!(f, p("(Raa∨Rab)∧(Rba∨Rbb)"));
    }

    #[test]
    fn quantifier_below_connectives() {
        let mut f = p("~(∀x(Px))∨Q");
        expand(&mut f, &dom(&["a", "b"]));
        assert_eq!(f, p("~(Pa∧Pb)∨Q"));
    }

    #[test]
    fn expansion_leaves_clones_untouched() {
        let quantified = p("∀x(Px)∧Pa");
        let mut expanded = quantified.clone();
        expand(&mut expanded, &Domain::of(&quantified));
        assert!(quantified.has_quantifiers());
        assert!(!expanded.has_quantifiers());
        assert_eq!(expanded, p("Pa∧Pa"));
    }

    #[test]
    fn substitution_is_textual() {
        let mut f = p("Rxx∧Sx(x,y)");
        substitute(&mut f, 'x', "c");
        assert_eq!(f, p("Rcc∧Sc(c,y)"));
    }

    #[test]
    fn domain_display() {
        assert_eq!(dom(&["a", "b"]).to_string(), "{a, b}");
    }
}
