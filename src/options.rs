const DEFAULT_MIN_DOMAIN_SIZE: usize = 2;
const DEFAULT_EXPAND_QUANTIFIERS: bool = true;
const DEFAULT_CHECK_MODEL: bool = false;

#[derive(Debug, Clone)]
pub struct Options {
    /// The smallest quantifier domain that is considered meaningful.
    /// Arguments that still contain quantifiers and whose domain has fewer constants are reported as unsolvable.
    pub min_domain_size: usize,
    /// Whether to expand quantifiers over the domain of the argument before normalization.
    /// If this is disabled, quantified arguments fail during CNF conversion.
    pub expand_quantifiers: bool,
    /// Whether to check that a countermodel returned by the SAT solver actually satisfies the validity formula.
    pub check_model: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            min_domain_size: DEFAULT_MIN_DOMAIN_SIZE,
            expand_quantifiers: DEFAULT_EXPAND_QUANTIFIERS,
            check_model: DEFAULT_CHECK_MODEL,
        }
    }
}
