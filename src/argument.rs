//! Arguments and the reduction of validity to unsatisfiability.

use std::fmt::Display;
use std::io::BufRead;
use std::time::Instant;

use itertools::Itertools;

use crate::{
    cnf::{to_cnf, CnfFormula},
    error::Error,
    formula::{expand, parse, Assignment, BinOp, Domain, Formula},
    options::Options,
    sat::{encode, Cadical, Clause, SatBackend, SatResult, SymbolTable},
};

/// The outcome of checking an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The premises entail the conclusion
    Valid,
    /// The premises do not entail the conclusion.
    /// The assignment makes all premises true and the conclusion false.
    Invalid(Assignment),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// Returns the countermodel if the argument is invalid
    pub fn counterexample(&self) -> Option<&Assignment> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(asn) => Some(asn),
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Valid => write!(f, "valid"),
            Verdict::Invalid(_) => write!(f, "invalid"),
        }
    }
}

/// An argument consisting of at least one premise and a conclusion.
/// The argument is valid if every assignment that satisfies all premises also satisfies the conclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    premises: Vec<Formula>,
    conclusion: Formula,
}

impl Argument {
    /// Parses the premises and the conclusion.
    ///
    /// # Errors
    /// Returns [Error::EmptyPremiseSet] if there are no premises and [Error::Parse] if a formula cannot be parsed.
    pub fn new<S: AsRef<str>>(
        premises: impl IntoIterator<Item = S>,
        conclusion: &str,
    ) -> Result<Self, Error> {
        let premises: Vec<S> = premises.into_iter().collect();
        if premises.is_empty() {
            return Err(Error::EmptyPremiseSet);
        }
        let premises = premises
            .iter()
            .map(|p| parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let conclusion = parse(conclusion)?;
        Ok(Self {
            premises,
            conclusion,
        })
    }

    /// Creates an argument from already constructed formulas.
    ///
    /// # Errors
    /// Returns [Error::EmptyPremiseSet] if there are no premises.
    pub fn from_formulas(premises: Vec<Formula>, conclusion: Formula) -> Result<Self, Error> {
        if premises.is_empty() {
            return Err(Error::EmptyPremiseSet);
        }
        Ok(Self {
            premises,
            conclusion,
        })
    }

    /// Reads an argument from its textual representation.
    /// Every non-empty line is a premise, except for the last one, which is the conclusion and starts with `⊢` or `|-`.
    /// Lines starting with `#` are comments.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, Error> {
        let mut premises = Vec::new();
        let mut conclusion: Option<String> = None;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if conclusion.is_some() {
                return Err(Error::InvalidArgumentFile(format!(
                    "line {}: the conclusion must be the last formula",
                    i + 1
                )));
            }
            match line
                .strip_prefix('⊢')
                .or_else(|| line.strip_prefix("|-"))
            {
                Some(c) => conclusion = Some(c.trim().to_string()),
                None => premises.push(line.to_string()),
            }
        }
        match conclusion {
            Some(c) => Self::new(premises, &c),
            None => Err(Error::InvalidArgumentFile("missing conclusion".to_string())),
        }
    }

    pub fn premises(&self) -> &[Formula] {
        &self.premises
    }

    pub fn conclusion(&self) -> &Formula {
        &self.conclusion
    }

    /// The formula `p1 ∧ ... ∧ pn ∧ ¬c`, which is unsatisfiable iff the argument is valid.
    pub fn validity_formula(&self) -> Formula {
        let mut conjuncts = self.premises.clone();
        conjuncts.push(Formula::not(self.conclusion.clone()));
        // There is at least the negated conclusion
        Formula::fold_right(conjuncts, BinOp::And)
            .unwrap_or_else(|| Formula::not(self.conclusion.clone()))
    }

    /// The constants the quantifiers of this argument range over.
    pub fn domain(&self) -> Domain {
        self.validity_formula().constants()
    }

    /// Returns `false` if the argument contains quantifiers but its domain is too small to expand them.
    pub fn is_solvable(&self) -> bool {
        self.check_solvable(Options::default().min_domain_size).is_ok()
    }

    fn check_solvable(&self, min_domain_size: usize) -> Result<(), Error> {
        let validity = self.validity_formula();
        if !validity.has_quantifiers() {
            return Ok(());
        }
        let domain = validity.constants();
        if domain.len() < min_domain_size {
            return Err(Error::UnsolvableArgument {
                domain: domain.iter().map(String::from).collect(),
            });
        }
        Ok(())
    }

    /// Expands the quantifiers of all premises and the conclusion over the given domain.
    pub fn expand_quantifiers(&mut self, domain: &Domain) {
        for p in self.premises.iter_mut() {
            expand(p, domain);
        }
        expand(&mut self.conclusion, domain);
    }

    /// Brings the validity formula into the shape that is handed to CNF conversion.
    fn prepare(&self, options: &Options) -> Result<Formula, Error> {
        self.check_solvable(options.min_domain_size)?;
        let mut validity = self.validity_formula();
        if options.expand_quantifiers && validity.has_quantifiers() {
            let domain = validity.constants();
            log::debug!("Expanding quantifiers over {}", domain);
            expand(&mut validity, &domain);
        }
        Ok(validity)
    }

    /// Returns the CNF of the validity formula.
    /// Quantifiers are expanded over the domain of the argument first.
    pub fn to_cnf(&self) -> Result<CnfFormula, Error> {
        self.to_cnf_with(&Options::default())
    }

    /// Returns the CNF of the validity formula, prepared according to the given options.
    pub fn to_cnf_with(&self, options: &Options) -> Result<CnfFormula, Error> {
        let validity = self.prepare(options)?;
        Ok(to_cnf(validity)?)
    }

    /// Returns the clauses of the CNF of the validity formula and the mapping of atoms to variables.
    pub fn clauses(&self) -> Result<(Vec<Clause>, SymbolTable), Error> {
        Ok(encode(&self.to_cnf()?))
    }

    /// Checks the validity of the argument with CaDiCaL and the default options.
    pub fn solve(&self) -> Result<Verdict, Error> {
        self.solve_with(&Options::default(), &mut Cadical::new())
    }

    /// Checks the validity of the argument with the given options and SAT solver.
    /// The argument is valid iff the clauses of its validity formula are unsatisfiable.
    /// Otherwise, the model of the clauses is a countermodel.
    ///
    /// # Errors
    /// Returns [Error::UnsolvableArgument] if the argument contains quantifiers and its domain has fewer than `min_domain_size` constants.
    /// Other errors are propagated from CNF conversion and the SAT solver.
    pub fn solve_with(
        &self,
        options: &Options,
        backend: &mut impl SatBackend,
    ) -> Result<Verdict, Error> {
        let ts = Instant::now();
        let validity = self.prepare(options)?;
        log::debug!("Validity formula: {}", validity);

        let cnf = to_cnf(validity.clone())?;
        log::debug!("CNF: {}", cnf);

        let (clauses, symbols) = encode(&cnf);
        log::debug!(
            "Encoded {} clauses over {} variables",
            clauses.len(),
            symbols.len()
        );

        let verdict = match backend.solve(&clauses)? {
            SatResult::Unsat => Verdict::Valid,
            SatResult::Sat(model) => {
                let asn = symbols.decode(&model);
                if options.check_model && validity.evaluate(&asn) != Some(true) {
                    return Err(Error::ModelCheckFailed(format!(
                        "{} does not satisfy {}",
                        asn, validity
                    )));
                }
                Verdict::Invalid(asn)
            }
        };
        log::info!("Argument is {} ({}ms)", verdict, ts.elapsed().as_millis());
        Ok(verdict)
    }
}

impl Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ⊢ {}",
            self.premises.iter().join(", "),
            self.conclusion
        )
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use crate::formula::ParseError;

    use super::*;

    fn check(premises: &[&str], conclusion: &str) -> Verdict {
        Argument::new(premises.iter().copied(), conclusion)
            .unwrap()
            .solve()
            .unwrap()
    }

    /// Always answers with the same model
    struct FixedModel(IndexMap<u32, bool>);

    impl SatBackend for FixedModel {
        fn solve(&mut self, _: &[Clause]) -> Result<SatResult, Error> {
            Ok(SatResult::Sat(self.0.clone()))
        }
    }

    /// Records the clauses it is given and answers with a fixed result
    struct Recording {
        seen: Vec<Vec<Clause>>,
        answer: SatResult,
    }

    impl SatBackend for Recording {
        fn solve(&mut self, clauses: &[Clause]) -> Result<SatResult, Error> {
            self.seen.push(clauses.to_vec());
            Ok(self.answer.clone())
        }
    }

    #[test]
    fn backend_receives_validity_clauses() {
        let arg = Argument::new(["∀x(Px→Qx)", "Pa"], "Qa").unwrap();
        let mut backend = Recording {
            seen: vec![],
            answer: SatResult::Unsat,
        };
        let verdict = arg.solve_with(&Options::default(), &mut backend).unwrap();
        assert!(verdict.is_valid());
        // (~Pa ∨ Qa) ∧ Pa ∧ ~Qa after expanding over {x, a}
        let seen = backend
            .seen
            .iter()
            .map(|cs| cs.iter().map(|c| c.to_vec()).collect_vec())
            .collect_vec();
        assert_eq!(seen, vec![vec![vec![-1, 2], vec![1], vec![-2]]]);
    }

    #[test]
    fn backend_model_becomes_counterexample() {
        let arg = Argument::new(["Q"], "P").unwrap();
        let mut backend = Recording {
            seen: vec![],
            answer: SatResult::Sat([(1, true), (2, false)].into_iter().collect()),
        };
        let verdict = arg.solve_with(&Options::default(), &mut backend).unwrap();
        let model = verdict.counterexample().unwrap();
        assert_eq!(model.get("Q"), Some(true));
        assert_eq!(model.get("P"), Some(false));
        assert_eq!(backend.seen.len(), 1);
    }

    #[test]
    fn modus_ponens_valid() {
        assert_eq!(check(&["P → Q", "P"], "Q"), Verdict::Valid);
    }

    #[test]
    fn converse_invalid() {
        let verdict = check(&["Q"], "P");
        let model = verdict.counterexample().unwrap();
        assert_eq!(model.get("Q"), Some(true));
        assert_eq!(model.get("P"), Some(false));
    }

    #[test]
    fn universal_instantiation_valid() {
        assert!(check(&["∀x(Px→Qx)", "Pa"], "Qa").is_valid());
    }

    #[test]
    fn existential_generalization_valid() {
        assert!(check(&["Pa", "Pb"], "∃x(Px)").is_valid());
        assert!(check(&["Pa"], "∃x(Px)∨Pb").is_valid());
    }

    #[test]
    fn universal_from_instance_invalid() {
        assert!(!check(&["Pa", "Qb"], "∀x(Px)").is_valid());
    }

    #[test]
    fn simplification_valid() {
        assert!(check(&["P∧Q"], "P").is_valid());
    }

    #[test]
    fn affirming_the_consequent_invalid() {
        let verdict = check(&["P→Q", "Q"], "P");
        let model = verdict.counterexample().unwrap();
        assert_eq!(model.get("P"), Some(false));
        assert_eq!(model.get("Q"), Some(true));
    }

    #[test]
    fn double_negation_valid() {
        assert!(check(&["~~P"], "P").is_valid());
        assert!(check(&["P"], "¬¬P").is_valid());
    }

    #[test]
    fn exclusive_or_valid() {
        assert!(check(&["P⊕Q", "P"], "~Q").is_valid());
        assert!(!check(&["P⊕Q"], "P").is_valid());
    }

    #[test]
    fn biconditional_valid() {
        assert!(check(&["P↔Q", "Q"], "P").is_valid());
    }

    #[test]
    fn contradictory_premises_valid() {
        assert!(check(&["P", "~P"], "Q").is_valid());
    }

    #[test]
    fn tautology_conclusion_valid() {
        assert!(check(&["Q"], "P∨~P").is_valid());
    }

    #[test]
    fn empty_premise_set() {
        let res = Argument::new(Vec::<&str>::new(), "P");
        assert!(matches!(res, Err(Error::EmptyPremiseSet)));
        let res = Argument::from_formulas(vec![], Formula::atom("P"));
        assert!(matches!(res, Err(Error::EmptyPremiseSet)));
    }

    #[test]
    fn parse_error_propagated() {
        let res = Argument::new(["P∧"], "P");
        assert!(matches!(
            res,
            Err(Error::Parse(ParseError::MissingOperand { .. }))
        ));
        let res = Argument::new(["P"], "(P");
        assert!(matches!(
            res,
            Err(Error::Parse(ParseError::UnbalancedBrackets(_)))
        ));
    }

    #[test]
    fn trivial_domain_unsolvable() {
        let arg = Argument::new(["∀x(Px)"], "Px").unwrap();
        assert!(!arg.is_solvable());
        match arg.solve() {
            Err(Error::UnsolvableArgument { domain }) => assert_eq!(domain, vec!["x"]),
            other => panic!("expected unsolvable argument, got {:?}", other),
        }
    }

    #[test]
    fn propositional_argument_always_solvable() {
        let arg = Argument::new(["P"], "Q").unwrap();
        assert!(arg.domain().is_empty());
        assert!(arg.is_solvable());
    }

    #[test]
    fn unexpanded_quantifier_rejected() {
        let arg = Argument::new(["∀x(Px)"], "Pa").unwrap();
        let options = Options {
            expand_quantifiers: false,
            ..Default::default()
        };
        assert!(matches!(
            arg.solve_with(&options, &mut Cadical::new()),
            Err(Error::Structure(_))
        ));
    }

    #[test]
    fn expand_quantifiers_mutates_argument() {
        let mut arg = Argument::new(["∀x(Px→Qx)", "Pa"], "Qa").unwrap();
        let domain = arg.domain();
        arg.expand_quantifiers(&domain);
        assert_eq!(arg.premises()[0], parse("Pa→Qa").unwrap());
        assert!(!arg.validity_formula().has_quantifiers());
    }

    #[test]
    fn validity_formula_negates_conclusion() {
        let arg = Argument::new(["P→Q", "P"], "Q").unwrap();
        assert_eq!(arg.validity_formula(), parse("(P→Q)∧(P∧~Q)").unwrap());
    }

    #[test]
    fn clauses_of_argument() {
        let arg = Argument::new(["P→Q", "P"], "Q").unwrap();
        let (clauses, symbols) = arg.clauses().unwrap();
        let clauses = clauses.into_iter().map(|c| c.to_vec()).collect_vec();
        assert_eq!(clauses, vec![vec![-1, 2], vec![1], vec![-2]]);
        assert_eq!(symbols.atom(1), Some("P"));
    }

    #[test]
    fn bogus_model_detected() {
        let arg = Argument::new(["P"], "P").unwrap();
        let options = Options {
            check_model: true,
            ..Default::default()
        };
        let mut backend = FixedModel([(1, true)].into_iter().collect());
        assert!(matches!(
            arg.solve_with(&options, &mut backend),
            Err(Error::ModelCheckFailed(_))
        ));
        // Without the check, the answer of the backend is trusted
        let verdict = arg.solve_with(&Options::default(), &mut backend).unwrap();
        assert!(!verdict.is_valid());
    }

    #[test]
    fn countermodel_passes_check() {
        let arg = Argument::new(["P∨Q", "P→R"], "R").unwrap();
        let options = Options {
            check_model: true,
            ..Default::default()
        };
        let verdict = arg.solve_with(&options, &mut Cadical::new()).unwrap();
        let model = verdict.counterexample().unwrap();
        assert_eq!(model.get("Q"), Some(true));
        assert_eq!(model.get("R"), Some(false));
    }

    #[test]
    fn display_argument() {
        let arg = Argument::new(["P→Q", "P"], "Q").unwrap();
        assert_eq!(arg.to_string(), "(P→Q), P ⊢ Q");
    }

    #[test]
    fn read_argument() {
        let text = "# modus ponens\nP→Q\n\nP\n⊢ Q\n";
        let arg = Argument::from_reader(text.as_bytes()).unwrap();
        assert_eq!(arg.premises().len(), 2);
        assert_eq!(arg.conclusion(), &Formula::atom("Q"));
        let arg = Argument::from_reader("P\n|- P".as_bytes()).unwrap();
        assert_eq!(arg.conclusion(), &Formula::atom("P"));
    }

    #[test]
    fn read_argument_errors() {
        assert!(matches!(
            Argument::from_reader("P\nQ\n".as_bytes()),
            Err(Error::InvalidArgumentFile(_))
        ));
        assert!(matches!(
            Argument::from_reader("P\n⊢ Q\nR\n".as_bytes()),
            Err(Error::InvalidArgumentFile(_))
        ));
        assert!(matches!(
            Argument::from_reader("⊢ Q\n⊢ R\n".as_bytes()),
            Err(Error::InvalidArgumentFile(_))
        ));
        assert!(matches!(
            Argument::from_reader("⊢ Q\n".as_bytes()),
            Err(Error::EmptyPremiseSet)
        ));
    }
}
