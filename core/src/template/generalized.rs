//! Template generalization
//!
//! Turns a labeled equation system into a [`Template`] in three steps:
//!
//! 1. every variable gets a base index and each equation mentioning it gets a
//!    fresh occurrence-indexed unknown `u_<base>_<k>`;
//! 2. every literal that also appears in the problem text (in text order) is
//!    replaced by a fresh number slot `n_<i>` in each equation containing it;
//! 3. occurrences are unified back to `u_<base>` and the system is solved for
//!    the unknowns in terms of the number slots.
//!
//! Substitution is syntactic, so `x - 5` keeps its `5` until it becomes a slot.

use super::signature::SlotSignature;
use super::{TemplateError, TemplateResult};
use crate::symbolic::{
    solve_linear, Equation, Expr, Rational, RationalFunction, Solution, Symbol, SymbolMap,
    SymbolicResult,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Slot-generalized equation system with its solved form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TemplateRecord", into = "TemplateRecord")]
pub struct Template {
    equations: Vec<Equation>,
    solution: Option<Solution>,
}

/// Persisted form of a [`Template`]
///
/// ```json
/// { "equations": ["u_0_0 + n_0 = n_1"], "solution": { "u_0": "n_1 - n_0" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub equations: Vec<String>,
    pub solution: Option<BTreeMap<Symbol, String>>,
}

impl Template {
    /// Build a template from already generalized parts, checking its structure
    pub fn new(equations: Vec<Equation>, solution: Option<Solution>) -> TemplateResult<Self> {
        let template = Template {
            equations,
            solution,
        };
        template.validate()?;
        Ok(template)
    }

    /// Generalize a labeled system against the numbers found in its problem text
    pub fn generalize(equations: &[Equation], numbers: &[Rational]) -> Template {
        let with_unknowns = Self::generalize_unknowns(equations);
        let with_slots = Self::generalize_numbers(&with_unknowns, numbers);
        let solution = Self::solve(&with_slots);

        debug!(
            equations = with_slots.len(),
            solved = solution.is_some(),
            "generalized template"
        );

        Template {
            equations: with_slots,
            solution,
        }
    }

    /// Replace variables with occurrence-indexed unknowns
    pub fn generalize_unknowns(equations: &[Equation]) -> Vec<Equation> {
        let symbols: BTreeSet<Symbol> = equations.iter().flat_map(Equation::free_symbols).collect();
        let mut occurrences = vec![0u32; symbols.len()];

        equations
            .iter()
            .map(|equation| {
                let present = equation.free_symbols();
                let mut renames = SymbolMap::new();
                for (base, symbol) in symbols.iter().enumerate() {
                    if present.contains(symbol) {
                        renames.insert(symbol.clone(), Symbol::unknown(base as u32, occurrences[base]));
                        occurrences[base] += 1;
                    }
                }
                equation.rename(&renames)
            })
            .collect()
    }

    /// Replace literals taken from the problem text with number slots
    pub fn generalize_numbers(equations: &[Equation], numbers: &[Rational]) -> Vec<Equation> {
        let mut generalized = equations.to_vec();
        let mut count = 0u32;

        for number in numbers {
            let literal = Expr::Num(*number);
            for equation in generalized.iter_mut() {
                if equation.contains(&literal) {
                    let slot = Expr::Sym(Symbol::number(count));
                    count += 1;
                    *equation = equation.replace(&literal, &slot);
                }
            }
        }

        generalized
    }

    /// Solve a generalized system for its unified unknowns
    ///
    /// Returns `None` (with a warning) when the system has no unique linear
    /// solution.
    pub fn solve(equations: &[Equation]) -> Option<Solution> {
        let unify: SymbolMap = equations
            .iter()
            .flat_map(Equation::free_symbols)
            .filter(Symbol::is_unknown)
            .map(|symbol| {
                let unified = symbol.unified();
                (symbol, unified)
            })
            .collect();
        let unknowns: Vec<Symbol> = unify.values().cloned().collect::<BTreeSet<_>>().into_iter().collect();

        let system = equations
            .iter()
            .map(|equation| equation.rename(&unify).to_rational_function())
            .collect::<SymbolicResult<Vec<_>>>();

        match system.and_then(|system| solve_linear(&system, &unknowns)) {
            Ok(Some(solution)) => Some(solution),
            Ok(None) => {
                warn!(
                    system = %display_equations(equations),
                    "generalized system has no unique solution"
                );
                None
            }
            Err(e) => {
                warn!(
                    system = %display_equations(equations),
                    error = %e,
                    "could not solve generalized system"
                );
                None
            }
        }
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    fn symbols_where(&self, keep: impl Fn(&Symbol) -> bool) -> BTreeSet<Symbol> {
        self.equations
            .iter()
            .flat_map(Equation::free_symbols)
            .filter(|symbol| keep(symbol))
            .collect()
    }

    /// Occurrence-indexed unknown slots, in slot order
    pub fn unknown_slots(&self) -> BTreeSet<Symbol> {
        self.symbols_where(Symbol::is_unknown)
    }

    /// Number slots, in slot order
    pub fn number_slots(&self) -> BTreeSet<Symbol> {
        self.symbols_where(Symbol::is_number_slot)
    }

    /// Unified unknowns, in the order solutions are reported
    pub fn unknowns(&self) -> Vec<Symbol> {
        self.unknown_slots()
            .iter()
            .map(Symbol::unified)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Index of the first equation mentioning `slot`
    pub fn equation_index_of(&self, slot: &Symbol) -> Option<usize> {
        let target = Expr::Sym(slot.clone());
        self.equations.iter().position(|equation| equation.contains(&target))
    }

    pub fn slot_signature(&self, template_index: usize, slot: &Symbol) -> Option<SlotSignature> {
        let equation_index = self.equation_index_of(slot)?;
        Some(SlotSignature::new(template_index, equation_index, slot.clone()))
    }

    /// Check that every unknown is solved and solutions mention only number slots
    pub fn validate(&self) -> TemplateResult<()> {
        let Some(solution) = &self.solution else {
            return Ok(());
        };

        if let Some(missing) = self.unknowns().into_iter().find(|u| !solution.contains_key(u)) {
            return Err(TemplateError::MissingSolution(missing));
        }

        for (unknown, value) in solution {
            if !value.symbols().iter().all(Symbol::is_number_slot) {
                return Err(TemplateError::InvalidSolution(unknown.clone()));
            }
        }

        Ok(())
    }

    /// Rebuild a template from its persisted form
    pub fn from_record(record: &TemplateRecord) -> TemplateResult<Self> {
        let equations = record
            .equations
            .iter()
            .map(|text| Equation::parse(text))
            .collect::<SymbolicResult<Vec<_>>>()?;

        let solution = match &record.solution {
            Some(entries) => Some(
                entries
                    .iter()
                    .map(|(unknown, text)| Ok((unknown.clone(), Expr::parse(text)?.to_rational_function()?)))
                    .collect::<SymbolicResult<BTreeMap<Symbol, RationalFunction>>>()?,
            ),
            None => None,
        };

        Template::new(equations, solution)
    }

    pub fn to_record(&self) -> TemplateRecord {
        TemplateRecord {
            equations: self.equations.iter().map(ToString::to_string).collect(),
            solution: self.solution.as_ref().map(|solution| {
                solution
                    .iter()
                    .map(|(unknown, value)| (unknown.clone(), value.to_string()))
                    .collect()
            }),
        }
    }
}

impl TryFrom<TemplateRecord> for Template {
    type Error = TemplateError;

    fn try_from(record: TemplateRecord) -> Result<Self, Self::Error> {
        Template::from_record(&record)
    }
}

impl From<Template> for TemplateRecord {
    fn from(template: Template) -> Self {
        template.to_record()
    }
}

fn display_equations(equations: &[Equation]) -> String {
    equations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equations(lines: &[&str]) -> Vec<Equation> {
        lines.iter().map(|l| Equation::parse(l).unwrap()).collect()
    }

    fn numbers(values: &[i128]) -> Vec<Rational> {
        values.iter().map(|v| Rational::integer(*v)).collect()
    }

    fn printed(equations: &[Equation]) -> Vec<String> {
        equations.iter().map(ToString::to_string).collect()
    }

    fn rf(text: &str) -> RationalFunction {
        Expr::parse(text).unwrap().to_rational_function().unwrap()
    }

    #[test]
    fn test_generalize_unknowns_counts_occurrences() {
        let generalized = Template::generalize_unknowns(&equations(&["x + y = 10", "x - y = 2"]));
        assert_eq!(printed(&generalized), vec!["u_0_0 + u_1_0 = 10", "u_0_1 - u_1_1 = 2"]);
    }

    #[test]
    fn test_generalize_unknowns_skips_absent_symbols() {
        let generalized = Template::generalize_unknowns(&equations(&["a = 3", "b = 2*a"]));
        assert_eq!(printed(&generalized), vec!["u_0_0 = 3", "u_1_0 = 2*u_0_1"]);
    }

    #[test]
    fn test_generalize_numbers_per_equation_slots() {
        let with_unknowns = Template::generalize_unknowns(&equations(&["x + y = 5", "2*x = 5 + y"]));
        let generalized = Template::generalize_numbers(&with_unknowns, &numbers(&[5, 2]));
        assert_eq!(
            printed(&generalized),
            vec!["u_0_0 + u_1_0 = n_0", "n_2*u_0_1 = n_1 + u_1_1"]
        );
    }

    #[test]
    fn test_literals_not_in_text_stay_constant() {
        let template = Template::generalize(&equations(&["0.01*x = 3"]), &numbers(&[3]));
        assert_eq!(printed(template.equations()), vec!["0.01*u_0_0 = n_0"]);
        let solution = template.solution().unwrap();
        assert_eq!(solution[&Symbol::unified_unknown(0)], rf("100*n_0"));
    }

    #[test]
    fn test_solve_two_unknowns() {
        let template = Template::generalize(&equations(&["x + y = 10", "x - y = 2"]), &numbers(&[10, 2]));
        let solution = template.solution().unwrap();
        assert_eq!(solution[&Symbol::unified_unknown(0)], rf("(n_0 + n_1)/2"));
        assert_eq!(solution[&Symbol::unified_unknown(1)], rf("(n_0 - n_1)/2"));
        assert_eq!(template.unknowns(), vec![Symbol::unified_unknown(0), Symbol::unified_unknown(1)]);
        assert_eq!(template.unknown_slots().len(), 4);
        assert_eq!(template.number_slots().len(), 2);
    }

    #[test]
    fn test_underdetermined_system_has_no_solution() {
        let template = Template::generalize(&equations(&["x + y = 3"]), &numbers(&[3]));
        assert!(template.solution().is_none());
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_nonlinear_system_has_no_solution() {
        let template = Template::generalize(&equations(&["x*y = 6", "x + y = 5"]), &numbers(&[6, 5]));
        assert!(template.solution().is_none());
    }

    #[test]
    fn test_overflowing_system_has_no_solution() {
        let template = Template::generalize(
            &equations(&["x = 1/(-170141183460469231731687303715884105727 - 1)"]),
            &[],
        );
        assert!(template.solution().is_none());
    }

    #[test]
    fn test_equation_index_and_signature() {
        let template = Template::generalize(&equations(&["x + y = 10", "x - y = 2"]), &numbers(&[10, 2]));
        assert_eq!(template.equation_index_of(&Symbol::number(1)), Some(1));
        assert_eq!(template.equation_index_of(&Symbol::number(7)), None);
        let signature = template.slot_signature(4, &Symbol::unknown(1, 1)).unwrap();
        assert_eq!(signature, SlotSignature::new(4, 1, Symbol::unknown(1, 1)));
    }

    #[test]
    fn test_record_roundtrip() {
        let template = Template::generalize(&equations(&["x + y = 10", "0.5*x - y = 2"]), &numbers(&[10, 2]));
        let json = serde_json::to_string(&template).unwrap();
        let back: Template = serde_json::from_str(&json).unwrap();
        assert_eq!(back.equations(), template.equations());
        let (a, b) = (back.solution().unwrap(), template.solution().unwrap());
        assert_eq!(a.len(), b.len());
        for (unknown, value) in a {
            assert_eq!(&b[unknown], value);
        }
    }

    #[test]
    fn test_record_without_solution() {
        let record = TemplateRecord {
            equations: vec!["u_0_0 + u_1_0 = n_0".to_string()],
            solution: None,
        };
        let template = Template::from_record(&record).unwrap();
        assert!(template.solution().is_none());
        assert_eq!(template.to_record(), record);
    }

    #[test]
    fn test_record_missing_solution_is_rejected() {
        let mut solution = BTreeMap::new();
        solution.insert(Symbol::unified_unknown(0), "n_0".to_string());
        let record = TemplateRecord {
            equations: vec!["u_0_0 + u_1_0 = n_0".to_string()],
            solution: Some(solution),
        };
        assert_eq!(
            Template::from_record(&record).unwrap_err(),
            TemplateError::MissingSolution(Symbol::unified_unknown(1))
        );
    }

    #[test]
    fn test_record_invalid_solution_is_rejected() {
        let mut solution = BTreeMap::new();
        solution.insert(Symbol::unified_unknown(0), "n_0 + x".to_string());
        let record = TemplateRecord {
            equations: vec!["u_0_0 = n_0".to_string()],
            solution: Some(solution),
        };
        assert_eq!(
            Template::from_record(&record).unwrap_err(),
            TemplateError::InvalidSolution(Symbol::unified_unknown(0))
        );
    }

    #[test]
    fn test_record_parse_error() {
        let record = TemplateRecord {
            equations: vec!["u_0_0 + = n_0".to_string()],
            solution: None,
        };
        assert!(matches!(Template::from_record(&record), Err(TemplateError::Symbolic(_))));
    }
}
