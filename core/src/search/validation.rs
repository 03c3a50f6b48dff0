//! Gold-consistency validation
//!
//! During training only derivations that can still reproduce the labeled
//! answer are kept: they must use the gold template, and once complete their
//! solved values must equal the gold solutions.

use super::derivation::Derivation;

/// Default relative tolerance when comparing solved values
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Validity predicate against a gold template and gold solutions
#[derive(Debug, Clone)]
pub struct GoldValidator {
    template_index: usize,
    solutions: Vec<f64>,
    tolerance: f64,
}

impl GoldValidator {
    pub fn new(template_index: usize, solutions: &[f64]) -> Self {
        Self {
            template_index,
            solutions: solutions.to_vec(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn template_index(&self) -> usize {
        self.template_index
    }

    fn close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.tolerance * b.abs().max(1.0)
    }

    /// Whether solved values match the gold solutions as a multiset
    pub fn matches(&self, solved: &[Option<f64>]) -> bool {
        if solved.len() != self.solutions.len() {
            return false;
        }
        let Some(mut values) = solved.iter().copied().collect::<Option<Vec<f64>>>() else {
            return false;
        };

        let mut gold = self.solutions.clone();
        values.sort_by(f64::total_cmp);
        gold.sort_by(f64::total_cmp);
        values.iter().zip(&gold).all(|(v, g)| self.close(*v, *g))
    }

    pub fn is_valid(&self, derivation: &Derivation<'_>) -> bool {
        if derivation.template_index() != self.template_index {
            return false;
        }
        !derivation.is_complete() || self.matches(&derivation.solve())
    }
}
