//! Labeled training examples

use crate::symbolic::{Equation, SymbolicResult};
use serde::{Deserialize, Serialize};

/// A word problem with its gold equations and solutions
///
/// Field names follow the dataset's JSON keys (`iIndex`, `sQuestion`,
/// `lEquations`, `lSolutions`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledExample {
    #[serde(rename = "iIndex")]
    pub index: u32,

    #[serde(rename = "sQuestion")]
    pub question: String,

    #[serde(rename = "lEquations")]
    pub equations: Vec<String>,

    #[serde(rename = "lSolutions", default)]
    pub solutions: Vec<f64>,
}

impl LabeledExample {
    /// Parse the gold equations; lines without `=` are ignored
    pub fn parse_equations(&self) -> SymbolicResult<Vec<Equation>> {
        self.equations
            .iter()
            .filter(|line| line.contains('='))
            .map(|line| Equation::parse(line))
            .collect()
    }
}
