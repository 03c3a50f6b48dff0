//! Equations as pairs of syntactic expressions

use super::error::SymbolicResult;
use super::expr::Expr;
use super::parser;
use super::poly::RationalFunction;
use super::symbols::{Symbol, SymbolMap};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// `lhs = rhs`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

impl Equation {
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Equation { lhs, rhs }
    }

    /// Parse text of the form `lhs = rhs`
    pub fn parse(input: &str) -> SymbolicResult<Self> {
        let (lhs, rhs) = parser::parse_equation(input)?;
        Ok(Equation { lhs, rhs })
    }

    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut symbols = self.lhs.free_symbols();
        symbols.extend(self.rhs.free_symbols());
        symbols
    }

    pub fn contains(&self, target: &Expr) -> bool {
        self.lhs.contains(target) || self.rhs.contains(target)
    }

    pub fn replace(&self, old: &Expr, new: &Expr) -> Equation {
        Equation {
            lhs: self.lhs.replace(old, new),
            rhs: self.rhs.replace(old, new),
        }
    }

    pub fn rename(&self, map: &SymbolMap) -> Equation {
        Equation {
            lhs: self.lhs.rename(map),
            rhs: self.rhs.rename(map),
        }
    }

    /// Canonical form of `lhs - rhs`
    pub fn to_rational_function(&self) -> SymbolicResult<RationalFunction> {
        self.lhs.to_rational_function()?.sub(&self.rhs.to_rational_function()?)
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

impl FromStr for Equation {
    type Err = super::error::SymbolicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Equation::parse(s)
    }
}
