//! Exact symbolic algebra for equation templates
//!
//! Provides parsing, syntactic substitution, canonical simplification to
//! rational functions, and exact linear solving.

pub mod equation;
pub mod error;
pub mod expr;
pub mod linear;
pub mod parser;
pub mod poly;
pub mod rational;
pub mod symbols;

pub use equation::Equation;
pub use error::{SymbolicError, SymbolicResult};
pub use expr::Expr;
pub use linear::{solve_linear, Solution};
pub use parser::{parse_equation, parse_expr};
pub use poly::{Monomial, Poly, RationalFunction};
pub use rational::Rational;
pub use symbols::{SlotKind, Symbol, SymbolMap};
