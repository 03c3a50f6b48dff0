//! Errors raised by the symbolic layer

use super::symbols::Symbol;
use thiserror::Error;

/// Errors that can occur while parsing or manipulating expressions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolicError {
    #[error("could not parse `{input}`: {message}")]
    Parse { input: String, message: String },

    #[error("expression is not a rational function: {0}")]
    NonPolynomial(String),

    #[error("equation is not linear in {0}")]
    NonLinear(Symbol),

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,
}

/// Result type for symbolic operations
pub type SymbolicResult<T> = Result<T, SymbolicError>;
