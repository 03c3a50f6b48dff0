//! Equation templates
//!
//! A template is a labeled equation system with its variables and
//! text-derived literals replaced by anonymous slots, together with the
//! closed-form solution of each unknown in terms of the number slots.
//! Templates compare equal when they agree up to a renaming of slots.

pub mod equivalence;
pub mod generalized;
pub mod set;
pub mod signature;

pub use generalized::{Template, TemplateRecord};
pub use set::TemplateSet;
pub use signature::{SlotPairSignature, SlotSignature};

use crate::symbolic::{Symbol, SymbolicError};
use thiserror::Error;

/// Malformed template structures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error(transparent)]
    Symbolic(#[from] SymbolicError),

    /// An unknown of the equations has no solution entry
    #[error("unknown {0} has no solution")]
    MissingSolution(Symbol),

    /// A solution mentions something other than a number slot
    #[error("solution for {0} mentions a symbol that is not a number slot")]
    InvalidSolution(Symbol),
}

/// Template operation result
pub type TemplateResult<T> = Result<T, TemplateError>;
