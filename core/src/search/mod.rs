//! Search module - beam search over template derivations
//!
//! Derivation enumeration, template-balanced beam pruning, score ordering and
//! gold-consistency validation

pub mod beam;
pub mod derivation;
pub mod scoring;
pub mod validation;

pub use beam::*;
pub use derivation::*;
pub use scoring::*;
pub use validation::*;
