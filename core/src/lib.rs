//! wordmath core
//!
//! Equation templates and derivation beam search for arithmetic word problems

pub mod symbolic; // Exact expressions, rational functions, linear solving
pub mod problem;  // Labeled examples, NLP documents, word problems
pub mod template; // Template generalization and equivalence
pub mod search;   // Derivations and template-balanced beam search
pub mod model;    // Features and linear scoring
pub mod loader;   // Dataset loaders (JSON examples and parses)

pub use symbolic::{Equation, Expr, Rational, RationalFunction, SlotKind, Symbol, SymbolicError};
pub use problem::{Document, LabeledExample, Location, NounMention, NumberMention, WordProblem};
pub use template::{SlotPairSignature, SlotSignature, Template, TemplateError, TemplateRecord, TemplateSet};
pub use search::{BeamConfig, BeamSearch, Derivation, DerivationSummary, GoldValidator, SearchOutcome};
pub use model::{Classifier, FeatureExtractor, FeatureKey, Prediction};
pub use loader::{LoadError, LoadResult};
