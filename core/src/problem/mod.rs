//! Word problems and their parsed text

pub mod labeled;
pub mod mention;
pub mod nlp;
pub mod word_problem;

pub use labeled::LabeledExample;
pub use mention::{Location, NounMention, NumberMention};
pub use nlp::{Dependency, Document, Sentence, Token};
pub use word_problem::WordProblem;
