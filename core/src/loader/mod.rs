//! Dataset loader for labeled word problems
//!
//! Reads labeled examples, per-problem NLP documents and persisted templates
//! from JSON

pub mod dataset;

pub use dataset::{
    load_document, load_examples, load_templates, load_word_problem, load_word_problems,
    parse_file_name,
};

use thiserror::Error;

/// Loader result
pub type LoadResult<T> = Result<T, LoadError>;

/// Dataset loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// File not found or unreadable
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// JSON parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Well-formed JSON with invalid content
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// No labeled example with this index
    #[error("No example with index {0}")]
    MissingExample(u32),
}
