//! Candidate quantities and nouns found in problem text

use crate::symbolic::Rational;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a token: sentence index, then token index within the sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub sentence: usize,
    pub token: usize,
}

impl Location {
    pub fn new(sentence: usize, token: usize) -> Self {
        Self { sentence, token }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sentence, self.token)
    }
}

/// A number mentioned in the text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberMention {
    pub value: f64,
    pub location: Location,
}

impl NumberMention {
    pub fn new(value: f64, location: Location) -> Self {
        Self { value, location }
    }

    /// Exact value used to match equation literals
    pub fn exact(&self) -> Option<Rational> {
        Rational::from_f64(self.value)
    }

    pub fn is_integer(&self) -> bool {
        self.value.is_finite() && self.value.fract() == 0.0
    }
}

/// A noun that may name an unknown quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NounMention {
    pub word: String,
    pub lemma: String,
    pub location: Location,
}

impl NounMention {
    pub fn new(word: impl Into<String>, lemma: impl Into<String>, location: Location) -> Self {
        Self {
            word: word.into(),
            lemma: lemma.into(),
            location,
        }
    }
}
