//! Pre-parsed NLP documents
//!
//! One document per problem: sentences of tokens (word, lemma, POS tag and
//! optional named-entity annotation), an optional constituency parse and
//! typed dependencies. Candidate numbers and nouns are read off the tokens.

use super::mention::{Location, NounMention, NumberMention};
use crate::symbolic::Rational;
use serde::{Deserialize, Serialize};

const NUMERIC_ENTITIES: [&str; 3] = ["NUMBER", "MONEY", "PERCENT"];

/// One token of a sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub word: String,
    pub lemma: String,
    pub pos: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_ner: Option<String>,
}

impl Token {
    pub fn new(word: impl Into<String>, lemma: impl Into<String>, pos: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            lemma: lemma.into(),
            pos: pos.into(),
            ner: None,
            normalized_ner: None,
        }
    }

    /// Attach a named-entity tag and its normalized value
    pub fn with_ner(mut self, ner: impl Into<String>, normalized: Option<&str>) -> Self {
        self.ner = Some(ner.into());
        self.normalized_ner = normalized.map(str::to_string);
        self
    }

    pub fn is_noun(&self) -> bool {
        self.pos.starts_with("NN")
    }

    /// Value written directly as the word, e.g. `2,340.00`
    fn word_value(&self) -> Option<f64> {
        let cleaned: String = self.word.chars().filter(|c| *c != ',').collect();
        Rational::parse_decimal(&cleaned)
            .map(|r| r.to_f64())
            .filter(|v| v.is_finite())
    }

    fn multiplier_value(&self) -> Option<f64> {
        match self.word.to_lowercase().as_str() {
            "twice" | "double" => Some(2.0),
            "triple" | "thrice" => Some(3.0),
            "half" => Some(0.5),
            _ => None,
        }
    }

    /// Normalized value of a numeric entity, e.g. `$2340.00` or `>=5.0%`
    fn entity_value(&self) -> Option<f64> {
        let ner = self.ner.as_deref()?;
        if !NUMERIC_ENTITIES.contains(&ner) {
            return None;
        }
        let normalized = self.normalized_ner.as_deref()?;
        let stripped = normalized
            .trim()
            .trim_start_matches(|c: char| matches!(c, '<' | '>' | '=' | '~'))
            .trim_matches(|c: char| matches!(c, '$' | '€' | '£' | '¥' | '%'));
        let cleaned: String = stripped.chars().filter(|c| *c != ',').collect();
        Rational::parse_decimal(&cleaned)
            .map(|r| r.to_f64())
            .filter(|v| v.is_finite())
    }

    /// Numeric value of the token, if it denotes a number
    pub fn number_value(&self) -> Option<f64> {
        self.word_value()
            .or_else(|| self.multiplier_value())
            .or_else(|| self.entity_value())
    }
}

/// Typed dependency between two tokens (1-based indices, 0 is the root)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub kind: String,
    pub relation: String,
    pub governor_index: usize,
    pub dependent_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse: Option<String>,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            ..Self::default()
        }
    }
}

/// Parsed problem text
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }

    /// All tokens with their locations, in text order
    pub fn tokens(&self) -> impl Iterator<Item = (Location, &Token)> {
        self.sentences.iter().enumerate().flat_map(|(s, sentence)| {
            sentence
                .tokens
                .iter()
                .enumerate()
                .map(move |(t, token)| (Location::new(s, t), token))
        })
    }

    /// Lower-cased words, in text order
    pub fn words(&self) -> Vec<String> {
        self.tokens().map(|(_, token)| token.word.to_lowercase()).collect()
    }

    /// Numbers in text order
    ///
    /// Adjacent tokens of one numeric entity span (same tag, same normalized
    /// value) yield a single mention at the first token.
    pub fn numbers(&self) -> Vec<NumberMention> {
        let mut mentions = Vec::new();
        let mut previous: Option<(Location, &Token)> = None;

        for (location, token) in self.tokens() {
            let continues_span = previous.map_or(false, |(prev_location, prev_token)| {
                prev_location.sentence == location.sentence
                    && prev_location.token + 1 == location.token
                    && prev_token.ner.is_some()
                    && prev_token.ner == token.ner
                    && prev_token.normalized_ner.is_some()
                    && prev_token.normalized_ner == token.normalized_ner
            });

            match token.number_value() {
                Some(_) if continues_span => {}
                Some(value) => {
                    mentions.push(NumberMention::new(value, location));
                    previous = Some((location, token));
                    continue;
                }
                None => {}
            }

            previous = match previous {
                Some(_) if continues_span => Some((location, token)),
                _ => None,
            };
        }

        mentions
    }

    /// Nouns in text order
    pub fn nouns(&self) -> Vec<NounMention> {
        self.tokens()
            .filter(|(_, token)| token.is_noun())
            .map(|(location, token)| NounMention::new(token.word.clone(), token.lemma.clone(), location))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(w: &str, pos: &str) -> Token {
        Token::new(w, w.to_lowercase(), pos)
    }

    fn values(document: &Document) -> Vec<f64> {
        document.numbers().iter().map(|m| m.value).collect()
    }

    #[test]
    fn test_numbers_from_words() {
        let document = Document::new(vec![Sentence::new(vec![
            word("Tom", "NNP"),
            word("has", "VBZ"),
            word("3", "CD"),
            word("apples", "NNS"),
            word("and", "CC"),
            word("2,340.50", "CD"),
            word("pears", "NNS"),
        ])]);
        let numbers = document.numbers();
        assert_eq!(values(&document), vec![3.0, 2340.5]);
        assert_eq!(numbers[0].location, Location::new(0, 2));
        assert_eq!(numbers[1].location, Location::new(0, 5));
    }

    #[test]
    fn test_multiplier_words() {
        let document = Document::new(vec![Sentence::new(vec![
            word("Twice", "RB"),
            word("a", "DT"),
            word("number", "NN"),
            word("is", "VBZ"),
            word("half", "NN"),
        ])]);
        assert_eq!(values(&document), vec![2.0, 0.5]);
    }

    #[test]
    fn test_entity_values() {
        let document = Document::new(vec![Sentence::new(vec![
            word("five", "CD").with_ner("NUMBER", Some("5.0")),
            word("percent", "NN").with_ner("PERCENT", Some("%5.0")),
            word("blank", "NN").with_ner("NUMBER", None),
            word("more", "JJR").with_ner("MONEY", Some(">=$12.50")),
        ])]);
        assert_eq!(values(&document), vec![5.0, 5.0, 12.5]);
    }

    #[test]
    fn test_entity_span_collapses() {
        let document = Document::new(vec![Sentence::new(vec![
            word("$", "$").with_ner("MONEY", Some("$2340.00")),
            word("2,340.00", "CD").with_ner("MONEY", Some("$2340.00")),
            word("and", "CC"),
            word("two", "CD").with_ner("NUMBER", Some("200.0")),
            word("hundred", "CD").with_ner("NUMBER", Some("200.0")),
        ])]);
        let numbers = document.numbers();
        assert_eq!(values(&document), vec![2340.0, 200.0]);
        assert_eq!(numbers[0].location, Location::new(0, 0));
        assert_eq!(numbers[1].location, Location::new(0, 3));
    }

    #[test]
    fn test_spans_do_not_cross_sentences() {
        let document = Document::new(vec![
            Sentence::new(vec![word("5", "CD").with_ner("NUMBER", Some("5.0"))]),
            Sentence::new(vec![word("5", "CD").with_ner("NUMBER", Some("5.0"))]),
        ]);
        assert_eq!(values(&document), vec![5.0, 5.0]);
    }

    #[test]
    fn test_nouns_and_words() {
        let document = Document::new(vec![
            Sentence::new(vec![word("Tom", "NNP"), word("buys", "VBZ"), word("Apples", "NNS")]),
            Sentence::new(vec![word("Cost", "NN")]),
        ]);
        let nouns: Vec<String> = document.nouns().into_iter().map(|n| n.word).collect();
        assert_eq!(nouns, vec!["Tom", "Apples", "Cost"]);
        assert_eq!(document.words(), vec!["tom", "buys", "apples", "cost"]);
    }

    #[test]
    fn test_document_json() {
        let json = r#"{
            "sentences": [{
                "tokens": [
                    {"word": "7", "lemma": "7", "pos": "CD", "ner": "NUMBER", "normalized_ner": "7.0"},
                    {"word": "dogs", "lemma": "dog", "pos": "NNS"}
                ],
                "dependencies": [
                    {"kind": "basic", "relation": "num", "governor_index": 2, "dependent_index": 1}
                ]
            }]
        }"#;
        let document: Document = serde_json::from_str(json).unwrap();
        assert_eq!(document.sentences[0].dependencies[0].relation, "num");
        assert_eq!(values(&document), vec![7.0]);
        assert_eq!(document.nouns()[0].lemma, "dog");
    }
}
