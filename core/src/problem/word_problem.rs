//! Word problems: a labeled example joined with its parsed text

use super::labeled::LabeledExample;
use super::mention::{NounMention, NumberMention};
use super::nlp::Document;
use crate::symbolic::Rational;
use crate::template::{Template, TemplateResult};
use tracing::warn;

/// A labeled example together with its NLP document and candidate lists
#[derive(Debug, Clone)]
pub struct WordProblem {
    example: LabeledExample,
    document: Document,
    numbers: Vec<NumberMention>,
    nouns: Vec<NounMention>,
}

impl WordProblem {
    /// Join an example with its document, extracting candidates from the document
    pub fn new(example: LabeledExample, document: Document) -> Self {
        let numbers = document.numbers();
        let nouns = document.nouns();
        Self::with_candidates(example, document, numbers, nouns)
    }

    /// Join an example with explicitly supplied candidates
    pub fn with_candidates(
        example: LabeledExample,
        document: Document,
        numbers: Vec<NumberMention>,
        nouns: Vec<NounMention>,
    ) -> Self {
        Self {
            example,
            document,
            numbers,
            nouns,
        }
    }

    pub fn index(&self) -> u32 {
        self.example.index
    }

    pub fn question(&self) -> &str {
        &self.example.question
    }

    pub fn numbers(&self) -> &[NumberMention] {
        &self.numbers
    }

    pub fn nouns(&self) -> &[NounMention] {
        &self.nouns
    }

    pub fn gold_solutions(&self) -> &[f64] {
        &self.example.solutions
    }

    pub fn words(&self) -> Vec<String> {
        self.document.words()
    }

    /// Generalize this problem's gold equations into a template
    pub fn extract_template(&self) -> TemplateResult<Template> {
        let equations = self.example.parse_equations()?;
        let numbers: Vec<Rational> = self
            .numbers
            .iter()
            .filter_map(|mention| {
                let exact = mention.exact();
                if exact.is_none() {
                    warn!(
                        problem = self.index(),
                        value = mention.value,
                        "number has no exact form, skipping"
                    );
                }
                exact
            })
            .collect();

        Ok(Template::generalize(&equations, &numbers))
    }
}
