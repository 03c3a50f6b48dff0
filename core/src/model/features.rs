//! Sparse features of a derivation
//!
//! Features pair what the text says with how the derivation used it: which
//! template was chosen, the words of the problem under that template, the
//! noun lemma chosen for each unknown slot, whether each number slot got an
//! integer, and whether two number slots were filled from the same sentence.

use crate::problem::WordProblem;
use crate::search::Derivation;
use crate::template::{SlotPairSignature, SlotSignature, Template};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Feature identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureKey {
    /// The derivation uses this template
    Template(usize),

    /// A word of the problem, conjoined with the template
    TemplateWord { template_index: usize, word: String },

    /// Lemma of the noun filling an unknown slot
    UnknownLemma { slot: SlotSignature, lemma: String },

    /// The number filling this slot is an integer
    IntegerNumber(SlotSignature),

    /// Both number slots were filled from the same sentence
    SameSentence(SlotPairSignature),
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKey::Template(index) => write!(f, "template[{}]", index),
            FeatureKey::TemplateWord {
                template_index,
                word,
            } => write!(f, "template[{}]&word[{}]", template_index, word),
            FeatureKey::UnknownLemma { slot, lemma } => write!(f, "{}&lemma[{}]", slot, lemma),
            FeatureKey::IntegerNumber(slot) => write!(f, "{}&integer", slot),
            FeatureKey::SameSentence(pair) => write!(f, "{}&same_sentence", pair),
        }
    }
}

/// Sparse feature vector
pub type FeatureVector = FxHashMap<FeatureKey, f64>;

/// Extracts features against a fixed vocabulary
///
/// Words and lemmas never seen in the training problems produce no features.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    unigrams: BTreeSet<String>,
    lemmas: BTreeSet<String>,
    template_count: usize,
}

impl FeatureExtractor {
    pub fn new(templates: &[Template], problems: &[WordProblem]) -> Self {
        let unigrams = problems.iter().flat_map(WordProblem::words).collect();
        let lemmas = problems
            .iter()
            .flat_map(|p| p.nouns().iter().map(|noun| noun.lemma.to_lowercase()))
            .collect();

        Self {
            unigrams,
            lemmas,
            template_count: templates.len(),
        }
    }

    pub fn extract(&self, derivation: &Derivation<'_>) -> FeatureVector {
        let mut features = FeatureVector::default();
        let template_index = derivation.template_index();
        let template = derivation.template();
        let problem = derivation.problem();

        if template_index < self.template_count {
            features.insert(FeatureKey::Template(template_index), 1.0);
        }

        for word in problem.words() {
            if self.unigrams.contains(&word) {
                features.insert(FeatureKey::TemplateWord { template_index, word }, 1.0);
            }
        }

        for (slot, noun) in derivation.filled_unknowns() {
            let lemma = noun.lemma.to_lowercase();
            if !self.lemmas.contains(&lemma) {
                continue;
            }
            if let Some(signature) = template.slot_signature(template_index, slot) {
                features.insert(FeatureKey::UnknownLemma { slot: signature, lemma }, 1.0);
            }
        }

        let numbers: Vec<_> = derivation
            .filled_numbers()
            .filter_map(|(slot, number)| Some((template.slot_signature(template_index, slot)?, number)))
            .collect();

        for (signature, number) in &numbers {
            if number.is_integer() {
                features.insert(FeatureKey::IntegerNumber(signature.clone()), 1.0);
            }
        }

        for (i, (first, a)) in numbers.iter().enumerate() {
            for (second, b) in &numbers[i + 1..] {
                if a.location.sentence == b.location.sentence {
                    let pair = SlotPairSignature::new(first.clone(), second.clone());
                    features.insert(FeatureKey::SameSentence(pair), 1.0);
                }
            }
        }

        features
    }
}
