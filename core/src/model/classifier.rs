//! Log-linear derivation scorer
//!
//! score(d) = w · f(d); the unnormalized probability of a derivation is
//! `exp(score)`. Weights are supplied by the caller.

use super::features::{FeatureExtractor, FeatureKey};
use crate::problem::WordProblem;
use crate::search::{best_first, BeamSearch, Derivation};
use crate::template::Template;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::debug;

/// Best complete derivation found for a problem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub template_index: usize,
    pub solutions: Vec<f64>,
    pub score: f64,
}

/// Linear model over sparse derivation features
#[derive(Debug, Clone)]
pub struct Classifier {
    extractor: FeatureExtractor,
    weights: FxHashMap<FeatureKey, f64>,
}

impl Classifier {
    pub fn new(extractor: FeatureExtractor, weights: FxHashMap<FeatureKey, f64>) -> Self {
        Self { extractor, weights }
    }

    /// Weight of a feature; unseen features weigh zero
    pub fn weight(&self, key: &FeatureKey) -> f64 {
        self.weights.get(key).copied().unwrap_or(0.0)
    }

    pub fn set_weight(&mut self, key: FeatureKey, weight: f64) {
        self.weights.insert(key, weight);
    }

    pub fn score(&self, derivation: &Derivation<'_>) -> f64 {
        self.extractor
            .extract(derivation)
            .iter()
            .map(|(key, value)| self.weight(key) * value)
            .sum()
    }

    /// Unnormalized probability `exp(score)`
    pub fn probability_of_derivation(&self, derivation: &Derivation<'_>) -> f64 {
        self.score(derivation).exp()
    }

    /// Search the templates and return the best derivation with finite solutions
    pub fn predict<'a>(
        &self,
        search: &BeamSearch,
        problem: &'a WordProblem,
        templates: &'a [Template],
    ) -> Option<Prediction> {
        search.search(
            problem,
            templates,
            |d| self.score(d),
            |_| true,
            |derivations| {
                let mut candidates: Vec<Prediction> = derivations
                    .iter()
                    .filter_map(|d| {
                        let solutions = d.solve().into_iter().collect::<Option<Vec<f64>>>()?;
                        Some(Prediction {
                            template_index: d.template_index(),
                            solutions,
                            score: self.score(d),
                        })
                    })
                    .collect();
                debug!(problem = problem.index(), candidates = candidates.len(), "ranking predictions");
                candidates.sort_by(|a, b| best_first(a.score, b.score));
                candidates.into_iter().next()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Document, LabeledExample, Location, NounMention, NumberMention};
    use crate::search::BeamConfig;
    use crate::symbolic::{Equation, Rational, Symbol};
    use crate::template::SlotSignature;

    fn problem() -> WordProblem {
        let example = LabeledExample {
            index: 3,
            question: String::new(),
            equations: vec![],
            solutions: vec![],
        };
        let numbers = vec![
            NumberMention::new(3.0, Location::new(0, 0)),
            NumberMention::new(5.0, Location::new(0, 1)),
        ];
        let nouns = vec![NounMention::new("apples", "apple", Location::new(0, 2))];
        WordProblem::with_candidates(example, Document::default(), numbers, nouns)
    }

    fn templates() -> Vec<Template> {
        let numbers = [Rational::integer(3), Rational::integer(5)];
        vec![
            Template::generalize(&[Equation::parse("x + 3 = 5").unwrap()], &numbers),
            Template::generalize(&[Equation::parse("x*3 = 5").unwrap()], &numbers),
        ]
    }

    #[test]
    fn test_zero_weights_score_zero() {
        let templates = templates();
        let problems = vec![problem()];
        let classifier = Classifier::new(FeatureExtractor::new(&templates, &problems), FxHashMap::default());
        let d = Derivation::new(&templates[0], 0, &problems[0]);
        assert_eq!(classifier.score(&d), 0.0);
        assert_eq!(classifier.probability_of_derivation(&d), 1.0);
    }

    #[test]
    fn test_predict_follows_weights() {
        let templates = templates();
        let problems = vec![problem()];
        let mut classifier = Classifier::new(FeatureExtractor::new(&templates, &problems), FxHashMap::default());
        classifier.set_weight(FeatureKey::Template(1), 2.0);

        let n0 = SlotSignature::new(1, 0, Symbol::number(0));
        classifier.set_weight(FeatureKey::IntegerNumber(n0), 0.5);

        let search = BeamSearch::new(BeamConfig::default());
        let prediction = classifier.predict(&search, &problems[0], &templates).unwrap();
        assert_eq!(prediction.template_index, 1);
        assert_eq!(prediction.score, 2.5);
    }

    #[test]
    fn test_predict_without_templates() {
        let problems = vec![problem()];
        let classifier = Classifier::new(FeatureExtractor::default(), FxHashMap::default());
        let search = BeamSearch::default();
        assert!(classifier.predict(&search, &problems[0], &[]).is_none());
    }
}
