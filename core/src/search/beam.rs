//! Beam search over partial derivations
//!
//! Each round replaces every incomplete derivation by its children, drops
//! invalid candidates, ranks the rest by score and keeps a template-balanced
//! beam: at most `max_per_template` per template, drawn round-robin across
//! templates until `max_total` derivations are kept.

use super::derivation::Derivation;
use super::scoring::sort_best_first;
use crate::problem::WordProblem;
use crate::template::Template;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// Beam search configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamConfig {
    /// Maximum derivations kept per round
    pub max_total: usize,

    /// Maximum derivations kept per template per round
    pub max_per_template: usize,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            max_total: 200,
            max_per_template: 20,
        }
    }
}

/// Final beam of a search
#[derive(Debug, Clone)]
pub struct SearchOutcome<'a> {
    /// Surviving derivations, all complete
    pub derivations: Vec<Derivation<'a>>,

    /// Number of expansion rounds performed
    pub rounds: usize,
}

/// Template-balanced beam search
#[derive(Debug, Clone, Default)]
pub struct BeamSearch {
    config: BeamConfig,
}

impl BeamSearch {
    pub fn new(config: BeamConfig) -> Self {
        Self { config }
    }

    /// One empty derivation per template
    pub fn initial_beam<'a>(problem: &'a WordProblem, templates: &'a [Template]) -> Vec<Derivation<'a>> {
        templates
            .iter()
            .enumerate()
            .map(|(index, template)| Derivation::new(template, index, problem))
            .collect()
    }

    /// Search `problem` against `templates` and hand the final beam to `evaluate`
    pub fn search<'a, S, V, E, R>(
        &self,
        problem: &'a WordProblem,
        templates: &'a [Template],
        score: S,
        validate: V,
        evaluate: E,
    ) -> R
    where
        S: Fn(&Derivation<'a>) -> f64,
        V: Fn(&Derivation<'a>) -> bool,
        E: FnOnce(Vec<Derivation<'a>>) -> R,
    {
        let beam = Self::initial_beam(problem, templates);
        let outcome = self.search_to_completion(beam, score, validate);
        debug!(
            problem = problem.index(),
            rounds = outcome.rounds,
            complete = outcome.derivations.len(),
            "search finished"
        );
        evaluate(outcome.derivations)
    }

    /// Expand `beam` until every surviving derivation is complete
    ///
    /// Invalid derivations are dropped before the completion check, so the
    /// outcome holds only valid, complete derivations (possibly none).
    pub fn search_to_completion<'a, S, V>(
        &self,
        mut beam: Vec<Derivation<'a>>,
        score: S,
        validate: V,
    ) -> SearchOutcome<'a>
    where
        S: Fn(&Derivation<'a>) -> f64,
        V: Fn(&Derivation<'a>) -> bool,
    {
        let mut rounds = 0;

        loop {
            beam.retain(|derivation| validate(derivation));
            if beam.iter().all(Derivation::is_complete) {
                return SearchOutcome {
                    derivations: beam,
                    rounds,
                };
            }
            rounds += 1;
            beam = self.expand_round(beam, &score, &validate);
            debug!(round = rounds, kept = beam.len(), "beam round");
        }
    }

    /// Replace every incomplete derivation by its valid children and keep the best
    pub(crate) fn expand_round<'a, S, V>(
        &self,
        beam: Vec<Derivation<'a>>,
        score: &S,
        validate: &V,
    ) -> Vec<Derivation<'a>>
    where
        S: Fn(&Derivation<'a>) -> f64,
        V: Fn(&Derivation<'a>) -> bool,
    {
        let mut scored: Vec<(f64, Derivation<'a>)> = Vec::new();
        for derivation in beam {
            let children = if derivation.is_complete() {
                vec![derivation]
            } else {
                derivation.all_ways_to_fill_next_slot()
            };
            for child in children {
                if validate(&child) {
                    scored.push((score(&child), child));
                }
            }
        }

        debug!(candidates = scored.len(), "scored children");
        self.select(scored)
    }

    /// Keep the best candidates, balanced across templates
    fn select<'a>(&self, mut scored: Vec<(f64, Derivation<'a>)>) -> Vec<Derivation<'a>> {
        sort_best_first(&mut scored);

        let mut by_template: BTreeMap<usize, VecDeque<Derivation<'a>>> = BTreeMap::new();
        for (_, derivation) in scored {
            let bucket = by_template.entry(derivation.template_index()).or_default();
            if bucket.len() < self.config.max_per_template {
                bucket.push_back(derivation);
            }
        }

        let available: usize = by_template.values().map(VecDeque::len).sum();
        let limit = available.min(self.config.max_total);

        let mut selected = Vec::with_capacity(limit);
        while selected.len() < limit {
            for bucket in by_template.values_mut() {
                if selected.len() == limit {
                    break;
                }
                if let Some(derivation) = bucket.pop_front() {
                    selected.push(derivation);
                }
            }
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Document, LabeledExample, Location, NounMention, NumberMention};
    use crate::symbolic::{Equation, Rational};
    use proptest::prelude::*;

    fn problem(numbers: &[f64], nouns: &[&str]) -> WordProblem {
        let example = LabeledExample {
            index: 0,
            question: String::new(),
            equations: vec![],
            solutions: vec![],
        };
        let numbers = numbers
            .iter()
            .enumerate()
            .map(|(i, v)| NumberMention::new(*v, Location::new(0, i)))
            .collect();
        let nouns = nouns
            .iter()
            .enumerate()
            .map(|(i, w)| NounMention::new(*w, *w, Location::new(1, i)))
            .collect();
        WordProblem::with_candidates(example, Document::default(), numbers, nouns)
    }

    fn template(line: &str, numbers: &[i128]) -> Template {
        let numbers: Vec<Rational> = numbers.iter().map(|n| Rational::integer(*n)).collect();
        Template::generalize(&[Equation::parse(line).unwrap()], &numbers)
    }

    fn accept_all(_: &Derivation) -> bool {
        true
    }

    fn flat(_: &Derivation) -> f64 {
        0.0
    }

    #[test]
    fn test_default_config() {
        let config = BeamConfig::default();
        assert_eq!(config.max_total, 200);
        assert_eq!(config.max_per_template, 20);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: BeamConfig = serde_json::from_str(r#"{"max_total": 50}"#).unwrap();
        assert_eq!(config, BeamConfig { max_total: 50, max_per_template: 20 });
    }

    #[test]
    fn test_two_number_permutations() {
        let templates = vec![template("x + 3 = 5", &[3, 5])];
        let problem = problem(&[3.0, 5.0], &["apples"]);
        let search = BeamSearch::default();

        let outcome = search.search_to_completion(
            BeamSearch::initial_beam(&problem, &templates),
            flat,
            accept_all,
        );
        assert_eq!(outcome.derivations.len(), 2);
        assert_eq!(outcome.rounds, 3);
        assert!(outcome.derivations.iter().all(Derivation::is_complete));
    }

    #[test]
    fn test_template_with_too_many_slots_contributes_nothing() {
        let templates = vec![
            template("x = 1 + 2 + 4", &[1, 2, 4]),
            template("x + 3 = 5", &[3, 5]),
        ];
        let problem = problem(&[3.0, 5.0], &["apples"]);
        let search = BeamSearch::default();

        let found = search.search(&problem, &templates, flat, accept_all, |derivations| {
            derivations.iter().map(Derivation::template_index).collect::<Vec<_>>()
        });
        assert_eq!(found, vec![1, 1]);
    }

    #[test]
    fn test_invalid_template_is_silently_dropped() {
        let templates = vec![template("x + 3 = 5", &[3, 5]), template("x*3 = 5", &[3, 5])];
        let problem = problem(&[3.0, 5.0], &["apples"]);
        let search = BeamSearch::default();

        let outcome = search.search_to_completion(
            BeamSearch::initial_beam(&problem, &templates),
            flat,
            |d: &Derivation| d.template_index() == 1,
        );
        assert_eq!(outcome.derivations.len(), 2);
        assert!(outcome.derivations.iter().all(|d| d.template_index() == 1));
    }

    #[test]
    fn test_per_template_quota() {
        let templates = vec![template("x = 1 + 2", &[1, 2])];
        let problem = problem(&[1.0, 2.0, 3.0, 4.0], &["a"]);
        let search = BeamSearch::new(BeamConfig {
            max_total: 100,
            max_per_template: 3,
        });

        let outcome = search.search_to_completion(
            BeamSearch::initial_beam(&problem, &templates),
            flat,
            accept_all,
        );
        assert_eq!(outcome.derivations.len(), 3);
    }

    #[test]
    fn test_round_robin_balances_templates() {
        let templates = vec![template("x = 1 + 2", &[1, 2]), template("x = 1 - 2", &[1, 2])];
        let problem = problem(&[1.0, 2.0, 3.0, 4.0], &["a"]);
        let search = BeamSearch::new(BeamConfig {
            max_total: 5,
            max_per_template: 20,
        });

        // Template 0 always scores higher, yet template 1 keeps a share
        let outcome = search.search_to_completion(
            BeamSearch::initial_beam(&problem, &templates),
            |d: &Derivation| if d.template_index() == 0 { 10.0 } else { 0.0 },
            accept_all,
        );
        let first = outcome.derivations.iter().filter(|d| d.template_index() == 0).count();
        assert_eq!(outcome.derivations.len(), 5);
        assert_eq!(first, 3);
        assert_eq!(outcome.derivations[0].template_index(), 0);
        assert_eq!(outcome.derivations[1].template_index(), 1);
    }

    #[test]
    fn test_highest_scores_survive() {
        let templates = vec![template("x = 1 + 2", &[1, 2])];
        let problem = problem(&[1.0, 2.0, 3.0], &["a"]);
        let search = BeamSearch::new(BeamConfig {
            max_total: 1,
            max_per_template: 1,
        });

        // Prefer the derivation whose first number slot holds the largest value
        let score = |d: &Derivation| {
            d.number_for(&crate::symbolic::Symbol::number(0))
                .map(|n| n.value)
                .unwrap_or(0.0)
        };
        let outcome = search.search_to_completion(
            BeamSearch::initial_beam(&problem, &templates),
            score,
            accept_all,
        );
        assert_eq!(outcome.derivations.len(), 1);
        let best = &outcome.derivations[0];
        assert_eq!(best.number_for(&crate::symbolic::Symbol::number(0)).unwrap().value, 3.0);
    }

    #[test]
    fn test_no_templates() {
        let problem = problem(&[1.0], &["a"]);
        let search = BeamSearch::default();
        let outcome = search.search_to_completion(BeamSearch::initial_beam(&problem, &[]), flat, accept_all);
        assert!(outcome.derivations.is_empty());
        assert_eq!(outcome.rounds, 0);
    }

    proptest! {
        #[test]
        fn every_round_respects_quotas(
            max_total in 1usize..12,
            max_per_template in 1usize..5,
            weights in prop::collection::vec(-5.0f64..5.0, 6),
        ) {
            let templates = vec![
                template("x = 1 + 2", &[1, 2]),
                template("x - 1 = 2", &[1, 2]),
                template("x = 1 * 2", &[1, 2]),
                template("x = 1 + 2 + 3", &[1, 2, 3]),
                template("x * 1 = 2 + y", &[1, 2]),
                template("x = 1", &[1]),
            ];
            let problem = problem(&[1.0, 2.0, 3.0, 4.0], &["a", "b"]);
            let search = BeamSearch::new(BeamConfig { max_total, max_per_template });
            let score = |d: &Derivation| weights[d.template_index()];

            let mut beam = BeamSearch::initial_beam(&problem, &templates);
            let mut rounds = 0;
            while !beam.iter().all(Derivation::is_complete) {
                beam = search.expand_round(beam, &score, &accept_all);
                rounds += 1;

                prop_assert!(beam.len() <= max_total);
                for index in 0..templates.len() {
                    let kept = beam.iter().filter(|d| d.template_index() == index).count();
                    prop_assert!(kept <= max_per_template);
                }
                // Every template still alive keeps at least one derivation
                if beam.len() < max_total {
                    prop_assert!(beam.len() >= templates.len().min(max_total));
                }
            }
            // Longest templates have four slots
            prop_assert!(rounds <= 4);
        }
    }
}
