//! Template equality up to slot renaming
//!
//! Two solved templates are the same template when some bijection of their
//! unknowns together with some bijection of their number slots makes every
//! solution of one identical (as a canonical rational function) to the renamed
//! solution of the other.

use super::generalized::Template;
use crate::symbolic::{RationalFunction, Solution, Symbol, SymbolMap};
use std::collections::BTreeMap;

/// Orderings of `items`, produced one at a time by Heap's algorithm
struct Permutations<T> {
    items: Vec<T>,
    counters: Vec<usize>,
    index: usize,
    started: bool,
}

impl<T: Clone> Permutations<T> {
    fn new(items: &[T]) -> Self {
        Permutations {
            items: items.to_vec(),
            counters: vec![0; items.len()],
            index: 1,
            started: false,
        }
    }
}

impl<T: Clone> Iterator for Permutations<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if !self.started {
            self.started = true;
            return Some(self.items.clone());
        }
        while self.index < self.items.len() {
            let i = self.index;
            if self.counters[i] < i {
                let j = if i % 2 == 0 { 0 } else { self.counters[i] };
                self.items.swap(j, i);
                self.counters[i] += 1;
                self.index = 1;
                return Some(self.items.clone());
            }
            self.counters[i] = 0;
            self.index += 1;
        }
        None
    }
}

/// Bijections from `from` onto `to`; none when the sizes differ
fn bijections<'a>(from: &'a [Symbol], to: &[Symbol]) -> impl Iterator<Item = SymbolMap> + 'a {
    (from.len() == to.len())
        .then(|| Permutations::new(to))
        .into_iter()
        .flatten()
        .map(move |image| from.iter().cloned().zip(image).collect())
}

fn rename_solution(solution: &Solution, map: &SymbolMap) -> Option<BTreeMap<Symbol, RationalFunction>> {
    solution
        .iter()
        .map(|(unknown, value)| Some((unknown.clone(), value.rename(map).ok()?)))
        .collect()
}

impl Template {
    /// Whether `self` and `other` are the same template up to slot renaming
    pub fn is_equivalent(&self, other: &Template) -> bool {
        let (ours, theirs) = match (self.solution(), other.solution()) {
            (Some(ours), Some(theirs)) => (ours, theirs),
            (None, None) => return self.equations() == other.equations(),
            _ => return false,
        };

        let our_unknowns: Vec<Symbol> = ours.keys().cloned().collect();
        let their_unknowns: Vec<Symbol> = theirs.keys().cloned().collect();
        let our_numbers: Vec<Symbol> = self.number_slots().into_iter().collect();
        let their_numbers: Vec<Symbol> = other.number_slots().into_iter().collect();

        if our_unknowns.len() != their_unknowns.len() || our_numbers.len() != their_numbers.len() {
            return false;
        }

        for number_map in bijections(&their_numbers, &our_numbers) {
            let Some(renamed) = rename_solution(theirs, &number_map) else {
                continue;
            };
            let matched = bijections(&our_unknowns, &their_unknowns).any(|unknown_map| {
                unknown_map
                    .iter()
                    .all(|(our_unknown, their_unknown)| ours[our_unknown] == renamed[their_unknown])
            });
            if matched {
                return true;
            }
        }

        false
    }
}

impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.is_equivalent(other)
    }
}
