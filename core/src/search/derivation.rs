//! Partial derivations: slot assignments of one template against one problem
//!
//! Number slots are filled before unknown slots, smallest slot first. A
//! number is used at most once per derivation; a noun may fill any number
//! of unknown slots. Children are built by copying the persistent maps and
//! filling one slot, so siblings share structure but never state.

use crate::problem::{NounMention, NumberMention, WordProblem};
use crate::symbolic::{SlotKind, Symbol};
use crate::template::Template;
use im::{OrdMap, Vector};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Slot assignment: index into the problem's candidate list, or unfilled
type Assignment = OrdMap<Symbol, Option<usize>>;

/// Candidate grounding of a template against a word problem
#[derive(Debug, Clone)]
pub struct Derivation<'a> {
    template: &'a Template,
    template_index: usize,
    problem: &'a WordProblem,
    unknown_map: Assignment,
    number_map: Assignment,
    remaining_numbers: Vector<usize>,
}

impl<'a> Derivation<'a> {
    /// Empty derivation with every slot unfilled
    pub fn new(template: &'a Template, template_index: usize, problem: &'a WordProblem) -> Self {
        let unfilled = |slots: BTreeSet<Symbol>| -> Assignment {
            slots.into_iter().map(|slot| (slot, None)).collect()
        };

        Self {
            template,
            template_index,
            problem,
            unknown_map: unfilled(template.unknown_slots()),
            number_map: unfilled(template.number_slots()),
            remaining_numbers: (0..problem.numbers().len()).collect(),
        }
    }

    pub fn template(&self) -> &'a Template {
        self.template
    }

    pub fn template_index(&self) -> usize {
        self.template_index
    }

    pub fn problem(&self) -> &'a WordProblem {
        self.problem
    }

    pub fn is_complete(&self) -> bool {
        self.next_slot().is_none()
    }

    /// Slot the next expansion fills: the unfilled slot whose name sorts first
    pub fn next_slot(&self) -> Option<(SlotKind, &Symbol)> {
        fn first_unfilled(map: &Assignment) -> Option<&Symbol> {
            map.iter()
                .filter(|(_, filled)| filled.is_none())
                .map(|(slot, _)| slot)
                .min_by(|a, b| a.cmp_by_name(b))
        }

        if let Some(slot) = first_unfilled(&self.number_map) {
            return Some((SlotKind::Number, slot));
        }
        first_unfilled(&self.unknown_map).map(|slot| (SlotKind::Unknown, slot))
    }

    /// Every child obtained by filling the next slot
    ///
    /// Empty for a complete derivation, and for one whose next number slot has
    /// no numbers left to take.
    pub fn all_ways_to_fill_next_slot(&self) -> Vec<Derivation<'a>> {
        let Some((kind, slot)) = self.next_slot() else {
            return Vec::new();
        };
        let slot = slot.clone();

        match kind {
            SlotKind::Number => self
                .remaining_numbers
                .iter()
                .enumerate()
                .map(|(position, &number)| {
                    let mut child = self.clone();
                    child.number_map.insert(slot.clone(), Some(number));
                    child.remaining_numbers.remove(position);
                    child
                })
                .collect(),
            SlotKind::Unknown => (0..self.problem.nouns().len())
                .map(|noun| {
                    let mut child = self.clone();
                    child.unknown_map.insert(slot.clone(), Some(noun));
                    child
                })
                .collect(),
        }
    }

    /// Number chosen for a number slot
    pub fn number_for(&self, slot: &Symbol) -> Option<&'a NumberMention> {
        let index = (*self.number_map.get(slot)?)?;
        self.problem.numbers().get(index)
    }

    /// Noun chosen for an unknown slot
    pub fn noun_for(&self, slot: &Symbol) -> Option<&'a NounMention> {
        let index = (*self.unknown_map.get(slot)?)?;
        self.problem.nouns().get(index)
    }

    /// Filled number slots with their numbers, in slot order
    pub fn filled_numbers(&self) -> impl Iterator<Item = (&Symbol, &'a NumberMention)> + '_ {
        self.number_map
            .keys()
            .filter_map(move |slot| Some((slot, self.number_for(slot)?)))
    }

    /// Filled unknown slots with their nouns, in slot order
    pub fn filled_unknowns(&self) -> impl Iterator<Item = (&Symbol, &'a NounMention)> + '_ {
        self.unknown_map
            .keys()
            .filter_map(move |slot| Some((slot, self.noun_for(slot)?)))
    }

    /// Indices of the problem's numbers not used yet
    pub fn remaining_numbers(&self) -> &Vector<usize> {
        &self.remaining_numbers
    }

    /// Values of the template's unknowns under this derivation's numbers
    ///
    /// One entry per unknown, in unknown order; an entry is `None` when the
    /// template has no solution, a needed slot is unfilled or the value is not
    /// finite.
    pub fn solve(&self) -> Vec<Option<f64>> {
        let unknowns = self.template.unknowns();
        let Some(solution) = self.template.solution() else {
            return vec![None; unknowns.len()];
        };

        let values: BTreeMap<Symbol, f64> = self
            .filled_numbers()
            .map(|(slot, number)| (slot.clone(), number.value))
            .collect();

        unknowns
            .iter()
            .map(|unknown| solution.get(unknown)?.evaluate(&values))
            .collect()
    }

    pub fn summary(&self) -> DerivationSummary {
        DerivationSummary {
            template_index: self.template_index,
            numbers: self
                .filled_numbers()
                .map(|(slot, number)| (slot.clone(), number.clone()))
                .collect(),
            unknowns: self
                .filled_unknowns()
                .map(|(slot, noun)| (slot.clone(), noun.clone()))
                .collect(),
            solutions: self.solve(),
        }
    }
}

/// Serializable view of a derivation
#[derive(Debug, Clone, Serialize)]
pub struct DerivationSummary {
    pub template_index: usize,
    pub numbers: BTreeMap<Symbol, NumberMention>,
    pub unknowns: BTreeMap<Symbol, NounMention>,
    pub solutions: Vec<Option<f64>>,
}
