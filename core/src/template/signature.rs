//! Slot signatures used as feature keys

use crate::symbolic::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one slot of one equation of one template
///
/// Ordered lexicographically by `(template_index, equation_index, symbol)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotSignature {
    pub template_index: usize,
    pub equation_index: usize,
    pub symbol: Symbol,
}

impl SlotSignature {
    pub fn new(template_index: usize, equation_index: usize, symbol: Symbol) -> Self {
        Self {
            template_index,
            equation_index,
            symbol,
        }
    }
}

impl fmt::Display for SlotSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}:e{}:{}", self.template_index, self.equation_index, self.symbol)
    }
}

/// Unordered pair of slot signatures, stored smaller first
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotPairSignature {
    first: SlotSignature,
    second: SlotSignature,
}

impl SlotPairSignature {
    pub fn new(a: SlotSignature, b: SlotSignature) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn first(&self) -> &SlotSignature {
        &self.first
    }

    pub fn second(&self) -> &SlotSignature {
        &self.second
    }
}

impl fmt::Display for SlotPairSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}
