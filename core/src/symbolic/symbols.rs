//! Symbols and slot identifiers
//!
//! Generalized templates replace the variables and literals of a labeled
//! equation system with anonymous slots. A [`Symbol`] is either one of those
//! slots or a raw variable name taken from the original equations.
//!
//! Symbols print as `u_<base>_<occurrence>` (occurrence-indexed unknown),
//! `u_<base>` (unified unknown), `n_<index>` (number slot) or their raw name,
//! and parse back from the same text.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A symbol appearing in an equation
///
/// The derived ordering is lexicographic over the variant and its indices,
/// so `n_2 < n_10` and every unknown orders before every number slot. Slot
/// filling uses [`Symbol::cmp_by_name`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// Unknown quantity slot; `occurrence` is `None` once unified
    Unknown { base: u32, occurrence: Option<u32> },

    /// Number slot standing for a literal found in the problem text
    Number(u32),

    /// Raw variable from a labeled equation
    Named(String),
}

/// Kind of a slot in a generalized template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotKind {
    Number,
    Unknown,
}

/// Symbol renaming used by substitution and template comparison
pub type SymbolMap = BTreeMap<Symbol, Symbol>;

impl Symbol {
    /// Occurrence-indexed unknown slot `u_<base>_<occurrence>`
    pub fn unknown(base: u32, occurrence: u32) -> Self {
        Symbol::Unknown {
            base,
            occurrence: Some(occurrence),
        }
    }

    /// Unified unknown `u_<base>`
    pub fn unified_unknown(base: u32) -> Self {
        Symbol::Unknown {
            base,
            occurrence: None,
        }
    }

    /// Number slot `n_<index>`
    pub fn number(index: u32) -> Self {
        Symbol::Number(index)
    }

    /// Raw variable
    pub fn named(name: impl Into<String>) -> Self {
        Symbol::Named(name.into())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Symbol::Unknown { .. })
    }

    pub fn is_number_slot(&self) -> bool {
        matches!(self, Symbol::Number(_))
    }

    /// Slot kind, or `None` for raw variables
    pub fn slot_kind(&self) -> Option<SlotKind> {
        match self {
            Symbol::Unknown { .. } => Some(SlotKind::Unknown),
            Symbol::Number(_) => Some(SlotKind::Number),
            Symbol::Named(_) => None,
        }
    }

    /// Order of the printed names, so `n_10 < n_2`
    pub fn cmp_by_name(&self, other: &Symbol) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }

    /// Drop the occurrence index of an unknown; other symbols are unchanged
    pub fn unified(&self) -> Symbol {
        match self {
            Symbol::Unknown { base, .. } => Symbol::unified_unknown(*base),
            other => other.clone(),
        }
    }

    /// Classify a symbol name
    pub fn from_name(name: &str) -> Symbol {
        let mut parts = name.split('_');
        let head = parts.next();
        let indices: Option<Vec<u32>> = parts.map(|p| p.parse().ok()).collect();

        match (head, indices.as_deref()) {
            (Some("u"), Some([base])) => Symbol::unified_unknown(*base),
            (Some("u"), Some([base, occurrence])) => Symbol::unknown(*base, *occurrence),
            (Some("n"), Some([index])) => Symbol::number(*index),
            _ => Symbol::named(name),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Unknown {
                base,
                occurrence: Some(occurrence),
            } => write!(f, "u_{}_{}", base, occurrence),
            Symbol::Unknown {
                base,
                occurrence: None,
            } => write!(f, "u_{}", base),
            Symbol::Number(index) => write!(f, "n_{}", index),
            Symbol::Named(name) => f.write_str(name),
        }
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Symbol::from_name(s))
    }
}

// Symbols serialize as their printed name so they can key JSON objects
impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Symbol::from_name(&name))
    }
}
