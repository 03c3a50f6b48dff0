//! Exact linear solving over rational functions
//!
//! Each equation is read as `expr = 0` and split into coefficients of the
//! requested unknowns. Coefficients may mention any other symbol (number
//! slots), so the elimination runs over [`RationalFunction`] entries.

use super::error::SymbolicResult;
use super::poly::RationalFunction;
use super::symbols::Symbol;
use std::collections::{BTreeMap, BTreeSet};

/// Solution map from unknown to closed form
pub type Solution = BTreeMap<Symbol, RationalFunction>;

/// Solve `equations` (each meaning `expr = 0`) for `unknowns`
///
/// Returns `Ok(None)` when the system has no unique solution, either because
/// it is inconsistent or because an unknown is left free. Fails with
/// [`SymbolicError::NonLinear`](super::SymbolicError::NonLinear) when an
/// unknown appears with degree above one.
pub fn solve_linear(
    equations: &[RationalFunction],
    unknowns: &[Symbol],
) -> SymbolicResult<Option<Solution>> {
    let unknown_set: BTreeSet<Symbol> = unknowns.iter().cloned().collect();
    let width = unknowns.len();

    // Augmented matrix [A | b] for A·x = b
    let mut rows: Vec<Vec<RationalFunction>> = Vec::with_capacity(equations.len());
    for equation in equations {
        let (coefficients, rest) = equation.numerator().split_linear(&unknown_set)?;
        let mut row: Vec<RationalFunction> = unknowns
            .iter()
            .map(|u| {
                coefficients
                    .get(u)
                    .cloned()
                    .map(RationalFunction::from_poly)
                    .unwrap_or_else(RationalFunction::zero)
            })
            .collect();
        row.push(RationalFunction::from_poly(rest.neg()?));
        rows.push(row);
    }

    let mut rank = 0;
    let mut pivots = Vec::with_capacity(width);
    for column in 0..width {
        let Some(found) = (rank..rows.len()).find(|&r| !rows[r][column].is_zero()) else {
            continue;
        };
        rows.swap(rank, found);

        let pivot = rows[rank][column].clone();
        rows[rank] = rows[rank]
            .iter()
            .map(|entry| entry.div(&pivot))
            .collect::<SymbolicResult<_>>()?;

        for r in 0..rows.len() {
            if r == rank || rows[r][column].is_zero() {
                continue;
            }
            let factor = rows[r][column].clone();
            let reduced = rows[r]
                .iter()
                .zip(&rows[rank])
                .map(|(entry, pivot_entry)| entry.sub(&factor.mul(pivot_entry)?))
                .collect::<SymbolicResult<Vec<_>>>()?;
            rows[r] = reduced;
        }

        pivots.push(column);
        rank += 1;
    }

    if rank < width {
        return Ok(None);
    }
    if rows[rank..].iter().any(|row| !row[width].is_zero()) {
        return Ok(None);
    }

    let solution = pivots
        .iter()
        .zip(&rows)
        .map(|(&column, row)| (unknowns[column].clone(), row[width].clone()))
        .collect();
    Ok(Some(solution))
}
