//! Canonical polynomial and rational-function forms
//!
//! A [`Poly`] is a sparse map from [`Monomial`] to non-zero rational
//! coefficient, so two polynomials are equal exactly when their maps are.
//! A [`RationalFunction`] is a numerator/denominator pair kept in a normalized
//! shape (shared monomial factors cancelled, constant denominators folded into
//! the numerator, otherwise a denominator with leading coefficient one).
//! Equality of rational functions is decided by cross-multiplication, which
//! needs no polynomial gcd.

use super::error::{SymbolicError, SymbolicResult};
use super::rational::Rational;
use super::symbols::{Symbol, SymbolMap};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

fn checked<T>(value: Option<T>) -> SymbolicResult<T> {
    value.ok_or(SymbolicError::Overflow)
}

/// Product of symbols raised to positive powers
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Monomial(BTreeMap<Symbol, u32>);

impl Monomial {
    pub fn one() -> Self {
        Self::default()
    }

    pub fn of(symbol: Symbol) -> Self {
        let mut powers = BTreeMap::new();
        powers.insert(symbol, 1);
        Monomial(powers)
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn degree(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn exponent(&self, symbol: &Symbol) -> u32 {
        self.0.get(symbol).copied().unwrap_or(0)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.0.keys()
    }

    fn mul(&self, other: &Monomial) -> Monomial {
        let mut powers = self.0.clone();
        for (symbol, exponent) in &other.0 {
            *powers.entry(symbol.clone()).or_insert(0) += exponent;
        }
        Monomial(powers)
    }

    /// Exact quotient, if `divisor` divides `self`
    fn divide(&self, divisor: &Monomial) -> Option<Monomial> {
        let mut powers = self.0.clone();
        for (symbol, exponent) in &divisor.0 {
            let current = powers.get_mut(symbol)?;
            *current = current.checked_sub(*exponent)?;
            if *current == 0 {
                powers.remove(symbol);
            }
        }
        Some(Monomial(powers))
    }

    fn gcd(&self, other: &Monomial) -> Monomial {
        Monomial(
            self.0
                .iter()
                .filter_map(|(symbol, exponent)| {
                    let shared = (*exponent).min(other.exponent(symbol));
                    (shared > 0).then(|| (symbol.clone(), shared))
                })
                .collect(),
        )
    }

    fn without(&self, symbol: &Symbol) -> Monomial {
        let mut powers = self.0.clone();
        powers.remove(symbol);
        Monomial(powers)
    }

    fn rename(&self, map: &SymbolMap) -> Monomial {
        let mut powers = BTreeMap::new();
        for (symbol, exponent) in &self.0 {
            let target = map.get(symbol).unwrap_or(symbol).clone();
            *powers.entry(target).or_insert(0) += exponent;
        }
        Monomial(powers)
    }

    fn evaluate(&self, values: &BTreeMap<Symbol, f64>) -> Option<f64> {
        self.0.iter().try_fold(1.0, |acc, (symbol, exponent)| {
            let value = values.get(symbol)?;
            Some(acc * value.powi(i32::try_from(*exponent).ok()?))
        })
    }

    /// Graded order used to pick leading terms and to print
    fn graded_key(&self) -> (u32, &Monomial) {
        (self.degree(), self)
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_one() {
            return f.write_str("1");
        }
        for (i, (symbol, exponent)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("*")?;
            }
            match exponent {
                1 => write!(f, "{}", symbol)?,
                _ => write!(f, "{}**{}", symbol, exponent)?,
            }
        }
        Ok(())
    }
}

/// Sparse multivariate polynomial with rational coefficients
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Poly {
    terms: BTreeMap<Monomial, Rational>,
}

impl Poly {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(value: Rational) -> Self {
        Self::term(Monomial::one(), value)
    }

    pub fn symbol(symbol: Symbol) -> Self {
        Self::term(Monomial::of(symbol), Rational::ONE)
    }

    pub fn term(monomial: Monomial, coefficient: Rational) -> Self {
        let mut terms = BTreeMap::new();
        if !coefficient.is_zero() {
            terms.insert(monomial, coefficient);
        }
        Poly { terms }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value of a constant polynomial
    pub fn as_constant(&self) -> Option<Rational> {
        match self.terms.len() {
            0 => Some(Rational::ZERO),
            1 => self.terms.get(&Monomial::one()).copied(),
            _ => None,
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &Rational)> {
        self.terms.iter()
    }

    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.terms.keys().flat_map(|m| m.symbols().cloned()).collect()
    }

    fn add_term(&mut self, monomial: Monomial, coefficient: Rational) -> SymbolicResult<()> {
        let sum = match self.terms.get(&monomial) {
            Some(existing) => checked(existing.checked_add(&coefficient))?,
            None => coefficient,
        };
        if sum.is_zero() {
            self.terms.remove(&monomial);
        } else {
            self.terms.insert(monomial, sum);
        }
        Ok(())
    }

    pub fn add(&self, other: &Poly) -> SymbolicResult<Poly> {
        let mut result = self.clone();
        for (monomial, coefficient) in &other.terms {
            result.add_term(monomial.clone(), *coefficient)?;
        }
        Ok(result)
    }

    pub fn sub(&self, other: &Poly) -> SymbolicResult<Poly> {
        self.add(&other.neg()?)
    }

    pub fn neg(&self) -> SymbolicResult<Poly> {
        self.scale(&Rational::integer(-1))
    }

    pub fn scale(&self, factor: &Rational) -> SymbolicResult<Poly> {
        if factor.is_zero() {
            return Ok(Poly::zero());
        }
        let terms = self
            .terms
            .iter()
            .map(|(m, c)| Ok((m.clone(), checked(c.checked_mul(factor))?)))
            .collect::<SymbolicResult<_>>()?;
        Ok(Poly { terms })
    }

    pub fn mul(&self, other: &Poly) -> SymbolicResult<Poly> {
        let mut result = Poly::zero();
        for (m1, c1) in &self.terms {
            for (m2, c2) in &other.terms {
                result.add_term(m1.mul(m2), checked(c1.checked_mul(c2))?)?;
            }
        }
        Ok(result)
    }

    pub fn pow(&self, exponent: u32) -> SymbolicResult<Poly> {
        let mut result = Poly::constant(Rational::ONE);
        for _ in 0..exponent {
            result = result.mul(self)?;
        }
        Ok(result)
    }

    pub fn rename(&self, map: &SymbolMap) -> SymbolicResult<Poly> {
        let mut result = Poly::zero();
        for (monomial, coefficient) in &self.terms {
            result.add_term(monomial.rename(map), *coefficient)?;
        }
        Ok(result)
    }

    /// Term with the greatest graded monomial
    pub fn leading_term(&self) -> Option<(&Monomial, &Rational)> {
        self.terms.iter().max_by(|a, b| a.0.graded_key().cmp(&b.0.graded_key()))
    }

    /// Largest monomial dividing every term
    fn monomial_content(&self) -> Monomial {
        let mut monomials = self.terms.keys();
        match monomials.next() {
            Some(first) => monomials.fold(first.clone(), |acc, m| acc.gcd(m)),
            None => Monomial::one(),
        }
    }

    fn divide_monomial(&self, divisor: &Monomial) -> Option<Poly> {
        let terms = self
            .terms
            .iter()
            .map(|(m, c)| Some((m.divide(divisor)?, *c)))
            .collect::<Option<_>>()?;
        Some(Poly { terms })
    }

    /// Split into per-unknown coefficients and an unknown-free remainder
    ///
    /// Fails with [`SymbolicError::NonLinear`] if any term has total degree
    /// above one in `unknowns`.
    pub fn split_linear(
        &self,
        unknowns: &BTreeSet<Symbol>,
    ) -> SymbolicResult<(BTreeMap<Symbol, Poly>, Poly)> {
        let mut coefficients: BTreeMap<Symbol, Poly> = BTreeMap::new();
        let mut rest = Poly::zero();

        for (monomial, coefficient) in &self.terms {
            let present: Vec<&Symbol> = monomial.symbols().filter(|s| unknowns.contains(*s)).collect();
            let degree: u32 = present.iter().map(|s| monomial.exponent(s)).sum();
            match (present.as_slice(), degree) {
                ([], _) => rest.add_term(monomial.clone(), *coefficient)?,
                ([unknown], 1) => coefficients
                    .entry((*unknown).clone())
                    .or_default()
                    .add_term(monomial.without(unknown), *coefficient)?,
                ([first, ..], _) => return Err(SymbolicError::NonLinear((*first).clone())),
            }
        }

        coefficients.retain(|_, poly| !poly.is_zero());
        Ok((coefficients, rest))
    }

    /// Numeric value, or `None` if a symbol has no value
    pub fn evaluate(&self, values: &BTreeMap<Symbol, f64>) -> Option<f64> {
        self.terms.iter().try_fold(0.0, |acc, (monomial, coefficient)| {
            Some(acc + coefficient.to_f64() * monomial.evaluate(values)?)
        })
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }

        let mut terms: Vec<(&Monomial, &Rational)> = self.terms.iter().collect();
        terms.sort_by(|a, b| b.0.graded_key().cmp(&a.0.graded_key()));

        for (i, (monomial, coefficient)) in terms.into_iter().enumerate() {
            let Some(magnitude) = coefficient.checked_abs() else {
                // i128::MIN keeps its sign inside the term
                if i > 0 {
                    f.write_str(" + ")?;
                }
                write!(f, "{}*{}", coefficient, monomial)?;
                continue;
            };
            let body = if monomial.is_one() {
                magnitude.to_string()
            } else if magnitude.is_one() {
                monomial.to_string()
            } else {
                format!("{}*{}", magnitude, monomial)
            };
            match (i, coefficient.is_negative()) {
                (0, true) => write!(f, "-{}", body)?,
                (0, false) => f.write_str(&body)?,
                (_, true) => write!(f, " - {}", body)?,
                (_, false) => write!(f, " + {}", body)?,
            }
        }
        Ok(())
    }
}

/// Quotient of two polynomials, kept normalized
#[derive(Debug, Clone)]
pub struct RationalFunction {
    num: Poly,
    den: Poly,
}

impl RationalFunction {
    pub fn zero() -> Self {
        Self::from_poly(Poly::zero())
    }

    pub fn constant(value: Rational) -> Self {
        Self::from_poly(Poly::constant(value))
    }

    pub fn symbol(symbol: Symbol) -> Self {
        Self::from_poly(Poly::symbol(symbol))
    }

    pub fn from_poly(poly: Poly) -> Self {
        RationalFunction {
            num: poly,
            den: Poly::constant(Rational::ONE),
        }
    }

    /// Build `num / den` in normalized form
    pub fn new(num: Poly, den: Poly) -> SymbolicResult<Self> {
        if den.is_zero() {
            return Err(SymbolicError::DivisionByZero);
        }
        RationalFunction { num, den }.normalized()
    }

    pub fn numerator(&self) -> &Poly {
        &self.num
    }

    pub fn denominator(&self) -> &Poly {
        &self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn as_constant(&self) -> Option<Rational> {
        let num = self.num.as_constant()?;
        let den = self.den.as_constant()?;
        num.checked_div(&den)
    }

    pub fn symbols(&self) -> BTreeSet<Symbol> {
        let mut symbols = self.num.symbols();
        symbols.extend(self.den.symbols());
        symbols
    }

    fn normalized(self) -> SymbolicResult<Self> {
        if self.num.is_zero() {
            return Ok(Self::zero());
        }

        let shared = self.num.monomial_content().gcd(&self.den.monomial_content());
        let (num, den) = match (self.num.divide_monomial(&shared), self.den.divide_monomial(&shared)) {
            (Some(num), Some(den)) => (num, den),
            _ => (self.num, self.den),
        };

        if let Some(constant) = den.as_constant() {
            let inverse = checked(constant.checked_recip())?;
            return Ok(Self::from_poly(num.scale(&inverse)?));
        }

        let lead = match den.leading_term() {
            Some((_, coefficient)) => checked(coefficient.checked_recip())?,
            None => return Err(SymbolicError::DivisionByZero),
        };
        Ok(RationalFunction {
            num: num.scale(&lead)?,
            den: den.scale(&lead)?,
        })
    }

    pub fn add(&self, other: &Self) -> SymbolicResult<Self> {
        if self.den == other.den {
            return RationalFunction::new(self.num.add(&other.num)?, self.den.clone());
        }
        let num = self.num.mul(&other.den)?.add(&other.num.mul(&self.den)?)?;
        RationalFunction::new(num, self.den.mul(&other.den)?)
    }

    pub fn sub(&self, other: &Self) -> SymbolicResult<Self> {
        self.add(&other.neg()?)
    }

    pub fn neg(&self) -> SymbolicResult<Self> {
        Ok(RationalFunction {
            num: self.num.neg()?,
            den: self.den.clone(),
        })
    }

    pub fn mul(&self, other: &Self) -> SymbolicResult<Self> {
        RationalFunction::new(self.num.mul(&other.num)?, self.den.mul(&other.den)?)
    }

    pub fn recip(&self) -> SymbolicResult<Self> {
        RationalFunction::new(self.den.clone(), self.num.clone())
    }

    pub fn div(&self, other: &Self) -> SymbolicResult<Self> {
        self.mul(&other.recip()?)
    }

    pub fn pow(&self, exponent: i32) -> SymbolicResult<Self> {
        let magnitude = exponent.unsigned_abs();
        let raised = RationalFunction::new(self.num.pow(magnitude)?, self.den.pow(magnitude)?)?;
        if exponent < 0 {
            raised.recip()
        } else {
            Ok(raised)
        }
    }

    pub fn rename(&self, map: &SymbolMap) -> SymbolicResult<Self> {
        RationalFunction::new(self.num.rename(map)?, self.den.rename(map)?)
    }

    /// Whether both sides denote the same function
    pub fn equivalent(&self, other: &Self) -> bool {
        match (self.num.mul(&other.den), other.num.mul(&self.den)) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }

    /// Numeric value; `None` when a symbol is missing or the result is not finite
    pub fn evaluate(&self, values: &BTreeMap<Symbol, f64>) -> Option<f64> {
        let den = self.den.evaluate(values)?;
        if den == 0.0 {
            return None;
        }
        let value = self.num.evaluate(values)? / den;
        value.is_finite().then_some(value)
    }
}

impl PartialEq for RationalFunction {
    fn eq(&self, other: &Self) -> bool {
        self.equivalent(other)
    }
}

impl fmt::Display for RationalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.as_constant().map_or(false, |c| c.is_one()) {
            write!(f, "{}", self.num)
        } else {
            write!(f, "({})/({})", self.num, self.den)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::Expr;

    fn rf(text: &str) -> RationalFunction {
        Expr::parse(text).unwrap().to_rational_function().unwrap()
    }

    #[test]
    fn test_like_terms_collect() {
        let f = rf("2*n_0 + 3*n_0 - n_1 + n_1");
        assert_eq!(f.to_string(), "5*n_0");
    }

    #[test]
    fn test_expansion_is_canonical() {
        assert_eq!(rf("(n_0 + n_1)*(n_0 - n_1)").numerator(), rf("n_0**2 - n_1**2").numerator());
    }

    #[test]
    fn test_display_order() {
        assert_eq!(rf("n_1 - n_0").to_string(), "n_1 - n_0");
        assert_eq!(rf("-n_0 + n_1").to_string(), "n_1 - n_0");
        assert_eq!(rf("3 - 2*n_0*n_1").to_string(), "-2*n_0*n_1 + 3");
    }

    #[test]
    fn test_constant_denominator_folds() {
        let f = rf("(n_0 + n_1)/4");
        assert!(f.denominator().as_constant().unwrap().is_one());
        assert_eq!(f.to_string(), "0.25*n_1 + 0.25*n_0");
    }

    #[test]
    fn test_monomial_content_cancels() {
        let f = rf("(n_0*n_1 - n_0*n_2)/(n_0*n_3)");
        assert_eq!(f.to_string(), "(n_1 - n_2)/(n_3)");
    }

    #[test]
    fn test_equivalence_by_cross_multiplication() {
        let a = rf("(n_0 - n_1)/(n_2 - n_3)");
        let b = rf("(n_1 - n_0)/(n_3 - n_2)");
        assert_eq!(a, b);
        assert_ne!(a, rf("(n_0 - n_1)/(n_2 + n_3)"));
    }

    #[test]
    fn test_display_reparses_equivalent() {
        for text in ["(n_0 - 2*n_1)/(3*n_2 + n_3)", "n_0/3", "n_0*n_1 - 0.5"] {
            let f = rf(text);
            assert_eq!(rf(&f.to_string()), f, "roundtrip of {}", text);
        }
    }

    #[test]
    fn test_minimum_coefficient() {
        let f = rf("(-170141183460469231731687303715884105727 - 1)*n_0");
        assert_eq!(f.to_string(), "-170141183460469231731687303715884105728*n_0");
        assert_eq!(
            Expr::parse("n_0/(-170141183460469231731687303715884105727 - 1)")
                .unwrap()
                .to_rational_function()
                .unwrap_err(),
            SymbolicError::Overflow
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            Expr::parse("n_0/(n_1 - n_1)").unwrap().to_rational_function().unwrap_err(),
            SymbolicError::DivisionByZero
        );
    }

    #[test]
    fn test_split_linear() {
        let unknowns: BTreeSet<Symbol> = [Symbol::unified_unknown(0), Symbol::unified_unknown(1)].into();
        let f = rf("n_0*u_0 + 2*u_1 - n_1");
        let (coefficients, rest) = f.numerator().split_linear(&unknowns).unwrap();
        assert_eq!(coefficients[&Symbol::unified_unknown(0)], Poly::symbol(Symbol::number(0)));
        assert_eq!(coefficients[&Symbol::unified_unknown(1)], Poly::constant(Rational::integer(2)));
        assert_eq!(rest, Poly::symbol(Symbol::number(1)).neg().unwrap());
    }

    #[test]
    fn test_split_linear_rejects_products_of_unknowns() {
        let unknowns: BTreeSet<Symbol> = [Symbol::unified_unknown(0), Symbol::unified_unknown(1)].into();
        let f = rf("u_0*u_1 - 1");
        assert!(matches!(
            f.numerator().split_linear(&unknowns),
            Err(SymbolicError::NonLinear(_))
        ));
    }

    #[test]
    fn test_evaluate() {
        let f = rf("(n_1 - n_0)/n_2");
        let mut values = BTreeMap::new();
        values.insert(Symbol::number(0), 3.0);
        values.insert(Symbol::number(1), 5.0);
        assert_eq!(f.evaluate(&values), None);
        values.insert(Symbol::number(2), 4.0);
        assert_eq!(f.evaluate(&values), Some(0.5));
        values.insert(Symbol::number(2), 0.0);
        assert_eq!(f.evaluate(&values), None);
    }

    #[test]
    fn test_rename_swaps_slots() {
        let mut map = SymbolMap::new();
        map.insert(Symbol::number(0), Symbol::number(1));
        map.insert(Symbol::number(1), Symbol::number(0));
        assert_eq!(rf("n_1 - n_0").rename(&map).unwrap(), rf("n_0 - n_1"));
    }
}
