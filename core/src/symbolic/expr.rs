//! Syntactic expression trees
//!
//! An [`Expr`] keeps the exact shape of what was written: `x - 5` stays a
//! subtraction with the literal `5`, so a number mentioned in the problem text
//! can be found and replaced by a slot without algebra rewriting the literal
//! away. Simplification happens only when converting to a
//! [`RationalFunction`].

use super::error::{SymbolicError, SymbolicResult};
use super::parser;
use super::poly::RationalFunction;
use super::rational::Rational;
use super::symbols::{Symbol, SymbolMap};
use std::collections::BTreeSet;
use std::fmt;

/// Unevaluated arithmetic expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Num(Rational),
    Sym(Symbol),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Parse an expression such as `0.05*x + 0.06*(y - 2)`
    pub fn parse(input: &str) -> SymbolicResult<Expr> {
        parser::parse_expr(input)
    }

    pub fn num(value: Rational) -> Expr {
        Expr::Num(value)
    }

    pub fn sym(symbol: Symbol) -> Expr {
        Expr::Sym(symbol)
    }

    /// Set of symbols occurring anywhere in the tree
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        match self {
            Expr::Num(_) => {}
            Expr::Sym(symbol) => {
                out.insert(symbol.clone());
            }
            Expr::Neg(inner) => inner.collect_symbols(out),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) | Expr::Pow(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
        }
    }

    /// Whether `target` occurs as a subtree
    pub fn contains(&self, target: &Expr) -> bool {
        if self == target {
            return true;
        }
        match self {
            Expr::Num(_) | Expr::Sym(_) => false,
            Expr::Neg(inner) => inner.contains(target),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) | Expr::Pow(a, b) => {
                a.contains(target) || b.contains(target)
            }
        }
    }

    /// Replace every subtree equal to `old` with `new`, without evaluating
    pub fn replace(&self, old: &Expr, new: &Expr) -> Expr {
        if self == old {
            return new.clone();
        }
        self.map_children(|child| child.replace(old, new))
    }

    /// Rename symbols; symbols absent from `map` are kept
    pub fn rename(&self, map: &SymbolMap) -> Expr {
        match self {
            Expr::Sym(symbol) => match map.get(symbol) {
                Some(renamed) => Expr::Sym(renamed.clone()),
                None => self.clone(),
            },
            _ => self.map_children(|child| child.rename(map)),
        }
    }

    fn map_children<F>(&self, mut f: F) -> Expr
    where
        F: FnMut(&Expr) -> Expr,
    {
        match self {
            Expr::Num(_) | Expr::Sym(_) => self.clone(),
            Expr::Neg(inner) => Expr::Neg(Box::new(f(inner))),
            Expr::Add(a, b) => Expr::Add(Box::new(f(a)), Box::new(f(b))),
            Expr::Sub(a, b) => Expr::Sub(Box::new(f(a)), Box::new(f(b))),
            Expr::Mul(a, b) => Expr::Mul(Box::new(f(a)), Box::new(f(b))),
            Expr::Div(a, b) => Expr::Div(Box::new(f(a)), Box::new(f(b))),
            Expr::Pow(a, b) => Expr::Pow(Box::new(f(a)), Box::new(f(b))),
        }
    }

    /// Simplify into canonical rational-function form
    pub fn to_rational_function(&self) -> SymbolicResult<RationalFunction> {
        match self {
            Expr::Num(value) => Ok(RationalFunction::constant(*value)),
            Expr::Sym(symbol) => Ok(RationalFunction::symbol(symbol.clone())),
            Expr::Neg(inner) => inner.to_rational_function()?.neg(),
            Expr::Add(a, b) => a.to_rational_function()?.add(&b.to_rational_function()?),
            Expr::Sub(a, b) => a.to_rational_function()?.sub(&b.to_rational_function()?),
            Expr::Mul(a, b) => a.to_rational_function()?.mul(&b.to_rational_function()?),
            Expr::Div(a, b) => a.to_rational_function()?.div(&b.to_rational_function()?),
            Expr::Pow(base, exponent) => {
                let exponent = exponent
                    .to_rational_function()?
                    .as_constant()
                    .filter(Rational::is_integer)
                    .and_then(|value| i32::try_from(value.numer()).ok())
                    .ok_or_else(|| SymbolicError::NonPolynomial(self.to_string()))?;
                base.to_rational_function()?.pow(exponent)
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(_) => 3,
            Expr::Pow(..) => 4,
            Expr::Num(value) if value.to_string().contains('/') => 2,
            Expr::Num(value) if value.is_negative() => 3,
            Expr::Num(_) | Expr::Sym(_) => 5,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(value) => write!(f, "{}", value),
            Expr::Sym(symbol) => write!(f, "{}", symbol),
            Expr::Neg(inner) => {
                f.write_str("-")?;
                inner.fmt_operand(f, 3)
            }
            Expr::Add(a, b) => {
                a.fmt_operand(f, 1)?;
                f.write_str(" + ")?;
                b.fmt_operand(f, 2)
            }
            Expr::Sub(a, b) => {
                a.fmt_operand(f, 1)?;
                f.write_str(" - ")?;
                b.fmt_operand(f, 2)
            }
            Expr::Mul(a, b) => {
                a.fmt_operand(f, 2)?;
                f.write_str("*")?;
                b.fmt_operand(f, 3)
            }
            Expr::Div(a, b) => {
                a.fmt_operand(f, 2)?;
                f.write_str("/")?;
                b.fmt_operand(f, 3)
            }
            Expr::Pow(base, exponent) => {
                base.fmt_operand(f, 5)?;
                f.write_str("**")?;
                exponent.fmt_operand(f, 4)
            }
        }
    }
}
