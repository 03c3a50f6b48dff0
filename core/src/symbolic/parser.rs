//! Expression and equation parser
//!
//! Grammar (lowest to highest precedence):
//!
//! ```text
//! equation := expr '=' expr
//! expr     := term (('+' | '-') term)*
//! term     := unary (('*' | '/') unary)*
//! unary    := ('-' | '+') unary | power
//! power    := atom (('**' | '^') unary)?
//! atom     := number | identifier | '(' expr ')'
//! ```
//!
//! Nothing is evaluated while parsing; literals keep their written value.

use super::error::{SymbolicError, SymbolicResult};
use super::expr::Expr;
use super::rational::Rational;
use super::symbols::Symbol;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_opt, opt, recognize},
    error::{context, convert_error, VerboseError},
    multi::many0,
    sequence::{delimited, pair, preceded, separated_pair, tuple},
    Finish, IResult,
};

type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> ParseResult<'a, O>
where
    F: FnMut(&'a str) -> ParseResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}

fn number(input: &str) -> ParseResult<'_, Rational> {
    let mantissa = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ));
    let exponent = opt(tuple((one_of("eE"), opt(one_of("+-")), digit1)));

    context(
        "number",
        map_opt(recognize(pair(mantissa, exponent)), Rational::parse_decimal),
    )(input)
}

fn identifier(input: &str) -> ParseResult<'_, Symbol> {
    context(
        "identifier",
        map(
            recognize(pair(
                alt((alpha1, tag("_"))),
                many0(alt((alphanumeric1, tag("_")))),
            )),
            Symbol::from_name,
        ),
    )(input)
}

fn atom(input: &str) -> ParseResult<'_, Expr> {
    ws(alt((
        map(number, Expr::Num),
        map(identifier, Expr::Sym),
        context("parenthesized", delimited(char('('), expr, ws(char(')')))),
    )))(input)
}

fn power(input: &str) -> ParseResult<'_, Expr> {
    let (input, base) = atom(input)?;
    let (input, exponent) = opt(preceded(ws(alt((tag("**"), tag("^")))), unary))(input)?;
    let expr = match exponent {
        Some(exponent) => Expr::Pow(Box::new(base), Box::new(exponent)),
        None => base,
    };
    Ok((input, expr))
}

fn unary(input: &str) -> ParseResult<'_, Expr> {
    alt((
        map(preceded(ws(char('-')), unary), |e| Expr::Neg(Box::new(e))),
        preceded(ws(char('+')), unary),
        power,
    ))(input)
}

fn term(input: &str) -> ParseResult<'_, Expr> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(pair(ws(one_of("*/")), unary))(input)?;
    let expr = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '*' => Expr::Mul(Box::new(acc), Box::new(rhs)),
        _ => Expr::Div(Box::new(acc), Box::new(rhs)),
    });
    Ok((input, expr))
}

fn expr(input: &str) -> ParseResult<'_, Expr> {
    let (input, first) = term(input)?;
    let (input, rest) = many0(pair(ws(one_of("+-")), term))(input)?;
    let expr = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '+' => Expr::Add(Box::new(acc), Box::new(rhs)),
        _ => Expr::Sub(Box::new(acc), Box::new(rhs)),
    });
    Ok((input, expr))
}

fn equation(input: &str) -> ParseResult<'_, (Expr, Expr)> {
    context("equation", separated_pair(expr, ws(char('=')), expr))(input)
}

fn parse_error<'a>(input: &'a str, error: VerboseError<&'a str>) -> SymbolicError {
    SymbolicError::Parse {
        input: input.to_string(),
        message: convert_error(input, error),
    }
}

/// Parse a complete expression
pub fn parse_expr(input: &str) -> SymbolicResult<Expr> {
    all_consuming(ws(expr))(input)
        .finish()
        .map(|(_, e)| e)
        .map_err(|e| parse_error(input, e))
}

/// Parse `lhs = rhs`
pub fn parse_equation(input: &str) -> SymbolicResult<(Expr, Expr)> {
    all_consuming(ws(equation))(input)
        .finish()
        .map(|(_, sides)| sides)
        .map_err(|e| parse_error(input, e))
}
