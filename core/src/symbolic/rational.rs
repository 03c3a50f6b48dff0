//! Exact rational numbers
//!
//! Literals in labeled equations are kept exact so that a number mentioned in
//! the problem text can be matched against the literal it produced in an
//! equation (`2340.00` and `2340` are the same literal).
//!
//! Arithmetic is checked; callers decide what overflow means for them.

use num_integer::Integer;
use std::fmt;

/// Reduced fraction with a positive denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i128,
    den: i128,
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, den: 1 };
    pub const ONE: Rational = Rational { num: 1, den: 1 };

    /// Build `num / den`, or `None` when `den` is zero
    pub fn new(num: i128, den: i128) -> Option<Self> {
        if den == 0 {
            return None;
        }
        Self::reduced(num, den)
    }

    pub fn integer(value: i128) -> Self {
        Rational { num: value, den: 1 }
    }

    /// `None` when the sign cannot be moved to the numerator
    fn reduced(num: i128, den: i128) -> Option<Self> {
        // gcd panics when both operands are i128::MIN, or one is zero and the other i128::MIN
        if num == 0 {
            return Some(Rational::ZERO);
        }
        if num == den {
            return Some(Rational::ONE);
        }
        let divisor = num.gcd(&den);
        let (num, den) = if divisor > 1 {
            (num / divisor, den / divisor)
        } else {
            (num, den)
        };
        if den < 0 {
            return Some(Rational {
                num: num.checked_neg()?,
                den: den.checked_neg()?,
            });
        }
        Some(Rational { num, den })
    }

    pub fn numer(&self) -> i128 {
        self.num
    }

    pub fn denom(&self) -> i128 {
        self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    pub fn is_one(&self) -> bool {
        self.num == 1 && self.den == 1
    }

    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    pub fn is_negative(&self) -> bool {
        self.num < 0
    }

    pub fn checked_abs(&self) -> Option<Self> {
        Some(Rational {
            num: self.num.checked_abs()?,
            den: self.den,
        })
    }

    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    pub fn checked_neg(&self) -> Option<Self> {
        Some(Rational {
            num: self.num.checked_neg()?,
            den: self.den,
        })
    }

    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        let divisor = self.den.gcd(&other.den);
        let lcm = (self.den / divisor).checked_mul(other.den)?;
        let left = self.num.checked_mul(lcm / self.den)?;
        let right = other.num.checked_mul(lcm / other.den)?;
        Rational::new(left.checked_add(right)?, lcm)
    }

    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        self.checked_add(&other.checked_neg()?)
    }

    pub fn checked_mul(&self, other: &Self) -> Option<Self> {
        // Cross-cancel first to keep intermediates small
        let g1 = self.num.gcd(&other.den).max(1);
        let g2 = other.num.gcd(&self.den).max(1);
        let num = (self.num / g1).checked_mul(other.num / g2)?;
        let den = (self.den / g2).checked_mul(other.den / g1)?;
        Rational::new(num, den)
    }

    pub fn checked_div(&self, other: &Self) -> Option<Self> {
        self.checked_mul(&other.checked_recip()?)
    }

    pub fn checked_recip(&self) -> Option<Self> {
        Rational::new(self.den, self.num)
    }

    pub fn checked_pow(&self, exponent: i32) -> Option<Self> {
        let base = if exponent < 0 {
            self.checked_recip()?
        } else {
            *self
        };
        let mut result = Rational::ONE;
        for _ in 0..exponent.unsigned_abs() {
            result = result.checked_mul(&base)?;
        }
        Some(result)
    }

    /// Parse a decimal literal such as `42`, `-0.275`, `.5` or `1.5e3`
    pub fn parse_decimal(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (mantissa, exponent) = match body.find(|c: char| c == 'e' || c == 'E') {
            Some(pos) => (&body[..pos], body[pos + 1..].parse::<i32>().ok()?),
            None => (body, 0),
        };

        let (whole, fraction) = match mantissa.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (mantissa, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return None;
        }

        let digits = format!("{}{}", whole, fraction);
        let mut value = Rational::integer(digits.parse::<i128>().ok()?);
        let scale = exponent.checked_sub(i32::try_from(fraction.len()).ok()?)?;
        value = value.checked_mul(&Rational::integer(10).checked_pow(scale)?)?;

        if negative {
            value.checked_neg()
        } else {
            Some(value)
        }
    }

    /// Exact value of the shortest decimal that prints as `value`
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Rational::parse_decimal(&format!("{}", value))
    }
}

impl Rational {
    /// Terminating decimal form, when the denominator only has factors 2 and 5
    pub fn to_decimal_string(&self) -> Option<String> {
        let mut rest = self.den;
        let (mut twos, mut fives) = (0u32, 0u32);
        while rest % 2 == 0 {
            rest /= 2;
            twos += 1;
        }
        while rest % 5 == 0 {
            rest /= 5;
            fives += 1;
        }
        if rest != 1 {
            return None;
        }

        let places = twos.max(fives);
        let scale = 10i128.checked_pow(places)?;
        let scaled = self.num.checked_mul(scale / self.den)?;
        if places == 0 {
            return Some(scaled.to_string());
        }

        let digits = format!("{:0width$}", scaled.unsigned_abs(), width = places as usize + 1);
        let (whole, fraction) = digits.split_at(digits.len() - places as usize);
        let sign = if scaled < 0 { "-" } else { "" };
        Some(format!("{}{}.{}", sign, whole, fraction))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            return write!(f, "{}", self.num);
        }
        match self.to_decimal_string() {
            Some(decimal) => f.write_str(&decimal),
            None => write!(f, "{}/{}", self.num, self.den),
        }
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Rational::integer(value as i128)
    }
}
