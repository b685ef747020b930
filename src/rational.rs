//! Exact rational arithmetic.
//!
//! Every constant in the pipeline is an exact rational; there is no
//! floating-point fallback anywhere. Validation compares against *exact*
//! zero, so the numeric substrate has to stay exact end to end.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::ops::{Add, Mul, Neg, Sub};

fn gcd(mut a: i128, mut b: i128) -> i128 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Integer square root, or `None` when `n` is not a perfect square.
fn perfect_sqrt(n: i128) -> Option<i128> {
    if n < 0 {
        return None;
    }
    if n < 2 {
        return Some(n);
    }

    // Newton's method on integers converges from above.
    let mut x = n;
    let mut next = (x + n / x) / 2;
    while next < x {
        x = next;
        next = (x + n / x) / 2;
    }

    if x * x == n {
        Some(x)
    } else {
        None
    }
}

/// An exact rational number.
///
/// Invariant: `den > 0` and `gcd(num, den) == 1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Rational {
    num: i128,
    den: i128,
}

impl Rational {
    /// The integer `n` as a rational.
    pub fn int(n: i128) -> Self {
        Rational { num: n, den: 1 }
    }

    pub fn zero() -> Self {
        Rational::int(0)
    }

    pub fn one() -> Self {
        Rational::int(1)
    }

    /// Create `num/den`, reducing to lowest terms.
    ///
    /// The denominator must be non-zero; callers check before dividing.
    pub fn new(num: i128, den: i128) -> Self {
        debug_assert_ne!(den, 0, "rational with zero denominator");

        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        let g = gcd(num, den);

        if g == 0 {
            Rational { num: 0, den: 1 }
        } else {
            Rational {
                num: num / g,
                den: den / g,
            }
        }
    }

    pub fn numerator(&self) -> i128 {
        self.num
    }

    pub fn denominator(&self) -> i128 {
        self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    pub fn is_one(&self) -> bool {
        self.num == 1 && self.den == 1
    }

    pub fn is_negative(&self) -> bool {
        self.num < 0
    }

    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    pub fn abs(&self) -> Self {
        Rational {
            num: self.num.abs(),
            den: self.den,
        }
    }

    /// Multiplicative inverse, or `None` for zero.
    pub fn recip(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(Rational::new(self.den, self.num))
        }
    }

    /// Division that refuses a zero divisor instead of panicking.
    pub fn checked_div(&self, rhs: &Rational) -> Option<Self> {
        rhs.recip().map(|r| *self * r)
    }

    /// Raise to an integer power. Negative exponents invert, so zero
    /// raised to a negative power is `None`.
    pub fn pow_int(&self, exp: i64) -> Option<Self> {
        if exp < 0 {
            return self.recip().and_then(|r| r.pow_int(-exp));
        }

        let mut out = Rational::one();
        for _ in 0..exp {
            out = out * *self;
        }
        Some(out)
    }

    /// The exact square root, when one exists in the rationals.
    pub fn sqrt_exact(&self) -> Option<Self> {
        let num = perfect_sqrt(self.num)?;
        let den = perfect_sqrt(self.den)?;
        Some(Rational::new(num, den))
    }
}

impl Default for Rational {
    fn default() -> Self {
        Rational::zero()
    }
}

impl From<i128> for Rational {
    fn from(n: i128) -> Self {
        Rational::int(n)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Rational::int(n as i128)
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            num: -self.num,
            den: self.den,
        }
    }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        // n1/d1 + n2/d2 = (n1*d2 + n2*d1) / (d1*d2)
        Rational::new(
            self.num * rhs.den + rhs.num * self.den,
            self.den * rhs.den,
        )
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        self + (-rhs)
    }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        // Cross-reduce before multiplying to keep the factors small.
        let g1 = gcd(self.num, rhs.den);
        let g2 = gcd(rhs.num, self.den);
        Rational::new(
            (self.num / g1) * (rhs.num / g2),
            (self.den / g2) * (rhs.den / g1),
        )
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplication preserves order.
        (self.num * other.den).cmp(&(other.num * self.den))
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arithmetic_is_exact() {
        let half = Rational::new(1, 2);
        let third = Rational::new(1, 3);

        assert_eq!(half + third, Rational::new(5, 6));
        assert_eq!(half * third, Rational::new(1, 6));
        assert_eq!(half - third, Rational::new(1, 6));
        assert_eq!(half.checked_div(&third), Some(Rational::new(3, 2)));
        assert_eq!(half.checked_div(&Rational::zero()), None);
    }

    #[test]
    fn construction_reduces() {
        assert_eq!(Rational::new(4, 6), Rational::new(2, 3));
        assert_eq!(Rational::new(3, -6), Rational::new(-1, 2));
        assert_eq!(Rational::new(-2, -4), Rational::new(1, 2));
    }

    #[test]
    fn powers() {
        let r = Rational::new(2, 3);
        assert_eq!(r.pow_int(2), Some(Rational::new(4, 9)));
        assert_eq!(r.pow_int(0), Some(Rational::one()));
        assert_eq!(r.pow_int(-1), Some(Rational::new(3, 2)));
        assert_eq!(Rational::zero().pow_int(-1), None);
    }

    #[test]
    fn exact_square_roots() {
        assert_eq!(Rational::int(4).sqrt_exact(), Some(Rational::int(2)));
        assert_eq!(
            Rational::new(9, 16).sqrt_exact(),
            Some(Rational::new(3, 4))
        );
        assert_eq!(Rational::int(13).sqrt_exact(), None);
        assert_eq!(Rational::int(-4).sqrt_exact(), None);
    }

    #[test]
    fn ordering_uses_cross_multiplication() {
        assert!(Rational::new(1, 3) < Rational::new(1, 2));
        assert!(Rational::new(-1, 2) < Rational::zero());
    }

    #[test]
    fn display() {
        assert_eq!(Rational::int(5).to_string(), "5");
        assert_eq!(Rational::new(-3, 4).to_string(), "-3/4");
    }
}
