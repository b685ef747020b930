//! Solution validation by re-substitution into the original equation.
//!
//! A candidate passes when `lhs - rhs` reduces to *exactly* zero after
//! substituting it in. Zero detection is exact: either the difference
//! normalizes to the zero polynomial, or it evaluates to zero in the
//! quadratic field `Q(sqrt(d))` the candidate's surd lives in. There is
//! no numeric tolerance anywhere.

use crate::equation::Equation;
use crate::expr::{BinaryOperation, Expression};
use crate::ops;
use crate::poly::PolyForm;
use crate::rational::Rational;
use crate::solve::Solution;
use std::convert::TryFrom;
use tracing::trace;

/// `true` iff every entry makes the original equation an identity.
///
/// Short-circuits on the first failing entry. Entries whose difference
/// this engine cannot decide exactly are skipped: they neither pass nor
/// fail. An empty set is vacuously valid; callers should read
/// `solution_count` alongside this flag.
pub fn validate(equation: &Equation, solutions: &[Solution]) -> bool {
    for solution in solutions {
        let lhs = ops::substitute(equation.lhs(), &solution.variable, &solution.value);
        let rhs = ops::substitute(equation.rhs(), &solution.variable, &solution.value);
        let difference = lhs - rhs;

        match reduces_to_zero(&difference) {
            Some(true) => {}
            Some(false) => {
                trace!(%solution, "candidate failed validation");
                return false;
            }
            // not decidable in this engine; skip rather than reject
            None => trace!(%solution, "candidate skipped, not exactly decidable"),
        }
    }

    true
}

/// Exact zero test, or `None` when the expression is outside what the
/// engine can decide.
fn reduces_to_zero(expr: &Expression) -> Option<bool> {
    if let Some(form) = PolyForm::from_expression(expr) {
        return Some(form.is_zero());
    }

    Exact::evaluate(expr).map(|value| value.is_zero())
}

/// A number in `Q(sqrt(d))`: `a + b*sqrt(d)`.
///
/// Invariant: the `Surd` variant has `b != 0` and `d` positive with no
/// rational square root; everything else collapses to `Rational`.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Exact {
    Rational(Rational),
    Surd {
        a: Rational,
        b: Rational,
        d: Rational,
    },
}

impl Exact {
    fn evaluate(expr: &Expression) -> Option<Exact> {
        match expr {
            Expression::Number(n) => Some(Exact::Rational(*n)),
            Expression::Variable(_) => None,
            Expression::Negate(inner) => {
                Some(Exact::evaluate(inner)?.negated())
            }
            Expression::Binary { left, right, op } => {
                let l = Exact::evaluate(left)?;
                let r = Exact::evaluate(right)?;
                match op {
                    BinaryOperation::Plus => l.add(&r),
                    BinaryOperation::Minus => l.add(&r.negated()),
                    BinaryOperation::Times => l.mul(&r),
                    BinaryOperation::Divide => l.mul(&r.recip()?),
                    BinaryOperation::Power => {
                        let exponent = match r {
                            Exact::Rational(e) if e.is_integer() => {
                                i64::try_from(e.numerator()).ok()?
                            }
                            _ => return None,
                        };
                        l.pow_int(exponent)
                    }
                }
            }
            Expression::FunctionCall { function, argument } => {
                if function != "sqrt" {
                    return None;
                }
                Exact::evaluate(argument)?.sqrt()
            }
        }
    }

    fn is_zero(&self) -> bool {
        // b*sqrt(d) is irrational for b != 0, so a surd is never zero
        matches!(self, Exact::Rational(r) if r.is_zero())
    }

    fn surd(a: Rational, b: Rational, d: Rational) -> Exact {
        if b.is_zero() {
            Exact::Rational(a)
        } else {
            Exact::Surd { a, b, d }
        }
    }

    fn negated(&self) -> Exact {
        match *self {
            Exact::Rational(r) => Exact::Rational(-r),
            Exact::Surd { a, b, d } => Exact::Surd { a: -a, b: -b, d },
        }
    }

    fn add(&self, other: &Exact) -> Option<Exact> {
        match (*self, *other) {
            (Exact::Rational(l), Exact::Rational(r)) => {
                Some(Exact::Rational(l + r))
            }
            (Exact::Rational(l), Exact::Surd { a, b, d }) => {
                Some(Exact::surd(l + a, b, d))
            }
            (Exact::Surd { a, b, d }, Exact::Rational(r)) => {
                Some(Exact::surd(a + r, b, d))
            }
            (
                Exact::Surd { a: a1, b: b1, d: d1 },
                Exact::Surd { a: a2, b: b2, d: d2 },
            ) => {
                // only surds over the same radicand combine exactly
                if d1 != d2 {
                    return None;
                }
                Some(Exact::surd(a1 + a2, b1 + b2, d1))
            }
        }
    }

    fn mul(&self, other: &Exact) -> Option<Exact> {
        match (*self, *other) {
            (Exact::Rational(l), Exact::Rational(r)) => {
                Some(Exact::Rational(l * r))
            }
            (Exact::Rational(l), Exact::Surd { a, b, d }) => {
                Some(Exact::surd(l * a, l * b, d))
            }
            (Exact::Surd { a, b, d }, Exact::Rational(r)) => {
                Some(Exact::surd(a * r, b * r, d))
            }
            (
                Exact::Surd { a: a1, b: b1, d: d1 },
                Exact::Surd { a: a2, b: b2, d: d2 },
            ) => {
                if d1 != d2 {
                    return None;
                }
                // (a1 + b1*s)(a2 + b2*s) with s^2 = d
                Some(Exact::surd(
                    a1 * a2 + b1 * b2 * d1,
                    a1 * b2 + b1 * a2,
                    d1,
                ))
            }
        }
    }

    fn recip(&self) -> Option<Exact> {
        match *self {
            Exact::Rational(r) => r.recip().map(Exact::Rational),
            Exact::Surd { a, b, d } => {
                // 1/(a + b*s) = (a - b*s)/(a^2 - b^2*d); the denominator
                // cannot vanish because s is irrational
                let norm = a * a - b * b * d;
                let inv = norm.recip()?;
                Some(Exact::surd(a * inv, -b * inv, d))
            }
        }
    }

    fn pow_int(&self, exponent: i64) -> Option<Exact> {
        if exponent < 0 {
            return self.recip()?.pow_int(-exponent);
        }

        let mut out = Exact::Rational(Rational::one());
        for _ in 0..exponent {
            out = out.mul(self)?;
        }
        Some(out)
    }

    fn sqrt(&self) -> Option<Exact> {
        match *self {
            Exact::Rational(r) => {
                if r.is_negative() {
                    return None;
                }
                match r.sqrt_exact() {
                    Some(root) => Some(Exact::Rational(root)),
                    None => Some(Exact::surd(Rational::zero(), Rational::one(), r)),
                }
            }
            Exact::Surd { .. } => None,
        }
    }
}
