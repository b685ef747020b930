//! Canonical polynomial forms.
//!
//! [`PolyForm`] is a multivariate normal form (monomial -> coefficient)
//! used for exact zero tests, degree extraction and canonical rendering.
//! [`UniPoly`] is the dense univariate view used for root finding and
//! factoring. Conversion from an [`Expression`] fails (`None`) exactly
//! when the expression is not polynomial, e.g. it divides by an unknown.

use crate::expr::{BinaryOperation, Expression, Variable};
use crate::ops;
use crate::rational::Rational;
use smol_str::SmolStr;
use std::collections::{BTreeMap, BTreeSet};
use std::convert::TryFrom;

/// A monomial: variable name -> exponent. The empty map is the constant
/// monomial.
pub type Monomial = BTreeMap<SmolStr, u32>;

/// A multivariate polynomial over the rationals in normal form.
///
/// Invariant: no stored coefficient is zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyForm {
    terms: BTreeMap<Monomial, Rational>,
}

impl PolyForm {
    pub fn zero() -> Self {
        PolyForm::default()
    }

    pub fn constant(value: Rational) -> Self {
        let mut form = PolyForm::zero();
        form.add_term(Monomial::new(), value);
        form
    }

    pub fn variable(variable: &Variable) -> Self {
        let mut monomial = Monomial::new();
        monomial.insert(variable.name().into(), 1);

        let mut form = PolyForm::zero();
        form.add_term(monomial, Rational::one());
        form
    }

    /// Convert an expression into normal form, or `None` when it isn't a
    /// polynomial over the rationals.
    pub fn from_expression(expr: &Expression) -> Option<PolyForm> {
        match expr {
            Expression::Number(n) => Some(PolyForm::constant(*n)),
            Expression::Variable(v) => Some(PolyForm::variable(v)),
            Expression::Negate(inner) => {
                Some(PolyForm::from_expression(inner)?.negated())
            }
            Expression::Binary { left, right, op } => {
                let l = PolyForm::from_expression(left);
                match op {
                    BinaryOperation::Plus => {
                        Some(l?.add(&PolyForm::from_expression(right)?))
                    }
                    BinaryOperation::Minus => Some(
                        l?.add(&PolyForm::from_expression(right)?.negated()),
                    ),
                    BinaryOperation::Times => {
                        Some(l?.mul(&PolyForm::from_expression(right)?))
                    }
                    BinaryOperation::Divide => {
                        // Only division by a non-zero constant keeps us in
                        // the polynomial ring.
                        let divisor =
                            PolyForm::from_expression(right)?.as_constant()?;
                        let scale = divisor.recip()?;
                        Some(l?.scaled(scale))
                    }
                    BinaryOperation::Power => {
                        let exponent =
                            PolyForm::from_expression(right)?.as_constant()?;
                        if !exponent.is_integer() {
                            return None;
                        }

                        if exponent.is_negative() {
                            // a constant base still folds; anything else
                            // leaves the ring
                            let base = l?.as_constant()?;
                            let e = i64::try_from(exponent.numerator()).ok()?;
                            return base
                                .pow_int(e)
                                .map(PolyForm::constant);
                        }

                        let e = u32::try_from(exponent.numerator()).ok()?;
                        Some(l?.pow(e))
                    }
                }
            }
            Expression::FunctionCall { .. } => {
                // sqrt of a perfect square folds to a rational; everything
                // else is not polynomial
                match ops::fold_constants(expr) {
                    Expression::Number(n) => Some(PolyForm::constant(n)),
                    _ => None,
                }
            }
        }
    }

    fn add_term(&mut self, monomial: Monomial, coefficient: Rational) {
        if coefficient.is_zero() {
            return;
        }

        let entry = self
            .terms
            .entry(monomial)
            .or_insert_with(Rational::zero);
        *entry = *entry + coefficient;

        // re-establish the no-zero-coefficients invariant
        self.terms.retain(|_, c| !c.is_zero());
    }

    pub fn add(&self, other: &PolyForm) -> PolyForm {
        let mut out = self.clone();
        for (monomial, coefficient) in &other.terms {
            out.add_term(monomial.clone(), *coefficient);
        }
        out
    }

    pub fn negated(&self) -> PolyForm {
        self.scaled(-Rational::one())
    }

    pub fn scaled(&self, factor: Rational) -> PolyForm {
        if factor.is_zero() {
            return PolyForm::zero();
        }

        PolyForm {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), *c * factor))
                .collect(),
        }
    }

    pub fn mul(&self, other: &PolyForm) -> PolyForm {
        let mut out = PolyForm::zero();

        for (m1, c1) in &self.terms {
            for (m2, c2) in &other.terms {
                let mut monomial = m1.clone();
                for (name, exp) in m2 {
                    *monomial.entry(name.clone()).or_insert(0) += exp;
                }
                out.add_term(monomial, *c1 * *c2);
            }
        }

        out
    }

    pub fn pow(&self, exponent: u32) -> PolyForm {
        let mut out = PolyForm::constant(Rational::one());
        for _ in 0..exponent {
            out = out.mul(self);
        }
        out
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// The constant value, if this polynomial has no variables.
    pub fn as_constant(&self) -> Option<Rational> {
        if self.terms.is_empty() {
            return Some(Rational::zero());
        }
        if self.terms.len() == 1 {
            if let Some(coefficient) = self.terms.get(&Monomial::new()) {
                return Some(*coefficient);
            }
        }
        None
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        self.terms
            .keys()
            .flat_map(|m| m.keys())
            .map(|name| Variable::new(name.as_str()))
            .collect()
    }

    /// The degree in one variable, with every other variable treated as an
    /// independent constant.
    pub fn degree_in(&self, variable: &Variable) -> u32 {
        self.terms
            .keys()
            .filter_map(|m| m.get(variable.name()))
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Coefficients in `variable`, ascending by power. The coefficients are
    /// themselves polynomials in the remaining variables.
    pub fn coefficients_in(&self, variable: &Variable) -> Vec<PolyForm> {
        let degree = self.degree_in(variable) as usize;
        let mut coefficients = vec![PolyForm::zero(); degree + 1];

        for (monomial, coefficient) in &self.terms {
            let mut rest = monomial.clone();
            let power = rest.remove(variable.name()).unwrap_or(0) as usize;
            coefficients[power].add_term(rest, *coefficient);
        }

        coefficients
    }

    /// Rebuild a canonical expression tree: terms ordered by descending
    /// total degree, then by monomial.
    pub fn to_expression(&self) -> Expression {
        if self.terms.is_empty() {
            return Expression::int(0);
        }

        let mut ordered: Vec<(&Monomial, &Rational)> = self.terms.iter().collect();
        ordered.sort_by(|(m1, _), (m2, _)| {
            let d1: u32 = m1.values().sum();
            let d2: u32 = m2.values().sum();
            d2.cmp(&d1).then_with(|| m1.cmp(m2))
        });

        let mut out: Option<Expression> = None;
        for (monomial, coefficient) in ordered {
            let body = term_expression(monomial, coefficient.abs());

            out = Some(match out {
                None => {
                    if coefficient.is_negative() {
                        -body
                    } else {
                        body
                    }
                }
                Some(acc) => {
                    if coefficient.is_negative() {
                        acc - body
                    } else {
                        acc + body
                    }
                }
            });
        }

        match out {
            Some(expr) => expr,
            None => Expression::int(0),
        }
    }
}

fn term_expression(monomial: &Monomial, coefficient: Rational) -> Expression {
    let mut factors: Vec<Expression> = Vec::new();

    if !coefficient.is_one() || monomial.is_empty() {
        factors.push(Expression::number(coefficient));
    }

    for (name, exponent) in monomial {
        let var = Expression::variable(name.as_str());
        factors.push(if *exponent == 1 {
            var
        } else {
            Expression::power(var, Expression::int(*exponent as i128))
        });
    }

    let mut iter = factors.into_iter();
    let first = iter.next().unwrap_or_else(|| Expression::int(1));
    iter.fold(first, |acc, f| acc * f)
}

/// A dense univariate polynomial, coefficients ascending by power.
///
/// Invariant: the leading coefficient is non-zero (the zero polynomial is
/// the empty coefficient list).
#[derive(Debug, Clone, PartialEq)]
pub struct UniPoly {
    coefficients: Vec<Rational>,
}

impl UniPoly {
    pub fn new(mut coefficients: Vec<Rational>) -> Self {
        while coefficients.last().map(|c| c.is_zero()).unwrap_or(false) {
            coefficients.pop();
        }
        UniPoly { coefficients }
    }

    /// Extract the univariate view, or `None` when other variables appear.
    pub fn from_form(form: &PolyForm, variable: &Variable) -> Option<UniPoly> {
        let coefficients = form
            .coefficients_in(variable)
            .into_iter()
            .map(|c| c.as_constant())
            .collect::<Option<Vec<_>>>()?;

        Some(UniPoly::new(coefficients))
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn is_zero(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn coefficient(&self, power: usize) -> Rational {
        self.coefficients
            .get(power)
            .copied()
            .unwrap_or_else(Rational::zero)
    }

    pub fn leading(&self) -> Rational {
        self.coefficients
            .last()
            .copied()
            .unwrap_or_else(Rational::zero)
    }

    pub fn evaluate(&self, at: Rational) -> Rational {
        // Horner's scheme
        self.coefficients
            .iter()
            .rev()
            .fold(Rational::zero(), |acc, c| acc * at + *c)
    }

    /// Divide out `(x - root)` by synthetic division.
    ///
    /// The caller guarantees `root` really is a root; the remainder is
    /// discarded.
    pub fn deflate(&self, root: Rational) -> UniPoly {
        debug_assert!(self.evaluate(root).is_zero());

        let mut quotient = Vec::with_capacity(self.degree());
        let mut carry = Rational::zero();

        for c in self.coefficients.iter().rev() {
            carry = carry * root + *c;
            quotient.push(carry);
        }

        // the last carry is the remainder
        quotient.pop();
        quotient.reverse();
        UniPoly::new(quotient)
    }

    /// Every rational root, repeated per multiplicity, smallest first,
    /// along with the fully deflated remainder polynomial.
    pub fn rational_roots(&self) -> (Vec<Rational>, UniPoly) {
        let mut roots = Vec::new();
        let mut rest = self.clone();

        while rest.degree() >= 1 {
            match rest.first_rational_root() {
                Some(root) => {
                    roots.push(root);
                    rest = rest.deflate(root);
                }
                None => break,
            }
        }

        roots.sort();
        (roots, rest)
    }

    fn first_rational_root(&self) -> Option<Rational> {
        if self.degree() == 0 {
            return None;
        }

        // x = 0 first, so the constant term below is non-zero
        if self.coefficient(0).is_zero() {
            return Some(Rational::zero());
        }

        let scaled = self.scaled_integer_coefficients();
        let constant = scaled.first().copied()?;
        let leading = scaled.last().copied()?;

        // rational root theorem: every rational root is p/q with
        // p | constant and q | leading
        for p in divisors(constant) {
            for q in divisors(leading) {
                for candidate in
                    [Rational::new(p, q), Rational::new(-p, q)].iter()
                {
                    if self.evaluate(*candidate).is_zero() {
                        return Some(*candidate);
                    }
                }
            }
        }

        None
    }

    /// Rebuild the multivariate form over a single variable, e.g. for
    /// canonical rendering.
    pub fn to_form(&self, variable: &Variable) -> PolyForm {
        let mut form = PolyForm::zero();

        for (power, coefficient) in self.coefficients.iter().enumerate() {
            let mut monomial = Monomial::new();
            if power > 0 {
                monomial.insert(variable.name().into(), power as u32);
            }
            form.add_term(monomial, *coefficient);
        }

        form
    }

    /// The same polynomial scaled to integer coefficients.
    fn scaled_integer_coefficients(&self) -> Vec<i128> {
        let lcm = self
            .coefficients
            .iter()
            .fold(1i128, |acc, c| lcm(acc, c.denominator()));

        self.coefficients
            .iter()
            .map(|c| c.numerator() * (lcm / c.denominator()))
            .collect()
    }
}

pub(crate) fn gcd(mut a: i128, mut b: i128) -> i128 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

pub(crate) fn lcm(a: i128, b: i128) -> i128 {
    if a == 0 || b == 0 {
        0
    } else {
        (a / gcd(a, b)) * b
    }
}

/// The positive divisors of `n`.
fn divisors(n: i128) -> Vec<i128> {
    let n = n.abs();
    let mut small = Vec::new();
    let mut large = Vec::new();

    let mut d = 1;
    while d * d <= n {
        if n % d == 0 {
            small.push(d);
            if d * d != n {
                large.push(n / d);
            }
        }
        d += 1;
    }

    large.reverse();
    small.extend(large);
    small
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form(src: &str) -> PolyForm {
        let expr: Expression = src.parse().unwrap();
        PolyForm::from_expression(&expr).unwrap()
    }

    #[test]
    fn normal_form_cancels_terms() {
        let got = form("(x + 1)*(x - 1) - x^2 + 1");

        assert!(got.is_zero());
    }

    #[test]
    fn canonical_rendering() {
        let inputs = vec![
            ("x^2 - 5*x + 6", "x^2 - 5*x + 6"),
            ("6 - 5*x + x^2", "x^2 - 5*x + 6"),
            ("(x - 2)*(x - 3)", "x^2 - 5*x + 6"),
            ("2*x + 3 - 11", "2*x - 8"),
            ("x + y - 1", "x + y - 1"),
            ("-x + 1", "-x + 1"),
            ("x/2", "(1/2)*x"),
            ("0", "0"),
        ];

        for (src, should_be) in inputs {
            assert_eq!(form(src).to_expression().to_string(), should_be);
        }
    }

    #[test]
    fn non_polynomial_expressions_are_rejected() {
        for src in &["1/x", "x^y", "sqrt(x)", "x^(1/2)", "2^x"] {
            let expr: Expression = src.parse().unwrap();
            assert_eq!(
                PolyForm::from_expression(&expr),
                None,
                "{} should not be polynomial",
                src
            );
        }
    }

    #[test]
    fn constant_powers_still_fold() {
        assert_eq!(
            form("2^3").as_constant(),
            Some(Rational::int(8))
        );
        assert_eq!(
            form("sqrt(4)*x").degree_in(&Variable::new("x")),
            1
        );
    }

    #[test]
    fn degree_extraction_with_other_variables() {
        let x = Variable::new("x");
        let got = form("x^2*y + x + y^5");

        assert_eq!(got.degree_in(&x), 2);
        assert_eq!(got.degree_in(&Variable::new("y")), 5);
    }

    #[test]
    fn univariate_view() {
        let x = Variable::new("x");
        let poly = UniPoly::from_form(&form("x^2 - 5*x + 6"), &x).unwrap();

        assert_eq!(poly.degree(), 2);
        assert_eq!(poly.coefficient(0), Rational::int(6));
        assert_eq!(poly.coefficient(1), Rational::int(-5));
        assert_eq!(poly.coefficient(2), Rational::int(1));

        // mixed variables have no univariate view
        assert_eq!(UniPoly::from_form(&form("x + y"), &x), None);
    }

    #[test]
    fn horner_evaluation() {
        let x = Variable::new("x");
        let poly = UniPoly::from_form(&form("x^2 - 5*x + 6"), &x).unwrap();

        assert!(poly.evaluate(Rational::int(2)).is_zero());
        assert!(poly.evaluate(Rational::int(3)).is_zero());
        assert_eq!(poly.evaluate(Rational::int(0)), Rational::int(6));
    }

    #[test]
    fn rational_root_search() {
        let x = Variable::new("x");

        let poly = UniPoly::from_form(&form("x^2 - 5*x + 6"), &x).unwrap();
        let (roots, rest) = poly.rational_roots();
        assert_eq!(roots, vec![Rational::int(2), Rational::int(3)]);
        assert_eq!(rest.degree(), 0);

        // 2x^2 - 3x + 1 = (2x - 1)(x - 1)
        let poly = UniPoly::from_form(&form("2*x^2 - 3*x + 1"), &x).unwrap();
        let (roots, _) = poly.rational_roots();
        assert_eq!(roots, vec![Rational::new(1, 2), Rational::int(1)]);

        // x^2 + 1 has no rational roots
        let poly = UniPoly::from_form(&form("x^2 + 1"), &x).unwrap();
        let (roots, rest) = poly.rational_roots();
        assert!(roots.is_empty());
        assert_eq!(rest.degree(), 2);

        // repeated roots come back with multiplicity
        let poly =
            UniPoly::from_form(&form("x^2 - 4*x + 4"), &x).unwrap();
        let (roots, _) = poly.rational_roots();
        assert_eq!(roots, vec![Rational::int(2), Rational::int(2)]);
    }

    #[test]
    fn deflation() {
        let x = Variable::new("x");
        let poly = UniPoly::from_form(&form("x^3 - 6*x^2 + 11*x - 6"), &x).unwrap();

        let deflated = poly.deflate(Rational::int(1));

        // (x-1)(x-2)(x-3) / (x-1) = x^2 - 5x + 6
        assert_eq!(
            deflated,
            UniPoly::new(vec![
                Rational::int(6),
                Rational::int(-5),
                Rational::int(1),
            ])
        );
    }
}
