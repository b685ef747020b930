//! Factoring the zero-form of an equation.
//!
//! Factoring never fails: when no factorization improves on the
//! simplified zero-form, the original text comes back with
//! `changed = false`.

use crate::equation::Equation;
use crate::expr::{Expression, Variable};
use crate::ops;
use crate::poly::{PolyForm, UniPoly};
use crate::rational::Rational;
use tracing::debug;

/// The best available rendering of `lhs - rhs = 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct FactoredForm {
    /// `"(x - 2)*(x - 3) = 0"` style text.
    pub text: String,
    /// `false` when factoring did not alter the simplified zero-form.
    pub changed: bool,
}

/// Simplify `lhs - rhs` and try to factor it over the rationals.
pub fn factor(equation: &Equation) -> FactoredForm {
    let zero_form = equation.zero_form();

    let form = match PolyForm::from_expression(&zero_form) {
        Some(form) => form,
        // not polynomial; folding constants is the best simplification
        // available, and there is nothing to factor
        None => {
            return FactoredForm {
                text: zero_text(&ops::fold_constants(&zero_form)),
                changed: false,
            }
        }
    };

    let simplified = form.to_expression().to_string();

    let variables = form.variables();
    let factored = if variables.len() == 1 {
        let variable = variables
            .iter()
            .next()
            .cloned()
            .unwrap_or_else(|| Variable::new("x"));
        UniPoly::from_form(&form, &variable)
            .and_then(|poly| factor_univariate(&poly, &variable))
    } else {
        // multivariate factoring is beyond this engine
        None
    };

    match factored {
        Some(expr) => {
            let text = expr.to_string();
            let changed = text != simplified;
            debug!(%changed, "factored zero-form");
            FactoredForm {
                text: format!("{} = 0", text),
                changed,
            }
        }
        None => FactoredForm {
            text: format!("{} = 0", simplified),
            changed: false,
        },
    }
}

fn zero_text(expr: &Expression) -> String {
    format!("{} = 0", expr)
}

/// Split off every rational root as an integer-coefficient linear factor,
/// the way `(2x - 1)*(x - 1)` factors `2x^2 - 3x + 1`.
fn factor_univariate(poly: &UniPoly, variable: &Variable) -> Option<Expression> {
    if poly.degree() < 1 {
        return None;
    }

    let (roots, rest) = poly.rational_roots();
    if roots.is_empty() {
        return None;
    }

    // (x - p/q) becomes (q*x - p); the q's divide out of the content below
    let mut denominators = Rational::one();
    let mut factors: Vec<Expression> = Vec::new();

    let mut index = 0;
    while index < roots.len() {
        let root = roots[index];
        let multiplicity = roots[index..].iter().take_while(|r| **r == root).count();
        index += multiplicity;

        let q = Rational::int(root.denominator());
        let p = Rational::int(root.numerator());
        denominators = denominators * q.pow_int(multiplicity as i64)?;

        let linear = UniPoly::new(vec![-p, q]).to_form(variable).to_expression();
        factors.push(if multiplicity == 1 {
            linear
        } else {
            Expression::power(linear, Expression::int(multiplicity as i128))
        });
    }

    let scalar = if rest.degree() == 0 {
        rest.coefficient(0).checked_div(&denominators)?
    } else {
        let inverse = denominators.recip()?;
        let scaled: Vec<Rational> = (0..=rest.degree())
            .map(|power| rest.coefficient(power) * inverse)
            .collect();
        let content = rational_content(&scaled);
        let content_inverse = content.recip()?;
        let primitive: Vec<Rational> =
            scaled.iter().map(|c| *c * content_inverse).collect();
        factors.push(UniPoly::new(primitive).to_form(variable).to_expression());
        content
    };

    let mut iter = factors.into_iter();
    let product = iter.next()?;
    let product = iter.fold(product, |acc, f| acc * f);

    Some(apply_scalar(scalar, product))
}

fn apply_scalar(scalar: Rational, product: Expression) -> Expression {
    if scalar.is_one() {
        product
    } else if (-scalar).is_one() {
        -product
    } else if scalar.is_negative() {
        -(Expression::number(scalar.abs()) * product)
    } else {
        Expression::number(scalar) * product
    }
}

/// Rational content of a coefficient list, signed so dividing it out
/// leaves a positive leading coefficient.
fn rational_content(coefficients: &[Rational]) -> Rational {
    let mut numerators = 0i128;
    let mut denominators = 1i128;
    for c in coefficients {
        numerators = crate::poly::gcd(numerators, c.numerator());
        denominators = crate::poly::lcm(denominators, c.denominator());
    }
    if numerators == 0 {
        return Rational::one();
    }
    let content = Rational::new(numerators, denominators);
    match coefficients.last() {
        Some(leading) if leading.is_negative() => -content,
        _ => content,
    }
}
