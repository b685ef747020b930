//! The solver adapter: exact root finding for the principal variable,
//! normalized into a uniform solution-set shape.

use crate::equation::Equation;
use crate::expr::{Expression, Variable};
use crate::poly::{PolyForm, UniPoly};
use crate::rational::Rational;
use std::fmt::{self, Display, Formatter};
use tracing::debug;

/// One entry of a solution set: `variable = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub variable: Variable,
    pub value: Expression,
}

impl Solution {
    pub fn new(variable: Variable, value: Expression) -> Self {
        Solution { variable, value }
    }

    /// `x=2`, the compact form used inside step text.
    pub fn compact(&self) -> String {
        format!("{}={}", self.variable, self.value)
    }
}

impl Display for Solution {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.variable, self.value)
    }
}

/// The heterogeneous shapes the root finder produces: a bare value, or a
/// full assignment when the finder already knows the variable.
#[derive(Debug, Clone, PartialEq)]
enum Root {
    Value(Expression),
    Assignment(Variable, Expression),
}

/// Solve the equation for the principal variable.
///
/// No principal candidate or no closed-form roots both yield an empty
/// set; absence of solutions is a domain outcome, not an error.
pub fn solve_equation(
    equation: &Equation,
    principal: Option<&Variable>,
) -> Vec<Solution> {
    let principal = match principal {
        Some(v) => v,
        None => return Vec::new(),
    };

    let roots = find_roots(equation, principal);
    debug!(
        variable = principal.name(),
        count = roots.len(),
        "solved for principal variable"
    );

    // normalize bare values into assignments on the principal variable
    roots
        .into_iter()
        .map(|root| match root {
            Root::Value(value) => Solution::new(principal.clone(), value),
            Root::Assignment(variable, value) => Solution::new(variable, value),
        })
        .collect()
}

fn find_roots(equation: &Equation, variable: &Variable) -> Vec<Root> {
    let form = match PolyForm::from_expression(&equation.zero_form()) {
        Some(form) => form,
        None => return Vec::new(),
    };

    match form.degree_in(variable) {
        0 => Vec::new(),
        1 => solve_linear(&form, variable),
        _ => match UniPoly::from_form(&form, variable) {
            Some(poly) => polynomial_roots(&poly)
                .unwrap_or_default()
                .into_iter()
                .map(Root::Value)
                .collect(),
            // symbolic coefficients on a higher-degree equation are out of
            // reach for this engine
            None => Vec::new(),
        },
    }
}

/// `c1*x + c0 = 0` with possibly-symbolic coefficients: `x = -c0/c1`.
fn solve_linear(form: &PolyForm, variable: &Variable) -> Vec<Root> {
    let coefficients = form.coefficients_in(variable);
    let c0 = &coefficients[0];
    let c1 = &coefficients[1];

    let value = match c1.as_constant() {
        Some(k) => match k.recip() {
            Some(inv) => c0.scaled(-inv).to_expression(),
            None => return Vec::new(),
        },
        None => crate::ops::fold_constants(
            &(c0.negated().to_expression() / c1.to_expression()),
        ),
    };

    vec![Root::Assignment(variable.clone(), value)]
}

/// All real roots of a univariate polynomial, or `None` when the engine
/// cannot produce the complete set in closed form.
fn polynomial_roots(poly: &UniPoly) -> Option<Vec<Expression>> {
    let values = match poly.degree() {
        0 => Vec::new(),
        1 => {
            let root = (-poly.coefficient(0)).checked_div(&poly.leading())?;
            vec![Expression::number(root)]
        }
        2 => quadratic_roots(
            poly.leading(),
            poly.coefficient(1),
            poly.coefficient(0),
        ),
        _ => {
            // peel off rational roots; whatever remains must be solvable
            // by the quadratic formula for the set to be complete
            let (rational, rest) = poly.rational_roots();
            let mut values: Vec<Expression> =
                rational.into_iter().map(Expression::number).collect();

            match rest.degree() {
                0 => {}
                2 => values.extend(quadratic_roots(
                    rest.leading(),
                    rest.coefficient(1),
                    rest.coefficient(0),
                )),
                _ => return None,
            }

            values
        }
    };

    Some(dedupe(values))
}

/// Exact roots of `a*x^2 + b*x + c = 0`. Negative discriminants have no
/// real roots and yield an empty set.
fn quadratic_roots(a: Rational, b: Rational, c: Rational) -> Vec<Expression> {
    let two_a = Rational::int(2) * a;
    let discriminant = b * b - Rational::int(4) * a * c;

    if discriminant.is_negative() {
        return Vec::new();
    }

    if discriminant.is_zero() {
        return match (-b).checked_div(&two_a) {
            Some(root) => vec![Expression::number(root)],
            None => Vec::new(),
        };
    }

    match discriminant.sqrt_exact() {
        Some(s) => {
            let mut roots = [
                (-b - s).checked_div(&two_a),
                (-b + s).checked_div(&two_a),
            ]
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<_>>();
            roots.sort();
            roots.into_iter().map(Expression::number).collect()
        }
        None => vec![
            surd_root(b, discriminant, two_a, false),
            surd_root(b, discriminant, two_a, true),
        ],
    }
}

/// `(-b ± sqrt(disc)) / 2a` kept symbolic when the discriminant has no
/// rational square root.
fn surd_root(
    b: Rational,
    discriminant: Rational,
    two_a: Rational,
    plus: bool,
) -> Expression {
    let s = Expression::sqrt(Expression::number(discriminant));

    if b.is_zero() {
        let magnitude = if two_a.is_one() {
            s
        } else {
            s / Expression::number(two_a)
        };
        return if plus { magnitude } else { -magnitude };
    }

    let numerator = if plus {
        Expression::number(-b) + s
    } else {
        Expression::number(-b) - s
    };

    if two_a.is_one() {
        numerator
    } else {
        numerator / Expression::number(two_a)
    }
}

fn dedupe(values: Vec<Expression>) -> Vec<Expression> {
    let mut out: Vec<Expression> = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
