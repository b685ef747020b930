//! [`Expression`] transformations.

use crate::expr::{BinaryOperation, Expression, Variable};
use crate::rational::Rational;
use std::convert::TryFrom;

/// Replace all references to a [`Variable`] with an [`Expression`].
pub fn substitute(
    expression: &Expression,
    variable: &Variable,
    value: &Expression,
) -> Expression {
    match expression {
        Expression::Variable(v) => {
            if v == variable {
                value.clone()
            } else {
                Expression::Variable(v.clone())
            }
        }
        Expression::Number(n) => Expression::Number(*n),
        Expression::Binary { left, right, op } => {
            let left = substitute(left, variable, value);
            let right = substitute(right, variable, value);
            Expression::binary(left, right, *op)
        }
        Expression::Negate(inner) => -substitute(inner, variable, value),
        Expression::FunctionCall { function, argument } => {
            Expression::FunctionCall {
                function: function.clone(),
                argument: Box::new(substitute(argument, variable, value)),
            }
        }
    }
}

/// Simplify an expression by evaluating constant sub-trees exactly.
///
/// `sqrt` folds only when its argument has an exact rational root;
/// `sqrt(13)` stays symbolic.
pub fn fold_constants(expr: &Expression) -> Expression {
    match expr {
        Expression::Binary { left, right, op } => fold_binary_op(left, right, *op),
        Expression::Negate(inner) => match fold_constants(inner) {
            Expression::Number(n) => Expression::Number(-n),
            // double negative
            Expression::Negate(inner) => *inner,
            other => -other,
        },
        Expression::FunctionCall { function, argument } => {
            let argument = fold_constants(argument);

            if function == "sqrt" {
                if let Expression::Number(n) = &argument {
                    if let Some(root) = n.sqrt_exact() {
                        return Expression::Number(root);
                    }
                }
            }

            Expression::FunctionCall {
                function: function.clone(),
                argument: Box::new(argument),
            }
        }
        _ => expr.clone(),
    }
}

fn fold_binary_op(
    left: &Expression,
    right: &Expression,
    op: BinaryOperation,
) -> Expression {
    let left = fold_constants(left);
    let right = fold_constants(right);

    match (left, right, op) {
        // identities on a repeated variable
        (
            Expression::Variable(l),
            Expression::Variable(r),
            BinaryOperation::Plus,
        ) if l == r => Expression::int(2) * Expression::Variable(r),
        (
            Expression::Variable(l),
            Expression::Variable(r),
            BinaryOperation::Minus,
        ) if l == r => Expression::int(0),
        (
            Expression::Variable(l),
            Expression::Variable(r),
            BinaryOperation::Divide,
        ) if l == r => Expression::int(1),

        // x + 0 = x
        (Expression::Number(l), right, BinaryOperation::Plus) if l.is_zero() => {
            right
        }
        (left, Expression::Number(r), BinaryOperation::Plus) if r.is_zero() => {
            left
        }

        // 0 * x = 0
        (Expression::Number(l), _, BinaryOperation::Times) if l.is_zero() => {
            Expression::int(0)
        }
        (_, Expression::Number(r), BinaryOperation::Times) if r.is_zero() => {
            Expression::int(0)
        }

        // 1 * x = x
        (Expression::Number(l), right, BinaryOperation::Times) if l.is_one() => {
            right
        }
        (left, Expression::Number(r), BinaryOperation::Times) if r.is_one() => {
            left
        }

        // 0 / x = 0
        (Expression::Number(l), _, BinaryOperation::Divide) if l.is_zero() => {
            Expression::int(0)
        }

        // x / 1 = x
        (left, Expression::Number(r), BinaryOperation::Divide) if r.is_one() => {
            left
        }

        // 0 - x = -x
        (Expression::Number(l), right, BinaryOperation::Minus) if l.is_zero() => {
            fold_constants(&-right)
        }

        // x - 0 = x
        (left, Expression::Number(r), BinaryOperation::Minus) if r.is_zero() => {
            left
        }

        // x^1 = x, x^0 = 1
        (left, Expression::Number(r), BinaryOperation::Power) if r.is_one() => {
            left
        }
        (_, Expression::Number(r), BinaryOperation::Power) if r.is_zero() => {
            Expression::int(1)
        }

        // constant * (constant * x) collapses
        (
            Expression::Number(a),
            Expression::Binary {
                left,
                right,
                op: BinaryOperation::Times,
            },
            BinaryOperation::Times,
        ) if left.is_number() || right.is_number() => {
            let (b, rest) = split_constant_factor(*left, *right);
            Expression::Number(a * b) * rest
        }
        (
            Expression::Binary {
                left,
                right,
                op: BinaryOperation::Times,
            },
            Expression::Number(a),
            BinaryOperation::Times,
        ) if left.is_number() || right.is_number() => {
            let (b, rest) = split_constant_factor(*left, *right);
            Expression::Number(a * b) * rest
        }

        // evaluate in place
        (Expression::Number(l), Expression::Number(r), op) => {
            fold_numbers(l, r, op)
        }

        // oh well, we tried
        (left, right, op) => Expression::binary(left, right, op),
    }
}

fn fold_numbers(l: Rational, r: Rational, op: BinaryOperation) -> Expression {
    match op {
        BinaryOperation::Plus => Expression::Number(l + r),
        BinaryOperation::Minus => Expression::Number(l - r),
        BinaryOperation::Times => Expression::Number(l * r),
        BinaryOperation::Divide => match l.checked_div(&r) {
            Some(value) => Expression::Number(value),
            // division by zero stays symbolic and fails downstream
            None => Expression::Number(l) / Expression::Number(r),
        },
        BinaryOperation::Power => {
            let exponent = if r.is_integer() {
                i64::try_from(r.numerator()).ok()
            } else {
                None
            };

            match exponent.and_then(|e| l.pow_int(e)) {
                Some(value) => Expression::Number(value),
                None => Expression::power(
                    Expression::Number(l),
                    Expression::Number(r),
                ),
            }
        }
    }
}

fn split_constant_factor(
    left: Expression,
    right: Expression,
) -> (Rational, Expression) {
    match (left, right) {
        (Expression::Number(n), rest) => (n, rest),
        (rest, Expression::Number(n)) => (n, rest),
        _ => unreachable!("guarded by is_number"),
    }
}

impl Expression {
    fn is_number(&self) -> bool {
        matches!(self, Expression::Number(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn constant_fold_simple_arithmetic() {
        let inputs = vec![
            ("1", "1"),
            ("1 + 2", "3"),
            ("1 - 3", "-2"),
            ("2 * 3", "6"),
            ("4 / 2", "2"),
            ("1/2 + 1/3", "5/6"),
            ("2^3", "8"),
            ("2^-2", "1/4"),
            ("sqrt(4)", "2"),
            ("sqrt(9/4)", "3/2"),
            ("-(1 + 2)", "-3"),
            ("0 * x", "0"),
            ("x - x", "0"),
            ("x/x", "1"),
        ];

        for (src, should_be) in inputs {
            let expr: Expression = src.parse().unwrap();
            let should_be: Expression = should_be.parse().unwrap();

            let got = fold_constants(&expr);
            let should_be = fold_constants(&should_be);

            assert_eq!(got, should_be, "{} should fold to {}", src, should_be);
        }
    }

    #[test]
    fn constant_folding_leaves_unknowns_unevaluated() {
        let inputs = vec![
            ("x", "x"),
            ("sqrt(13)", "sqrt(13)"),
            ("x + 5", "x + 5"),
            ("0 + x", "x"),
            ("x + 0", "x"),
            ("1 * x", "x"),
            ("x * 1", "x"),
            ("x - 0", "x"),
            ("0 - x", "-x"),
            ("x / 1", "x"),
            ("x^1", "x"),
            ("x^0", "1"),
            ("--x", "x"),
            ("2 * x * 3", "6*x"),
            ("x + x", "2*x"),
        ];

        for (src, should_be) in inputs {
            let expr: Expression = src.parse().unwrap();
            let should_be: Expression = should_be.parse().unwrap();

            let got = fold_constants(&expr);

            assert_eq!(got, should_be, "{} != {}", got, should_be);
        }
    }

    #[test]
    fn division_by_zero_stays_symbolic() {
        let expr: Expression = "1/0".parse().unwrap();

        let got = fold_constants(&expr);

        assert_eq!(got.to_string(), "1/0");
    }

    #[test]
    fn basic_substitutions() {
        let x = Variable::new("x");
        let inputs = vec![
            ("1 + 2", "3", "1 + 2"),
            ("x", "5", "5"),
            ("y", "5", "y"),
            ("x + 5", "5", "5 + 5"),
            ("-x", "5", "-5"),
            ("sqrt(x)", "y + y", "sqrt(y + y)"),
        ];

        for (src, new_value, should_be) in inputs {
            let original: Expression = src.parse().unwrap();
            let new_value: Expression = new_value.parse().unwrap();
            let should_be: Expression = should_be.parse().unwrap();

            let got = substitute(&original, &x, &new_value);

            assert_eq!(got, should_be, "{} != {}", got, should_be);
        }
    }
}
