use crate::parse::{parse, ParseError};
use crate::rational::Rational;
use smol_str::SmolStr;
use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    ops::{Add, Div, Mul, Neg, Sub},
    str::FromStr,
};

/// A named unknown.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    name: SmolStr,
}

impl Variable {
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Variable {
            name: name.as_ref().into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An operation that can be applied to two operands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperation {
    Plus,
    Minus,
    Times,
    Divide,
    Power,
}

/// A symbolic expression tree.
///
/// Expressions are value types; every transformation (substitution,
/// folding, factoring) builds a new tree rather than mutating in place.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Variable(Variable),
    Number(Rational),
    /// An expression involving two operands.
    Binary {
        left: Box<Expression>,
        right: Box<Expression>,
        op: BinaryOperation,
    },
    /// Negate the expression.
    Negate(Box<Expression>),
    /// Invoke a builtin function (e.g. `sqrt` in an irrational root).
    FunctionCall {
        function: SmolStr,
        argument: Box<Expression>,
    },
}

impl Expression {
    pub fn number(value: Rational) -> Self {
        Expression::Number(value)
    }

    pub fn int(n: i128) -> Self {
        Expression::Number(Rational::int(n))
    }

    pub fn variable<S: AsRef<str>>(name: S) -> Self {
        Expression::Variable(Variable::new(name))
    }

    pub fn binary(left: Expression, right: Expression, op: BinaryOperation) -> Self {
        Expression::Binary {
            left: Box::new(left),
            right: Box::new(right),
            op,
        }
    }

    pub fn power(base: Expression, exponent: Expression) -> Self {
        Expression::binary(base, exponent, BinaryOperation::Power)
    }

    pub fn sqrt(argument: Expression) -> Self {
        Expression::FunctionCall {
            function: "sqrt".into(),
            argument: Box::new(argument),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expression::Number(n) if n.is_zero())
    }

    /// The free variables of this expression, in lexicographic order.
    ///
    /// Callers treat the first element as the principal candidate, so the
    /// order has to be deterministic rather than whatever a hash set
    /// happens to yield.
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<Variable>) {
        match self {
            Expression::Variable(v) => {
                out.insert(v.clone());
            }
            Expression::Number(_) => {}
            Expression::Binary { left, right, .. } => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            Expression::Negate(inner) => inner.collect_variables(out),
            Expression::FunctionCall { argument, .. } => {
                argument.collect_variables(out)
            }
        }
    }

    pub fn depends_on(&self, variable: &Variable) -> bool {
        match self {
            Expression::Variable(v) => v == variable,
            Expression::Number(_) => false,
            Expression::Binary { left, right, .. } => {
                left.depends_on(variable) || right.depends_on(variable)
            }
            Expression::Negate(inner) => inner.depends_on(variable),
            Expression::FunctionCall { argument, .. } => {
                argument.depends_on(variable)
            }
        }
    }

    /// Binding strength used when rendering. Higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            Expression::Variable(_) | Expression::FunctionCall { .. } => 4,
            // Negative or fractional literals render with a sign or a
            // slash, so they parenthesize like low-precedence expressions.
            Expression::Number(n) => {
                if n.is_negative() || !n.is_integer() {
                    1
                } else {
                    4
                }
            }
            Expression::Negate(_) => 1,
            Expression::Binary { op, .. } => match op {
                BinaryOperation::Plus | BinaryOperation::Minus => 1,
                BinaryOperation::Times | BinaryOperation::Divide => 2,
                BinaryOperation::Power => 3,
            },
        }
    }
}

// Operator overloads so transformation code can build trees naturally.

impl Add for Expression {
    type Output = Expression;

    fn add(self, rhs: Expression) -> Expression {
        Expression::binary(self, rhs, BinaryOperation::Plus)
    }
}

impl Sub for Expression {
    type Output = Expression;

    fn sub(self, rhs: Expression) -> Expression {
        Expression::binary(self, rhs, BinaryOperation::Minus)
    }
}

impl Mul for Expression {
    type Output = Expression;

    fn mul(self, rhs: Expression) -> Expression {
        Expression::binary(self, rhs, BinaryOperation::Times)
    }
}

impl Div for Expression {
    type Output = Expression;

    fn div(self, rhs: Expression) -> Expression {
        Expression::binary(self, rhs, BinaryOperation::Divide)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        Expression::Negate(Box::new(self))
    }
}

impl FromStr for Expression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Variable(v) => write!(f, "{}", v),
            Expression::Number(n) => write!(f, "{}", n),
            Expression::Binary { left, right, op } => {
                let prec = self.precedence();

                // The right operand of `-`, `/` and the left operand of
                // `^` need parentheses at equal precedence; everything
                // else only below it.
                let left_needs_parens = match op {
                    BinaryOperation::Power => left.precedence() <= prec,
                    _ => left.precedence() < prec,
                };
                let right_needs_parens = match op {
                    BinaryOperation::Minus | BinaryOperation::Divide => {
                        right.precedence() <= prec
                    }
                    _ => right.precedence() < prec,
                };

                write_child(left, left_needs_parens, f)?;

                let op = match op {
                    BinaryOperation::Plus => " + ",
                    BinaryOperation::Minus => " - ",
                    BinaryOperation::Times => "*",
                    BinaryOperation::Divide => "/",
                    BinaryOperation::Power => "^",
                };
                write!(f, "{}", op)?;

                write_child(right, right_needs_parens, f)
            }
            Expression::Negate(inner) => {
                write!(f, "-")?;
                write_child(inner, inner.precedence() <= 1, f)
            }
            Expression::FunctionCall { function, argument } => {
                write!(f, "{}({})", function, argument)
            }
        }
    }
}

fn write_child(
    expr: &Expression,
    parenthesize: bool,
    f: &mut Formatter<'_>,
) -> fmt::Result {
    if parenthesize {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}
