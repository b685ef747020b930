use crate::expr::{Expression, Variable};
use crate::parse::ParseError;
use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// A single algebraic equation, `lhs = rhs`.
///
/// Both sides are kept as parsed: the validator substitutes candidate
/// solutions into the *original* sides, never a rearranged form.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    lhs: Expression,
    rhs: Expression,
}

impl Equation {
    pub fn new(lhs: Expression, rhs: Expression) -> Self {
        Equation { lhs, rhs }
    }

    pub fn lhs(&self) -> &Expression {
        &self.lhs
    }

    pub fn rhs(&self) -> &Expression {
        &self.rhs
    }

    /// `lhs - rhs`, whose roots are the equation's solutions.
    pub fn zero_form(&self) -> Expression {
        self.lhs.clone() - self.rhs.clone()
    }

    /// The free variables of both sides, in lexicographic order.
    ///
    /// The first entry is the principal-variable candidate: a documented
    /// deterministic rule, not an artifact of set iteration order.
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut out = self.lhs.variables();
        out.extend(self.rhs.variables());
        out
    }

    pub fn principal_variable(&self) -> Option<Variable> {
        self.variables().into_iter().next()
    }
}

impl FromStr for Equation {
    type Err = ParseError;

    /// Split on the first `=`; text without one is read as `<text> = 0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.find('=') {
            Some(index) => {
                let (left, right) = s.split_at(index);
                let right = &right[1..];
                Ok(Equation::new(left.parse()?, right.parse()?))
            }
            None => Ok(Equation::new(s.parse()?, Expression::int(0))),
        }
    }
}

impl Display for Equation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}
