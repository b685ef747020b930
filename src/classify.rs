use crate::equation::Equation;
use crate::expr::Variable;
use crate::poly::PolyForm;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// The structural class of an equation, derived from the polynomial
/// degree of its zero-form in the principal variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemType {
    Linear,
    Quadratic,
    Cubic,
    /// No detectable variable, degree above three, or not polynomial at
    /// all in the principal variable.
    Generic,
}

impl Display for ProblemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProblemType::Linear => "linear",
            ProblemType::Quadratic => "quadratic",
            ProblemType::Cubic => "cubic",
            ProblemType::Generic => "generic",
        };
        write!(f, "{}", name)
    }
}

/// Classify by degree. Degree extraction failure is not an error; it maps
/// to [`ProblemType::Generic`].
pub fn classify(equation: &Equation, principal: &Variable) -> ProblemType {
    let form = match PolyForm::from_expression(&equation.zero_form()) {
        Some(form) => form,
        None => return ProblemType::Generic,
    };

    match form.degree_in(principal) {
        1 => ProblemType::Linear,
        2 => ProblemType::Quadratic,
        3 => ProblemType::Cubic,
        _ => ProblemType::Generic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify_src(src: &str) -> ProblemType {
        let eq: Equation = src.parse().unwrap();
        let principal = eq.principal_variable().unwrap();
        classify(&eq, &principal)
    }

    #[test]
    fn degree_mapping() {
        assert_eq!(classify_src("2*x + 3 = 11"), ProblemType::Linear);
        assert_eq!(classify_src("x^2 - 5*x + 6 = 0"), ProblemType::Quadratic);
        assert_eq!(classify_src("x^3 - 1 = 0"), ProblemType::Cubic);
        assert_eq!(classify_src("x^4 = 1"), ProblemType::Generic);
    }

    #[test]
    fn other_variables_are_independent() {
        // degree in x only; y is just a symbol
        assert_eq!(classify_src("x + y = 1"), ProblemType::Linear);
        assert_eq!(classify_src("x^2 + y^5 = 0"), ProblemType::Quadratic);
    }

    #[test]
    fn non_polynomial_maps_to_generic_without_raising() {
        assert_eq!(classify_src("1/x = 2"), ProblemType::Generic);
        assert_eq!(classify_src("2^x = 8"), ProblemType::Generic);
    }

    #[test]
    fn degree_cancellation_is_seen() {
        // the x^2 terms cancel, leaving a linear equation
        assert_eq!(classify_src("x^2 + x = x^2 + 4"), ProblemType::Linear);
    }

    #[test]
    fn serializes_lowercase() {
        let got = serde_json::to_string(&ProblemType::Quadratic).unwrap();
        assert_eq!(got, "\"quadratic\"");
    }
}
