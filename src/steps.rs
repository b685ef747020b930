//! Narrated worked-solution steps.
//!
//! Each step carries the state of the equation before and after a rule
//! fires, plus a one-sentence narration. Factored quadratics get the
//! full three-step treatment; everything else collapses into a single
//! "symbolic resolution" step so the caller always receives at least
//! one step.

use serde::Serialize;

use crate::classify::ProblemType;
use crate::factor::FactoredForm;
use crate::solve::Solution;

/// Text reported when the engine found no closed-form roots.
pub const NO_SOLUTION_TEXT: &str = "no closed-form solution found";

/// One entry in a worked solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    /// 1-based position within the walkthrough.
    pub index: usize,
    pub before: String,
    pub after: String,
    /// Short name of the rule applied, e.g. `"zero-product property"`.
    pub rule: String,
    /// Human narration of what the rule did.
    pub narration: String,
}

impl Step {
    fn new(index: usize, before: &str, after: &str, rule: &str, narration: String) -> Self {
        Step {
            index,
            before: before.to_string(),
            after: after.to_string(),
            rule: rule.to_string(),
            narration,
        }
    }
}

/// Build the walkthrough for a solved equation.
///
/// `canonical` is the simplified equation text the earlier stages agreed
/// on, and `factored` is the output of the factoring pass over the same
/// equation.
pub fn synthesize(
    problem_type: ProblemType,
    canonical: &str,
    solutions: &[Solution],
    factored: &FactoredForm,
) -> Vec<Step> {
    match problem_type {
        ProblemType::Quadratic if factored.changed && !solutions.is_empty() => {
            quadratic_walkthrough(canonical, solutions, factored)
        }
        ProblemType::Linear
        | ProblemType::Quadratic
        | ProblemType::Cubic
        | ProblemType::Generic => vec![resolution_step(1, canonical, solutions)],
    }
}

/// Factor, apply the zero-product property, then isolate the variable.
fn quadratic_walkthrough(
    canonical: &str,
    solutions: &[Solution],
    factored: &FactoredForm,
) -> Vec<Step> {
    let assignments = solutions
        .iter()
        .map(Solution::compact)
        .collect::<Vec<_>>()
        .join(" o ");
    let isolated = spaced_solutions(solutions);

    vec![
        Step::new(
            1,
            canonical,
            &factored.text,
            "factorization",
            "Rewrite the quadratic as a product of factors.".to_string(),
        ),
        Step::new(
            2,
            &factored.text,
            &assignments,
            "zero-product property",
            "A product is zero exactly when one of its factors is zero.".to_string(),
        ),
        Step::new(
            3,
            &assignments,
            &isolated,
            "isolate the variable",
            "Solve each factor for the variable.".to_string(),
        ),
    ]
}

fn resolution_step(index: usize, canonical: &str, solutions: &[Solution]) -> Step {
    let after = if solutions.is_empty() {
        NO_SOLUTION_TEXT.to_string()
    } else {
        spaced_solutions(solutions)
    };
    let narration = match solutions.len() {
        0 => "The engine found no closed-form solution.".to_string(),
        1 => "Solve the equation directly for the variable.".to_string(),
        n => format!("Solve the equation directly, yielding {} roots.", n),
    };
    Step::new(index, canonical, &after, "symbolic resolution", narration)
}

fn spaced_solutions(solutions: &[Solution]) -> String {
    solutions
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{Expression, Variable};
    use pretty_assertions::assert_eq;

    fn solution(name: &str, value: i128) -> Solution {
        Solution::new(Variable::new(name), Expression::int(value))
    }

    #[test]
    fn factored_quadratic_gets_three_steps() {
        let solutions = vec![solution("x", 2), solution("x", 3)];
        let factored = FactoredForm {
            text: "(x - 2)*(x - 3) = 0".to_string(),
            changed: true,
        };

        let steps = synthesize(
            ProblemType::Quadratic,
            "x^2 - 5*x + 6 = 0",
            &solutions,
            &factored,
        );

        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].index, 1);
        assert_eq!(steps[0].rule, "factorization");
        assert_eq!(steps[0].before, "x^2 - 5*x + 6 = 0");
        assert_eq!(steps[0].after, "(x - 2)*(x - 3) = 0");

        assert_eq!(steps[1].rule, "zero-product property");
        assert_eq!(steps[1].before, "(x - 2)*(x - 3) = 0");
        assert_eq!(steps[1].after, "x=2 o x=3");

        assert_eq!(steps[2].index, 3);
        assert_eq!(steps[2].rule, "isolate the variable");
        assert_eq!(steps[2].after, "x = 2, x = 3");
    }

    #[test]
    fn steps_chain_before_and_after() {
        let solutions = vec![solution("x", 2), solution("x", 3)];
        let factored = FactoredForm {
            text: "(x - 2)*(x - 3) = 0".to_string(),
            changed: true,
        };

        let steps = synthesize(
            ProblemType::Quadratic,
            "x^2 - 5*x + 6 = 0",
            &solutions,
            &factored,
        );

        for pair in steps.windows(2) {
            assert_eq!(pair[0].after, pair[1].before);
        }
    }

    #[test]
    fn linear_equation_gets_a_single_step() {
        let solutions = vec![solution("x", 4)];
        let factored = FactoredForm {
            text: "x - 4 = 0".to_string(),
            changed: false,
        };

        let steps = synthesize(ProblemType::Linear, "x - 4 = 0", &solutions, &factored);

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].rule, "symbolic resolution");
        assert_eq!(steps[0].before, "x - 4 = 0");
        assert_eq!(steps[0].after, "x = 4");
    }

    #[test]
    fn unfactorable_quadratic_falls_back_to_one_step() {
        let solutions = Vec::new();
        let factored = FactoredForm {
            text: "x^2 + 1 = 0".to_string(),
            changed: false,
        };

        let steps = synthesize(ProblemType::Quadratic, "x^2 + 1 = 0", &solutions, &factored);

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].after, NO_SOLUTION_TEXT);
    }

    #[test]
    fn factored_quadratic_without_roots_falls_back() {
        // factoring can change the text while solving still comes up empty
        let solutions = Vec::new();
        let factored = FactoredForm {
            text: "2*(x^2 + 1) = 0".to_string(),
            changed: true,
        };

        let steps = synthesize(
            ProblemType::Quadratic,
            "2*x^2 + 2 = 0",
            &solutions,
            &factored,
        );

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].rule, "symbolic resolution");
    }

    #[test]
    fn cubic_uses_the_single_step_path() {
        let solutions = vec![solution("x", 1), solution("x", 2), solution("x", 3)];
        let factored = FactoredForm {
            text: "(x - 1)*(x - 2)*(x - 3) = 0".to_string(),
            changed: true,
        };

        let steps = synthesize(
            ProblemType::Cubic,
            "x^3 - 6*x^2 + 11*x - 6 = 0",
            &solutions,
            &factored,
        );

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].after, "x = 1, x = 2, x = 3");
    }

    #[test]
    fn steps_serialize_with_snake_case_fields() {
        let step = Step::new(1, "x - 4 = 0", "x = 4", "symbolic resolution", "n".to_string());
        let json = serde_json::to_value(&step).unwrap();

        assert_eq!(json["index"], 1);
        assert_eq!(json["before"], "x - 4 = 0");
        assert_eq!(json["after"], "x = 4");
        assert_eq!(json["rule"], "symbolic resolution");
    }
}
