//! The end-to-end solving pipeline.
//!
//! [`solve_problem`] drives every stage in order: normalize the raw
//! text, parse it into an [`Equation`], classify it, solve it, check
//! the roots against the original equation, factor the zero-form, and
//! narrate the whole thing as steps. The output is a self-contained
//! [`SolveResult`] ready for serialization.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::classify::{self, ProblemType};
use crate::equation::Equation;
use crate::factor;
use crate::normalize::{self, InputFormat};
use crate::ops;
use crate::parse::ParseError;
use crate::solve::{self, Solution};
use crate::steps::{self, Step};
use crate::validate;

/// Failures that stop the pipeline before it can produce a result.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("unsupported input format {0:?}")]
    UnsupportedFormat(String),
    #[error("unable to parse {raw:?} (normalized to {normalized:?})")]
    Parse {
        raw: String,
        normalized: String,
        #[source]
        source: ParseError,
    },
    #[error("the equation contains no variable to solve for")]
    NoVariable,
}

/// Everything the pipeline learned about one equation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveResult {
    /// The equation after normalization, parsing, and constant folding.
    pub canonical_equation: String,
    /// `"x = 2"` style renderings, one per root.
    pub solutions: Vec<String>,
    pub solution_count: usize,
    pub problem_type: ProblemType,
    /// Whether every reported root checked out against the original
    /// equation. Vacuously `true` when there are no roots.
    pub validated: bool,
    /// Factored text of the zero-form, e.g. `"(x - 2)*(x - 3) = 0"`.
    pub factored_form: String,
    pub steps: Vec<Step>,
}

/// Run the full pipeline on raw input text.
pub fn solve_problem(text: &str, format: InputFormat) -> Result<SolveResult, SolveError> {
    let normalized = normalize::normalize(text, format);
    debug!(raw = text, %normalized, "normalized input");

    let equation = Equation::from_str(&normalized).map_err(|source| SolveError::Parse {
        raw: text.to_string(),
        normalized: normalized.clone(),
        source,
    })?;

    let principal = equation.principal_variable().ok_or(SolveError::NoVariable)?;
    let problem_type = classify::classify(&equation, &principal);
    debug!(variable = principal.name(), %problem_type, "classified equation");

    let solutions = solve::solve_equation(&equation, Some(&principal));
    let validated = validate::validate(&equation, &solutions);
    let factored = factor::factor(&equation);

    let canonical = canonical_text(&equation);
    let steps = steps::synthesize(problem_type, &canonical, &solutions, &factored);

    Ok(SolveResult {
        canonical_equation: canonical,
        solutions: solutions.iter().map(Solution::to_string).collect(),
        solution_count: solutions.len(),
        problem_type,
        validated,
        factored_form: factored.text,
        steps,
    })
}

/// Like [`solve_problem`], taking the format as a string tag such as
/// `"plain"` or `"latex"`.
pub fn solve_problem_tagged(text: &str, format_tag: &str) -> Result<SolveResult, SolveError> {
    let format = InputFormat::from_tag(format_tag)
        .ok_or_else(|| SolveError::UnsupportedFormat(format_tag.to_string()))?;
    solve_problem(text, format)
}

fn canonical_text(equation: &Equation) -> String {
    format!(
        "{} = {}",
        ops::fold_constants(equation.lhs()),
        ops::fold_constants(equation.rhs())
    )
}
