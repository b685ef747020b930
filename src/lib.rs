//! An exact equation-solving pipeline for school-level algebra.
//!
//! Raw text (plain or LaTeX-flavoured) is normalized, parsed into a
//! symbolic [`Equation`], classified by polynomial degree, solved
//! exactly over the rationals (with square-root extensions where the
//! quadratic formula needs them), checked by substitution, factored,
//! and finally narrated as worked-solution [`Step`]s.
//!
//! [`pipeline::solve_problem`] is the front door; the individual
//! stages are public for callers that want only part of the story.

mod classify;
mod equation;
mod expr;
mod factor;
mod normalize;
pub mod ops;
mod parse;
pub mod pipeline;
mod poly;
mod rational;
mod solve;
mod steps;
mod validate;

pub use classify::{classify, ProblemType};
pub use equation::Equation;
pub use expr::{BinaryOperation, Expression, Variable};
pub use factor::{factor, FactoredForm};
pub use normalize::{normalize, InputFormat};
pub use parse::{parse, ParseError, TokenKind};
pub use pipeline::{solve_problem, solve_problem_tagged, SolveError, SolveResult};
pub use poly::{PolyForm, UniPoly};
pub use rational::Rational;
pub use solve::{solve_equation, Solution};
pub use steps::{synthesize, Step, NO_SOLUTION_TEXT};
pub use validate::validate;
