//! Heuristic cleanup of human-written equation text.
//!
//! Turns loosely formatted input (`5x`, `(x-2)(x-3)`, `\frac{1}{2}x`) into
//! text the expression parser accepts. These are purely lexical rewrites,
//! applied once, left to right; re-normalizing already-normalized text is
//! a no-op.

use once_cell::sync::Lazy;
use regex::Regex;

/// The notations [`solve_problem`](crate::pipeline::solve_problem) accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputFormat {
    Plain,
    Latex,
}

impl InputFormat {
    /// Recognize a format tag. Anything but `"plain"`/`"latex"`
    /// (case-insensitive) is unsupported.
    pub fn from_tag(tag: &str) -> Option<InputFormat> {
        match tag.to_ascii_lowercase().as_str() {
            "plain" => Some(InputFormat::Plain),
            "latex" => Some(InputFormat::Latex),
            _ => None,
        }
    }
}

static ADJACENT_GROUPS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\)\s*\(").expect("hard-coded regex"));
static PAREN_THEN_ATOM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\)\s*([a-zA-Z0-9])").expect("hard-coded regex"));
static DIGIT_THEN_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)([a-zA-Z])").expect("hard-coded regex"));
static LETTER_THEN_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-zA-Z])\s*\(").expect("hard-coded regex"));
static DIGIT_THEN_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)\s*\(").expect("hard-coded regex"));
static MULTIPLICATION_MACRO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\cdot|\\times").expect("hard-coded regex"));
static FRACTION_MACRO: Lazy<Regex> = Lazy::new(|| {
    // Best effort: handles unnested \frac{A}{B}. Unsupported macros fall
    // through and fail later as a parse error, not here.
    Regex::new(r"\\frac\{([^{}]*)\}\{([^{}]*)\}").expect("hard-coded regex")
});

/// Normalize raw problem text into parser-ready plain syntax.
pub fn normalize(text: &str, format: InputFormat) -> String {
    let plain = match format {
        InputFormat::Plain => text.trim().to_string(),
        InputFormat::Latex => strip_latex(text.trim()),
    };

    insert_implicit_multiplication(&plain)
}

/// Rewrite the LaTeX-like macros we know about and drop the rest of the
/// markup. This is a textual rewrite, not a LaTeX grammar.
fn strip_latex(text: &str) -> String {
    let s = MULTIPLICATION_MACRO.replace_all(text, "*");
    let s = FRACTION_MACRO.replace_all(&s, "($1)/($2)");
    s.replace('\\', "").replace('{', "").replace('}', "")
}

/// Insert the `*` a human left out.
///
/// - `(x-2)(x-3)` -> `(x-2)*(x-3)`
/// - `5x`         -> `5*x`
/// - `x(x+1)`     -> `x*(x+1)`
/// - `2(x+1)`     -> `2*(x+1)`
/// - `(1)/(2)x`   -> `(1)/(2)*x`
///
/// Each rewrite destroys its own match, so the whole pass is idempotent.
fn insert_implicit_multiplication(text: &str) -> String {
    let s = ADJACENT_GROUPS.replace_all(text, ")*(");
    let s = PAREN_THEN_ATOM.replace_all(&s, ")*$1");
    let s = DIGIT_THEN_LETTER.replace_all(&s, "$1*$2");
    let s = LETTER_THEN_PAREN.replace_all(&s, "$1*(");
    let s = DIGIT_THEN_PAREN.replace_all(&s, "$1*(");
    s.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_rewrites() {
        let inputs = vec![
            ("2x + 3 = 11", "2*x + 3 = 11"),
            ("x^2 - 5x + 6 = 0", "x^2 - 5*x + 6 = 0"),
            ("(x-2)(x-3) = 0", "(x-2)*(x-3) = 0"),
            ("x(x+1) = 6", "x*(x+1) = 6"),
            ("2(x+1) = 4", "2*(x+1) = 4"),
            ("(x+1)x = 0", "(x+1)*x = 0"),
            ("(1)/(2)x = 4", "(1)/(2)*x = 4"),
            // a digit only multiplies a letter it touches
            ("3 x = 9", "3 x = 9"),
            // explicit operators are left alone
            ("2*x + 3 = 11", "2*x + 3 = 11"),
        ];

        for (src, should_be) in inputs {
            assert_eq!(normalize(src, InputFormat::Plain), should_be);
        }
    }

    #[test]
    fn latex_rewrites() {
        let inputs = vec![
            (r"2x \cdot 3 = 6", "2*x * 3 = 6"),
            (r"2 \times x = 6", "2 * x = 6"),
            (r"\frac{1}{2}x = 4", "(1)/(2)*x = 4"),
            (r"x^2 - 5x + 6 = 0", "x^2 - 5*x + 6 = 0"),
        ];

        for (src, should_be) in inputs {
            assert_eq!(normalize(src, InputFormat::Latex), should_be);
        }
    }

    #[test]
    fn unsupported_macros_pass_through() {
        // leftover text fails later at parse time, not here
        let got = normalize(r"\sqrt{x} = 2", InputFormat::Latex);
        assert_eq!(got, "sqrtx = 2");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = vec![
            ("2x + 3 = 11", InputFormat::Plain),
            ("(x-2)(x-3) = 0", InputFormat::Plain),
            ("x(x+1)(x+2) = 0", InputFormat::Plain),
            ("(1)/(2)x = 4", InputFormat::Plain),
            ("5 = 5", InputFormat::Plain),
            (r"\frac{1}{2}x = 4", InputFormat::Latex),
            (r"2x \cdot 3 = 6", InputFormat::Latex),
        ];

        for (src, format) in inputs {
            let once = normalize(src, format);
            let twice = normalize(&once, format);
            assert_eq!(twice, once, "normalizing {:?} twice diverged", src);
        }
    }

    #[test]
    fn format_tags() {
        assert_eq!(InputFormat::from_tag("plain"), Some(InputFormat::Plain));
        assert_eq!(InputFormat::from_tag("LaTeX"), Some(InputFormat::Latex));
        assert_eq!(InputFormat::from_tag("mathml"), None);
    }
}
