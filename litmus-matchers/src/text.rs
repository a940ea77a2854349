//! String equality with a side-by-side diff on failure.

use std::fmt;

use predicates::Predicate;
use predicates::reflection::{Case, PredicateReflection, Product};

use crate::diff::SideBySide;

/// Predicate that holds when the tested text equals an expected text.
#[derive(Clone, Debug)]
pub struct TextEq {
    expected: String,
    renderer: SideBySide,
}

/// Creates a predicate testing string equality against `expected`.
pub fn eq_text(expected: impl Into<String>) -> TextEq {
    TextEq {
        expected: expected.into(),
        renderer: SideBySide::default(),
    }
}

impl TextEq {
    /// Replaces the renderer used to explain failures.
    #[must_use]
    pub const fn with_renderer(mut self, renderer: SideBySide) -> Self {
        self.renderer = renderer;
        self
    }
}

impl fmt::Display for TextEq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "text equal to {:?}", self.expected)
    }
}

impl PredicateReflection for TextEq {}

impl Predicate<str> for TextEq {
    fn eval(&self, variable: &str) -> bool {
        variable == self.expected
    }

    fn find_case<'a>(&'a self, expected: bool, variable: &str) -> Option<Case<'a>> {
        let result = self.eval(variable);
        if result != expected {
            return None;
        }

        let mut case = Case::new(Some(self), result);
        if !result {
            let diff = self.renderer.render(&self.expected, variable);
            case = case.add_product(Product::new("diff", format!("\n{diff}")));
        }

        Some(case)
    }
}

#[allow(clippy::panic_in_result_fn)]
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn equal_text() {
        assert!(eq_text("a\nb").eval("a\nb"));
        assert!(!eq_text("a\nb").eval("a\nb\n"));
    }

    #[test]
    fn failure_carries_diff() -> anyhow::Result<()> {
        let predicate = eq_text("a\nb\nc");
        let case = predicate
            .find_case(false, "a\nx\nc")
            .ok_or_else(|| anyhow::anyhow!("no failing case"))?;

        let products: Vec<String> = case.products().map(|p| p.to_string()).collect();
        assert_eq!(products, ["diff: \na     a\nb   | x\nc     c\n"]);

        Ok(())
    }
}
