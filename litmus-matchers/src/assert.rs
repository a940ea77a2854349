//! Assertions driven by predicates.

use std::fmt::Write;

use predicates::Predicate;
use predicates::reflection::Case;

use crate::error::AssertionFailure;

/// Checks `actual` against `predicate`.
///
/// # Errors
///
/// Returns a failure describing the predicate and every product of the
/// failing case when `actual` does not satisfy `predicate`.
pub fn check<T, P>(actual: &T, predicate: &P) -> Result<(), AssertionFailure>
where
    T: ?Sized,
    P: Predicate<T> + ?Sized,
{
    if predicate.eval(actual) {
        return Ok(());
    }

    let mut message = format!("expected: {predicate}");
    if let Some(case) = predicate.find_case(false, actual) {
        write_products(&mut message, &case);
    }

    Err(AssertionFailure::new(message))
}

/// Asserts that `actual` satisfies `predicate`.
///
/// # Panics
///
/// Panics with the rendered failure when `actual` does not satisfy
/// `predicate`.
#[track_caller]
#[allow(clippy::panic)]
pub fn assert_that<T, P>(actual: &T, predicate: &P)
where
    T: ?Sized,
    P: Predicate<T> + ?Sized,
{
    if let Err(failure) = check(actual, predicate) {
        panic!("{failure}");
    }
}

fn write_products(message: &mut String, case: &Case<'_>) {
    for product in case.products() {
        let _ = write!(message, "\n  {product}");
    }

    for child in case.children() {
        write_products(message, child);
    }
}

#[allow(clippy::panic_in_result_fn)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::similar_to;
    use crate::text::eq_text;
    use predicates::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn passing_check() {
        assert!(check(&5, &predicate::eq(5)).is_ok());
        assert_that("abc", &eq_text("abc"));
    }

    #[test]
    fn failure_lists_products() -> anyhow::Result<()> {
        let failure = check(&vec![1, 2], &similar_to(vec![1, 3]))
            .err()
            .ok_or_else(|| anyhow::anyhow!("check passed"))?;

        assert_eq!(
            failure.message(),
            "expected: similar to [1, 3]\n  path: [1]\n  reason: values differ\n  expected: 3\n  actual: 2"
        );

        Ok(())
    }

    #[test]
    #[should_panic(expected = "expected: text equal to")]
    fn assert_that_panics() {
        assert_that("a", &eq_text("b"));
    }
}
