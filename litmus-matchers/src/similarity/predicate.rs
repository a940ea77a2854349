use std::fmt;

use predicates::Predicate;
use predicates::reflection::{Case, PredicateReflection, Product};

use super::{Comparison, Similar, compare};

/// Predicate that holds when the tested value is similar to an expected value.
pub struct SimilarTo<T> {
    expected: T,
}

/// Creates a predicate testing similarity to `expected`.
///
/// # Panics
///
/// Evaluating the predicate panics if an accessor or element producer fails,
/// since a predicate cannot report errors.
pub const fn similar_to<T: Similar>(expected: T) -> SimilarTo<T> {
    SimilarTo { expected }
}

impl<T: Similar> SimilarTo<T> {
    /// Returns the expected value.
    pub const fn expected(&self) -> &T {
        &self.expected
    }

    #[allow(clippy::panic)]
    fn comparison(&self, actual: &dyn Similar) -> Comparison {
        match compare(&self.expected, actual) {
            Ok(comparison) => comparison,
            Err(error) => panic!("similarity comparison failed: {error}"),
        }
    }
}

impl<T: Similar> fmt::Display for SimilarTo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "similar to {:?}", self.expected)
    }
}

impl<T: Similar> PredicateReflection for SimilarTo<T> {}

impl<T, A> Predicate<A> for SimilarTo<T>
where
    T: Similar,
    A: Similar + ?Sized,
{
    fn eval(&self, variable: &A) -> bool {
        let actual: &dyn Similar = &variable;
        self.comparison(actual).is_similar()
    }

    fn find_case<'a>(&'a self, expected: bool, variable: &A) -> Option<Case<'a>> {
        let actual: &dyn Similar = &variable;
        let comparison = self.comparison(actual);

        let result = comparison.is_similar();
        if result != expected {
            return None;
        }

        let mut case = Case::new(Some(self), result);
        if let Comparison::Dissimilar(mismatch) = comparison {
            case = case
                .add_product(Product::new("path", mismatch.location().to_owned()))
                .add_product(Product::new("reason", mismatch.reason.to_string()))
                .add_product(Product::new("expected", mismatch.expected))
                .add_product(Product::new("actual", mismatch.actual));
        }

        Some(case)
    }
}
