//! Matchers for tests: structural similarity between values, side-by-side text
//! diffs, and predicates over files and log files. Matchers plug into the
//! [`predicates`] crate, so they compose with its combinators and with any
//! assertion library built on it.

pub mod assert;
pub mod diff;
mod error;
pub mod files;
pub mod logfile;
pub mod similarity;
pub mod text;
mod trace_categories;

pub use assert::{assert_that, check};
pub use diff::{SideBySide, diff_side_by_side};
pub use error::{AccessError, AssertionFailure, SimilarityError};
pub use similarity::{Comparison, Mismatch, Similar, compare, is_similar, similar_to};
pub use text::eq_text;

pub use predicates;

/// Implements [`Similar`] and [`similarity::Describe`] for a struct by
/// declaring each listed field as an accessor.
///
/// ```
/// use litmus_matchers::{is_similar, similar_by_fields};
///
/// #[derive(Debug)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// similar_by_fields!(Point { x, y });
///
/// assert!(is_similar(&Point { x: 1, y: 2 }, &Point { x: 1, y: 2 }).unwrap());
/// ```
#[macro_export]
macro_rules! similar_by_fields {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::similarity::Describe for $ty {
            fn describe<'a>(&'a self, fields: &mut $crate::similarity::Fields<'a>) {
                $(fields.field(stringify!($field), &self.$field);)*
            }
        }

        impl $crate::similarity::Similar for $ty {
            fn shape(&self) -> $crate::similarity::Shape<'_> {
                $crate::similarity::Shape::Structured(self)
            }
        }
    };
}
