//! Structural similarity between an expected and an actual value.
//!
//! Two values are *similar* when they are equal by value, or when they are
//! containers whose elements are pairwise similar, or when they are structured
//! values whose common accessors all yield similar values. Comparison stops at
//! the first divergence and reports the path leading to it, e.g.
//! `.orders()[2].total()`.
//!
//! Values take part by implementing [`Similar`], which classifies them into a
//! [`Shape`]. Structured values additionally implement [`Describe`] to
//! enumerate their accessors.

use std::fmt;

use indexmap::IndexSet;

use crate::error::{AccessError, SimilarityError};
use crate::trace_categories;

mod describe;
mod predicate;
mod values;

pub use describe::{Describe, Fields, same_value};

use describe::equal_values;
pub use predicate::{SimilarTo, similar_to};
pub use values::Cursor;

/// A boxed value produced while walking a container or reading an accessor.
pub type Element<'a> = Box<dyn Similar + 'a>;

/// A stream of elements; producing any element may fail.
pub type Elements<'a> = Box<dyn Iterator<Item = Result<Element<'a>, AccessError>> + 'a>;

/// A value that can be compared for structural similarity.
pub trait Similar: fmt::Debug {
    /// Classifies this value for comparison.
    fn shape(&self) -> Shape<'_>;
}

/// Category a value presents to the matcher. Categories are checked in the
/// order listed here.
pub enum Shape<'a> {
    /// Absence of a value.
    Null,
    /// A re-iterable container.
    Sequence(Elements<'a>),
    /// A single-pass producer of elements.
    Cursor(Elements<'a>),
    /// A fixed-size contiguous array, viewed as an ordered sequence.
    Array(Elements<'a>),
    /// A primitive-like built-in value with no accessors.
    Scalar(Scalar<'a>),
    /// A value exposing named accessors.
    Structured(&'a dyn Describe),
}

/// Elements of a container being walked.
struct Walk<'a> {
    elements: Elements<'a>,
    // Cursors may be unbounded and are never drained past what a comparison
    // needs.
    bounded: bool,
}

impl<'a> Shape<'a> {
    fn into_walk(self) -> Option<Walk<'a>> {
        match self {
            Self::Sequence(elements) | Self::Array(elements) => Some(Walk {
                elements,
                bounded: true,
            }),
            Self::Cursor(elements) => Some(Walk {
                elements,
                bounded: false,
            }),
            Self::Null | Self::Scalar(_) | Self::Structured(_) => None,
        }
    }

    const fn category(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Sequence(_) => "sequence",
            Self::Cursor(_) => "cursor",
            Self::Array(_) => "array",
            Self::Scalar(_) => "scalar",
            Self::Structured(_) => "structured value",
        }
    }
}

/// Primitive-like value. All integers up to 64 bits share one representation,
/// so `1u8` and `1i64` are equal.
#[derive(Clone, Copy, Debug)]
pub enum Scalar<'a> {
    /// The unit value.
    Unit,
    /// A boolean.
    Bool(bool),
    /// A signed or unsigned integer that fits in `i128`.
    Int(i128),
    /// An unsigned 128-bit integer.
    UInt(u128),
    /// A floating point number; compared by bit pattern.
    Float(f64),
    /// A character.
    Char(char),
    /// A string.
    Str(&'a str),
}

impl PartialEq for Scalar<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unit, Self::Unit) => true,
            (Self::Bool(l), Self::Bool(r)) => l == r,
            (Self::Int(l), Self::Int(r)) => l == r,
            (Self::UInt(l), Self::UInt(r)) => l == r,
            (Self::Int(l), Self::UInt(r)) | (Self::UInt(r), Self::Int(l)) => {
                u128::try_from(*l).is_ok_and(|l| l == *r)
            }
            // NaN equals NaN and 0.0 differs from -0.0.
            (Self::Float(l), Self::Float(r)) => l.to_bits() == r.to_bits(),
            (Self::Char(l), Self::Char(r)) => l == r,
            (Self::Str(l), Self::Str(r)) => l == r,
            _ => false,
        }
    }
}

/// Which side of a comparison a value belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// The expected value.
    Expected,
    /// The actual value.
    Actual,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected => write!(f, "expected"),
            Self::Actual => write!(f, "actual"),
        }
    }
}

/// Number of elements found in a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Length {
    /// The container held exactly this many elements.
    Exactly(usize),
    /// A cursor held at least this many elements; it was not read further.
    AtLeast(usize),
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(count) => write!(f, "{count}"),
            Self::AtLeast(count) => write!(f, "at least {count}"),
        }
    }
}

/// Why two values were found dissimilar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reason {
    /// Exactly one of the values was null.
    NullCheck,
    /// Expected was a container but actual was not.
    NotASequence,
    /// Expected was a structured value but actual was not.
    NotStructured,
    /// Scalars differ by value.
    NotEqual,
    /// Structured values share no accessors.
    NoCommonAccessors,
    /// An accessor shared by the values' common kinds is missing on one side.
    MissingAccessor(Side),
    /// Containers hold a different number of elements.
    LengthDiffers {
        /// Number of elements in the expected container.
        expected: Length,
        /// Number of elements in the actual container.
        actual: Length,
    },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullCheck => write!(f, "null check failed"),
            Self::NotASequence => write!(f, "actual is not a container"),
            Self::NotStructured => write!(f, "actual is not a structured value"),
            Self::NotEqual => write!(f, "values differ"),
            Self::NoCommonAccessors => write!(f, "no accessors in common"),
            Self::MissingAccessor(side) => write!(f, "{side} lacks accessor"),
            Self::LengthDiffers { expected, actual } => write!(
                f,
                "element count differs (expected {expected}, actual {actual})"
            ),
        }
    }
}

/// The first point at which two values diverged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    /// Accessor and index steps from the root, e.g. `.lines()[1].x()`. Empty
    /// for the root.
    pub path: String,
    /// The check that failed.
    pub reason: Reason,
    /// Rendering of the expected value at `path`.
    pub expected: String,
    /// Rendering of the actual value at `path`.
    pub actual: String,
}

impl Mismatch {
    fn new(path: &str, reason: Reason, expected: &dyn fmt::Debug, actual: &dyn fmt::Debug) -> Self {
        Self {
            path: path.to_owned(),
            reason,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }

    /// Returns the path, or `<root>` for a mismatch at the top level.
    pub fn location(&self) -> &str {
        if self.path.is_empty() {
            "<root>"
        } else {
            self.path.as_str()
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at {}: {} (expected {}, but was {})",
            self.location(),
            self.reason,
            self.expected,
            self.actual
        )
    }
}

/// Outcome of a comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// The values are similar.
    Similar,
    /// The values diverge; the first divergence is described.
    Dissimilar(Mismatch),
}

impl Comparison {
    /// Returns whether the values were found similar.
    pub const fn is_similar(&self) -> bool {
        matches!(self, Self::Similar)
    }

    /// Returns the mismatch, if any.
    pub const fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            Self::Similar => None,
            Self::Dissimilar(mismatch) => Some(mismatch),
        }
    }
}

/// Compares `expected` against `actual`.
///
/// # Arguments
///
/// * `expected` - The value the test expects.
/// * `actual` - The value observed.
pub fn compare(
    expected: &dyn Similar,
    actual: &dyn Similar,
) -> Result<Comparison, SimilarityError> {
    let comparison = compare_at("", expected, actual)?;

    if let Comparison::Dissimilar(mismatch) = &comparison {
        tracing::debug!(target: trace_categories::SIMILARITY, "dissimilar {mismatch}");
    }

    Ok(comparison)
}

/// Returns whether `expected` and `actual` are similar.
pub fn is_similar(expected: &dyn Similar, actual: &dyn Similar) -> Result<bool, SimilarityError> {
    Ok(compare(expected, actual)?.is_similar())
}

fn dissimilar(
    path: &str,
    reason: Reason,
    expected: &dyn fmt::Debug,
    actual: &dyn fmt::Debug,
) -> Result<Comparison, SimilarityError> {
    Ok(Comparison::Dissimilar(Mismatch::new(
        path, reason, expected, actual,
    )))
}

fn compare_at(
    path: &str,
    expected: &dyn Similar,
    actual: &dyn Similar,
) -> Result<Comparison, SimilarityError> {
    let expected_shape = expected.shape();
    let actual_shape = actual.shape();

    tracing::trace!(
        target: trace_categories::SIMILARITY,
        "comparing {} with {} at '{path}'",
        expected_shape.category(),
        actual_shape.category()
    );

    match (expected_shape, actual_shape) {
        (Shape::Null, Shape::Null) => Ok(Comparison::Similar),
        (Shape::Null, _) | (_, Shape::Null) => {
            dissimilar(path, Reason::NullCheck, &expected, &actual)
        }
        (
            expected_shape @ (Shape::Sequence(_) | Shape::Cursor(_) | Shape::Array(_)),
            actual_shape,
        ) => match (expected_shape.into_walk(), actual_shape.into_walk()) {
            (Some(expected_walk), Some(actual_walk)) => {
                compare_elements(path, expected_walk, actual_walk)
            }
            _ => dissimilar(path, Reason::NotASequence, &expected, &actual),
        },
        (Shape::Scalar(expected_scalar), Shape::Scalar(actual_scalar))
            if expected_scalar == actual_scalar =>
        {
            Ok(Comparison::Similar)
        }
        (Shape::Scalar(_), _) => dissimilar(path, Reason::NotEqual, &expected, &actual),
        (Shape::Structured(expected_value), Shape::Structured(actual_value)) => {
            if equal_values(expected_value, actual_value) {
                Ok(Comparison::Similar)
            } else {
                compare_accessors(path, expected_value, actual_value)
            }
        }
        (Shape::Structured(_), _) => {
            dissimilar(path, Reason::NotStructured, &expected, &actual)
        }
    }
}

fn next_element<'a>(
    path: &str,
    index: usize,
    elements: &mut Elements<'a>,
) -> Result<Option<Element<'a>>, SimilarityError> {
    elements
        .next()
        .transpose()
        .map_err(|source| SimilarityError::Accessor {
            path: format!("{path}[{index}]"),
            source,
        })
}

fn count_remaining(
    path: &str,
    mut index: usize,
    elements: &mut Elements<'_>,
) -> Result<usize, SimilarityError> {
    let mut count = 0;
    while next_element(path, index, elements)?.is_some() {
        count += 1;
        index += 1;
    }
    Ok(count)
}

/// Length of the longer side once `consumed` of its elements, including the
/// first surplus one, have been read.
fn surplus_length(
    path: &str,
    consumed: usize,
    walk: &mut Walk<'_>,
) -> Result<Length, SimilarityError> {
    if walk.bounded {
        let remaining = count_remaining(path, consumed, &mut walk.elements)?;
        Ok(Length::Exactly(consumed + remaining))
    } else {
        Ok(Length::AtLeast(consumed))
    }
}

fn compare_elements(
    path: &str,
    mut expected: Walk<'_>,
    mut actual: Walk<'_>,
) -> Result<Comparison, SimilarityError> {
    let mut index = 0;

    loop {
        let expected_element = next_element(path, index, &mut expected.elements)?;
        let actual_element = next_element(path, index, &mut actual.elements)?;

        let (expected_len, actual_len) = match (expected_element, actual_element) {
            (None, None) => return Ok(Comparison::Similar),
            (Some(expected_element), Some(actual_element)) => {
                let element_path = format!("{path}[{index}]");
                let comparison = compare_at(&element_path, &*expected_element, &*actual_element)?;
                if !comparison.is_similar() {
                    return Ok(comparison);
                }

                index += 1;
                continue;
            }
            (Some(_), None) => (
                surplus_length(path, index + 1, &mut expected)?,
                Length::Exactly(index),
            ),
            (None, Some(_)) => (
                Length::Exactly(index),
                surplus_length(path, index + 1, &mut actual)?,
            ),
        };

        let reason = Reason::LengthDiffers {
            expected: expected_len,
            actual: actual_len,
        };

        return Ok(Comparison::Dissimilar(Mismatch {
            path: format!("{path}[{index}]"),
            reason,
            expected: format!("{expected_len} elements"),
            actual: format!("{actual_len} elements"),
        }));
    }
}

fn compare_accessors(
    path: &str,
    expected: &dyn Describe,
    actual: &dyn Describe,
) -> Result<Comparison, SimilarityError> {
    let expected_fields = Fields::of(expected);
    let actual_fields = Fields::of(actual);

    // Accessors declared under any kind both values belong to.
    let common: IndexSet<&'static str> = expected_fields
        .accessors()
        .chain(actual_fields.accessors())
        .filter(|(kind, _)| expected_fields.has_kind(kind) && actual_fields.has_kind(kind))
        .map(|(_, name)| name)
        .collect();

    if common.is_empty() {
        return dissimilar(path, Reason::NoCommonAccessors, &expected, &actual);
    }

    for name in common {
        let accessor_path = format!("{path}.{name}()");

        let Some(expected_value) = expected_fields.read(name) else {
            return dissimilar(
                &accessor_path,
                Reason::MissingAccessor(Side::Expected),
                &expected,
                &actual,
            );
        };
        let Some(actual_value) = actual_fields.read(name) else {
            return dissimilar(
                &accessor_path,
                Reason::MissingAccessor(Side::Actual),
                &expected,
                &actual,
            );
        };

        let expected_value = expected_value.map_err(|source| SimilarityError::Accessor {
            path: accessor_path.clone(),
            source,
        })?;
        let actual_value = actual_value.map_err(|source| SimilarityError::Accessor {
            path: accessor_path.clone(),
            source,
        })?;

        let comparison = compare_at(&accessor_path, &*expected_value, &*actual_value)?;
        if !comparison.is_similar() {
            return Ok(comparison);
        }
    }

    Ok(Comparison::Similar)
}
