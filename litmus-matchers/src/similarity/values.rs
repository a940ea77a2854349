use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, LinkedList, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use super::{Element, Elements, Scalar, Shape, Similar};
use crate::error::AccessError;

fn elements<'a, I>(items: I) -> Elements<'a>
where
    I: Iterator + 'a,
    I::Item: Similar + 'a,
{
    Box::new(items.map(|item| -> Result<Element<'a>, AccessError> { Ok(Box::new(item)) }))
}

impl<T: Similar + ?Sized> Similar for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Similar + ?Sized> Similar for Box<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Similar + ?Sized> Similar for Rc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Similar + ?Sized> Similar for Arc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }
}

impl<T: Similar> Similar for Option<T> {
    fn shape(&self) -> Shape<'_> {
        self.as_ref().map_or(Shape::Null, Similar::shape)
    }
}

macro_rules! similar_integers {
    ($($ty:ty),+) => {
        $(
            impl Similar for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Scalar(Scalar::Int(i128::from(*self)))
                }
            }
        )+
    };
}

similar_integers!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl Similar for isize {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Int(*self as i128))
    }
}

impl Similar for usize {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Int(*self as i128))
    }
}

impl Similar for u128 {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::UInt(*self))
    }
}

impl Similar for f32 {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Float(f64::from(*self)))
    }
}

impl Similar for f64 {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Float(*self))
    }
}

impl Similar for bool {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Bool(*self))
    }
}

impl Similar for char {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Char(*self))
    }
}

impl Similar for () {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Unit)
    }
}

impl Similar for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Str(self))
    }
}

impl Similar for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Str(self.as_str()))
    }
}

impl Similar for std::borrow::Cow<'_, str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Str(self.as_ref()))
    }
}

impl<T: Similar> Similar for [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::Array(elements(self.iter()))
    }
}

impl<T: Similar, const N: usize> Similar for [T; N] {
    fn shape(&self) -> Shape<'_> {
        Shape::Array(elements(self.iter()))
    }
}

impl<T: Similar> Similar for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(elements(self.iter()))
    }
}

impl<T: Similar> Similar for VecDeque<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(elements(self.iter()))
    }
}

impl<T: Similar> Similar for LinkedList<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(elements(self.iter()))
    }
}

impl<T: Similar> Similar for BTreeSet<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(elements(self.iter()))
    }
}

// Maps are sequences of key/value pairs in key order.
impl<K: Similar, V: Similar> Similar for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(elements(self.iter()))
    }
}

macro_rules! similar_tuples {
    ($(($($name:ident),+)),+) => {
        $(
            impl<$($name: Similar),+> Similar for ($($name,)+) {
                #[allow(non_snake_case)]
                fn shape(&self) -> Shape<'_> {
                    let ($($name,)+) = self;
                    let items: Vec<&dyn Similar> = vec![$($name as &dyn Similar),+];
                    Shape::Sequence(elements(items.into_iter()))
                }
            }
        )+
    };
}

similar_tuples!((A, B), (A, B, C), (A, B, C, D));

/// A single-pass producer of elements, such as an iterator.
///
/// Elements are pulled lazily while a comparison walks the cursor and are
/// gone once pulled, so a cursor takes part in at most one comparison.
pub struct Cursor<'a> {
    source: RefCell<Elements<'a>>,
}

impl<'a> Cursor<'a> {
    /// Wraps an iterator of values.
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::IntoIter: 'a,
        I::Item: Similar + 'a,
    {
        Self {
            source: RefCell::new(elements(items.into_iter())),
        }
    }

    /// Wraps an iterator whose steps may fail. The first failure pulled aborts
    /// the comparison.
    pub fn fallible<I, T, E>(items: I) -> Self
    where
        I: IntoIterator<Item = Result<T, E>>,
        I::IntoIter: 'a,
        T: Similar + 'a,
        E: std::error::Error + Send + Sync + 'static,
    {
        let items = items.into_iter().map(|item| -> Result<Element<'a>, AccessError> {
            match item {
                Ok(value) => Ok(Box::new(value)),
                Err(error) => Err(AccessError::from_error(error)),
            }
        });

        Self {
            source: RefCell::new(Box::new(items)),
        }
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").finish_non_exhaustive()
    }
}

struct Drain<'c, 'a> {
    source: &'c RefCell<Elements<'a>>,
}

impl<'c, 'a: 'c> Iterator for Drain<'c, 'a> {
    type Item = Result<Element<'c>, AccessError>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.source.borrow_mut().next();
        next.map(|item| item.map(|element| -> Element<'c> { element }))
    }
}

impl Similar for Cursor<'_> {
    fn shape(&self) -> Shape<'_> {
        Shape::Cursor(Box::new(Drain {
            source: &self.source,
        }))
    }
}
