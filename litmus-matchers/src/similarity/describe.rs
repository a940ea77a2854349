use std::any::Any;
use std::fmt;

use super::{Element, Similar};
use crate::error::AccessError;

/// A structured value that enumerates its accessors.
///
/// Accessors are grouped by *kind*. A value always belongs to the kind named
/// by [`Describe::type_name`]; it may join further kinds through
/// [`Fields::kind`], the way a type implements a shared capability. Two values
/// are compared on the accessors declared under the kinds they have in common.
///
/// # Example
///
/// ```
/// use litmus_matchers::similarity::{self, Describe, Fields, Shape, Similar};
///
/// #[derive(Debug)]
/// struct Account {
///     owner: String,
///     balance: i64,
/// }
///
/// impl Describe for Account {
///     fn describe<'a>(&'a self, fields: &mut Fields<'a>) {
///         fields.field("owner", &self.owner).field("balance", &self.balance);
///     }
/// }
///
/// impl Similar for Account {
///     fn shape(&self) -> Shape<'_> {
///         Shape::Structured(self)
///     }
/// }
///
/// let expected = Account { owner: "ann".into(), balance: 10 };
/// let actual = Account { owner: "ann".into(), balance: 10 };
/// assert!(similarity::is_similar(&expected, &actual).unwrap());
/// ```
pub trait Describe: fmt::Debug {
    /// Name of the concrete kind of this value.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Declares this value's accessors.
    fn describe<'a>(&'a self, fields: &mut Fields<'a>);

    /// Value equality with another structured value. When this returns
    /// `true` accessors are not compared. Defaults to `false`; see
    /// [`same_value`] for types implementing `PartialEq`.
    fn value_eq(&self, _other: &dyn Describe) -> bool {
        false
    }

    /// Exposes this value for downcasting, if it is `'static`.
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}

/// `PartialEq`-based value equality, for use in [`Describe::value_eq`] by
/// types whose [`Describe::as_any`] returns `Some(self)`.
pub fn same_value<T: PartialEq + 'static>(this: &T, other: &dyn Describe) -> bool {
    other
        .as_any()
        .and_then(|other| other.downcast_ref::<T>())
        .is_some_and(|other| other == this)
}

pub(super) fn equal_values(expected: &dyn Describe, actual: &dyn Describe) -> bool {
    std::ptr::addr_eq(expected, actual) || expected.value_eq(actual)
}

type Getter<'a> = Box<dyn Fn() -> Result<Element<'a>, AccessError> + 'a>;

enum Read<'a> {
    Borrowed(&'a dyn Similar),
    Computed(Getter<'a>),
}

struct Accessor<'a> {
    kind: &'static str,
    name: &'static str,
    read: Read<'a>,
}

/// Collects the accessors of a structured value.
pub struct Fields<'a> {
    kinds: Vec<&'static str>,
    current_kind: &'static str,
    accessors: Vec<Accessor<'a>>,
}

impl<'a> Fields<'a> {
    pub(super) fn of(value: &'a dyn Describe) -> Self {
        let type_name = value.type_name();
        let mut fields = Self {
            kinds: vec![type_name],
            current_kind: type_name,
            accessors: vec![],
        };

        value.describe(&mut fields);
        fields
    }

    /// Joins `kind`; accessors declared after this call belong to it.
    pub fn kind(&mut self, kind: &'static str) -> &mut Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self.current_kind = kind;
        self
    }

    /// Declares an accessor reading a borrowed value.
    pub fn field(&mut self, name: &'static str, value: &'a dyn Similar) -> &mut Self {
        self.push(name, Read::Borrowed(value))
    }

    /// Declares an accessor computing its value on demand. A getter that fails
    /// aborts the comparison.
    pub fn computed<F>(&mut self, name: &'static str, getter: F) -> &mut Self
    where
        F: Fn() -> Result<Element<'a>, AccessError> + 'a,
    {
        self.push(name, Read::Computed(Box::new(getter)))
    }

    fn push(&mut self, name: &'static str, read: Read<'a>) -> &mut Self {
        self.accessors.push(Accessor {
            kind: self.current_kind,
            name,
            read,
        });
        self
    }

    pub(super) fn has_kind(&self, kind: &str) -> bool {
        self.kinds.iter().any(|k| *k == kind)
    }

    /// Yields `(kind, name)` for every accessor in declaration order.
    pub(super) fn accessors(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.accessors.iter().map(|a| (a.kind, a.name))
    }

    /// Reads the accessor named `name`, or `None` if this value declares no
    /// such accessor.
    pub(super) fn read(&self, name: &str) -> Option<Result<Element<'a>, AccessError>> {
        let accessor = self.accessors.iter().find(|a| a.name == name)?;

        Some(match &accessor.read {
            Read::Borrowed(value) => {
                let element: Element<'a> = Box::new(*value);
                Ok(element)
            }
            Read::Computed(getter) => getter(),
        })
    }
}
