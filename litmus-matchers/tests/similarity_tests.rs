//! Integration tests for structural similarity of user-defined types.

#![allow(clippy::panic_in_result_fn)]

use std::any::Any;

use anyhow::Result;
use litmus_matchers::similarity::{
    self, Comparison, Describe, Fields, Reason, Shape, Side, Similar, same_value,
};
use litmus_matchers::{AccessError, SimilarityError, assert_that, similar_by_fields, similar_to};
use pretty_assertions::assert_eq;

#[derive(Debug)]
struct Line {
    sku: String,
    quantity: u32,
    price: i64,
}

similar_by_fields!(Line {
    sku,
    quantity,
    price
});

#[derive(Debug)]
struct Order {
    id: u64,
    lines: Vec<Line>,
}

impl Describe for Order {
    fn describe<'a>(&'a self, fields: &mut Fields<'a>) {
        fields
            .field("id", &self.id)
            .field("lines", &self.lines)
            .computed("total", || {
                let total: i64 = self
                    .lines
                    .iter()
                    .map(|line| i64::from(line.quantity) * line.price)
                    .sum();
                Ok(Box::new(total))
            });
    }
}

impl Similar for Order {
    fn shape(&self) -> Shape<'_> {
        Shape::Structured(self)
    }
}

fn line(sku: &str, quantity: u32, price: i64) -> Line {
    Line {
        sku: sku.to_owned(),
        quantity,
        price,
    }
}

fn mismatch_of(expected: &dyn Similar, actual: &dyn Similar) -> Result<similarity::Mismatch> {
    similarity::compare(expected, actual)?
        .mismatch()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("values were similar"))
}

#[test]
fn similar_orders() -> Result<()> {
    let expected = Order {
        id: 7,
        lines: vec![line("apple", 2, 3), line("pear", 1, 4)],
    };
    let actual = Order {
        id: 7,
        lines: vec![line("apple", 2, 3), line("pear", 1, 4)],
    };

    assert!(similarity::is_similar(&expected, &actual)?);
    assert_that(&actual, &similar_to(&expected));

    Ok(())
}

#[test]
fn nested_mismatch_path() -> Result<()> {
    let expected = Order {
        id: 7,
        lines: vec![line("apple", 2, 3), line("pear", 1, 4)],
    };
    let actual = Order {
        id: 7,
        lines: vec![line("apple", 2, 3), line("plum", 1, 4)],
    };

    let mismatch = mismatch_of(&expected, &actual)?;

    assert_eq!(mismatch.path, ".lines()[1].sku()");
    assert_eq!(mismatch.reason, Reason::NotEqual);
    assert_eq!(mismatch.expected, r#""pear""#);
    assert_eq!(mismatch.actual, r#""plum""#);

    Ok(())
}

#[test]
fn accessors_compared_in_declaration_order() -> Result<()> {
    let expected = Order {
        id: 1,
        lines: vec![],
    };
    let actual = Order {
        id: 1,
        lines: vec![line("apple", 1, 1)],
    };

    // `total` differs too, but `lines` is declared first.
    assert_eq!(mismatch_of(&expected, &actual)?.path, ".lines()[0]");

    Ok(())
}

// Two unrelated types sharing a capability.

#[derive(Debug)]
struct Circle {
    radius: f64,
    label: &'static str,
}

#[derive(Debug)]
struct Square {
    side: f64,
    label: &'static str,
}

const LABELLED: &str = "Labelled";

impl Describe for Circle {
    fn describe<'a>(&'a self, fields: &mut Fields<'a>) {
        fields.field("radius", &self.radius);
        fields.kind(LABELLED).field("label", &self.label);
    }
}

impl Similar for Circle {
    fn shape(&self) -> Shape<'_> {
        Shape::Structured(self)
    }
}

impl Describe for Square {
    fn describe<'a>(&'a self, fields: &mut Fields<'a>) {
        fields.field("side", &self.side);
        fields
            .kind(LABELLED)
            .field("label", &self.label)
            .field("corners", &4);
    }
}

impl Similar for Square {
    fn shape(&self) -> Shape<'_> {
        Shape::Structured(self)
    }
}

#[test]
fn shared_kind_limits_accessors() -> Result<()> {
    let circle = Circle {
        radius: 1.0,
        label: "a",
    };
    let square = Square {
        side: 2.0,
        label: "a",
    };

    // Only accessors of the shared kind are compared; the circle lacks one.
    let mismatch = mismatch_of(&circle, &square)?;
    assert_eq!(mismatch.path, ".corners()");
    assert_eq!(mismatch.reason, Reason::MissingAccessor(Side::Expected));

    let mismatch = mismatch_of(&square, &circle)?;
    assert_eq!(mismatch.reason, Reason::MissingAccessor(Side::Actual));

    Ok(())
}

#[derive(Debug)]
struct Celsius {
    degrees: i32,
}

similar_by_fields!(Celsius { degrees });

#[test]
fn no_common_accessors() -> Result<()> {
    let mismatch = mismatch_of(
        &Celsius { degrees: 1 },
        &Line {
            sku: String::new(),
            quantity: 0,
            price: 0,
        },
    )?;

    assert_eq!(mismatch.path, "");
    assert_eq!(mismatch.reason, Reason::NoCommonAccessors);

    Ok(())
}

#[derive(Debug, PartialEq)]
struct Version {
    major: u32,
    build: &'static str,
}

impl Describe for Version {
    fn describe<'a>(&'a self, fields: &mut Fields<'a>) {
        fields.field("major", &self.major).field("build", &self.build);
    }

    fn value_eq(&self, other: &dyn Describe) -> bool {
        same_value(self, other)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(self)
    }
}

impl Similar for Version {
    fn shape(&self) -> Shape<'_> {
        Shape::Structured(self)
    }
}

#[test]
fn value_equality_short_circuits() -> Result<()> {
    let a = Version {
        major: 1,
        build: "x",
    };

    assert!(similarity::is_similar(&a, &Version { major: 1, build: "x" })?);

    // Not equal by value, so accessors decide.
    let mismatch = mismatch_of(&a, &Version { major: 1, build: "y" })?;
    assert_eq!(mismatch.path, ".build()");

    Ok(())
}

#[derive(Debug)]
struct Account {
    online: bool,
}

impl Describe for Account {
    fn describe<'a>(&'a self, fields: &mut Fields<'a>) {
        fields.computed("balance", || {
            if self.online {
                Ok(Box::new(100))
            } else {
                Err(AccessError::new("backend offline"))
            }
        });
    }
}

impl Similar for Account {
    fn shape(&self) -> Shape<'_> {
        Shape::Structured(self)
    }
}

#[test]
fn failing_accessor_aborts_comparison() -> Result<()> {
    let result = similarity::compare(&Account { online: true }, &Account { online: false });

    let Err(SimilarityError::Accessor { path, source }) = &result else {
        return Err(anyhow::anyhow!("expected an accessor failure, got {result:?}"));
    };
    assert_eq!(path, ".balance()");
    assert_eq!(source.to_string(), "backend offline");

    Ok(())
}

#[test]
fn identical_reference_is_similar_without_reading() -> Result<()> {
    let account = Account { online: false };

    assert_eq!(
        similarity::compare(&account, &account)?,
        Comparison::Similar
    );

    Ok(())
}
