//! Side-by-side rendering of line differences, in the manner of `diff -y`.
//!
//! Each row shows the expected line padded to a common width, a marker column
//! and the actual line:
//!
//! | marker | meaning |
//! |--------|---------|
//! | (none) | unchanged |
//! | `<`    | deleted from expected |
//! | `>`    | added in actual |
//! | `\|`   | modified |

use std::fmt;

use colored::Colorize;

use crate::trace_categories;

/// Configurable side-by-side renderer.
#[derive(Clone, Copy, Debug)]
pub struct SideBySide {
    padding: usize,
    changes_only: bool,
    colored: bool,
}

impl Default for SideBySide {
    fn default() -> Self {
        Self {
            padding: 3,
            changes_only: false,
            colored: false,
        }
    }
}

impl SideBySide {
    /// Creates a renderer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of blank columns added after the longest line.
    #[must_use]
    pub const fn padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// Suppresses unchanged rows so that only differing regions are shown.
    #[must_use]
    pub const fn changes_only(mut self, changes_only: bool) -> Self {
        self.changes_only = changes_only;
        self
    }

    /// Colors rows by kind of change.
    #[must_use]
    pub const fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Renders the differences between `expected` and `actual`.
    pub fn render(&self, expected: &str, actual: &str) -> String {
        let rendered = Rendered {
            options: *self,
            expected,
            actual,
        }
        .to_string();

        tracing::trace!(target: trace_categories::DIFF, "rendered diff:\n{rendered}");

        rendered
    }
}

/// Renders the differences between `expected` and `actual` with default
/// settings.
pub fn diff_side_by_side(expected: &str, actual: &str) -> String {
    SideBySide::default().render(expected, actual)
}

#[derive(Clone, Copy)]
enum Row<'a> {
    Unchanged(&'a str),
    Deleted(&'a str),
    Added(&'a str),
    Modified(&'a str, &'a str),
}

struct Rendered<'a> {
    options: SideBySide,
    expected: &'a str,
    actual: &'a str,
}

impl Rendered<'_> {
    fn width(&self) -> usize {
        self.expected
            .lines()
            .chain(self.actual.lines())
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0)
            + self.options.padding
    }

    fn write_row(&self, f: &mut fmt::Formatter<'_>, width: usize, row: Row<'_>) -> fmt::Result {
        let text = match row {
            Row::Unchanged(line) => {
                if self.options.changes_only {
                    return Ok(());
                }
                format!("{line:<width$}  {line}")
            }
            Row::Deleted(left) => format!("{left:<width$}<"),
            Row::Added(right) => format!("{:<width$}> {right}", ""),
            Row::Modified(left, right) => format!("{left:<width$}| {right}"),
        };

        if self.options.colored {
            let text = match row {
                Row::Unchanged(_) => text.bright_black(),
                Row::Deleted(_) => text.red(),
                Row::Added(_) => text.green(),
                Row::Modified(..) => text.yellow(),
            };
            writeln!(f, "{text}")
        } else {
            writeln!(f, "{text}")
        }
    }

    fn write_block(
        &self,
        f: &mut fmt::Formatter<'_>,
        width: usize,
        deleted: &[&str],
        added: &[&str],
    ) -> fmt::Result {
        if added.is_empty() {
            for left in deleted {
                self.write_row(f, width, Row::Deleted(left))?;
            }
        } else if deleted.is_empty() {
            for right in added {
                self.write_row(f, width, Row::Added(right))?;
            }
        } else {
            for i in 0..deleted.len().max(added.len()) {
                let left = deleted.get(i).copied().unwrap_or_default();
                let right = added.get(i).copied().unwrap_or_default();
                self.write_row(f, width, Row::Modified(left, right))?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.width();

        // Consecutive deletions and additions between unchanged lines are
        // rendered together as one block.
        let mut deleted = vec![];
        let mut added = vec![];

        let expected: Vec<&str> = self.expected.lines().collect();
        let actual: Vec<&str> = self.actual.lines().collect();

        for result in diff::slice(&expected, &actual) {
            match result {
                diff::Result::Left(left) => deleted.push(*left),
                diff::Result::Right(right) => added.push(*right),
                diff::Result::Both(line, _) => {
                    self.write_block(f, width, &deleted, &added)?;
                    deleted.clear();
                    added.clear();

                    self.write_row(f, width, Row::Unchanged(line))?;
                }
            }
        }

        self.write_block(f, width, &deleted, &added)
    }
}
