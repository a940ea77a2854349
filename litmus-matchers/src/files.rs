//! Predicates over filesystem paths.
//!
//! Every predicate here implements `Predicate<Path>`. A failing case carries a
//! `found` product describing what was observed instead, and an `error`
//! product when the path could not be inspected.

use std::fmt;
use std::fs;
use std::path::Path;

use predicates::Predicate;
use predicates::ord::EqPredicate;
use predicates::reflection::{Case, PredicateReflection, Product};
use regex::Regex;

use crate::trace_categories;

fn file_kind(path: &Path) -> &'static str {
    if is_file().eval(path) {
        "is a file"
    } else if is_dir().eval(path) {
        "is a directory"
    } else {
        "is neither a file nor a directory"
    }
}

fn entry_list(entries: &[String]) -> String {
    entries.iter().map(|entry| format!("[{entry:?}]")).collect()
}

fn case<'a>(
    predicate: &'a dyn PredicateReflection,
    result: bool,
    path: &Path,
    found: Option<String>,
) -> Case<'a> {
    let mut case = Case::new(Some(predicate), result)
        .add_product(Product::new("path", path.display().to_string()));
    if let Some(found) = found {
        case = case.add_product(Product::new("found", found));
    }
    case
}

fn error_case<'a>(
    predicate: &'a dyn PredicateReflection,
    path: &Path,
    error: &std::io::Error,
) -> Case<'a> {
    tracing::debug!(
        target: trace_categories::FILES,
        "cannot inspect '{}': {error}",
        path.display()
    );
    case(predicate, false, path, None).add_product(Product::new("error", error.to_string()))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Any,
    Directory,
    File,
}

/// Predicate on the existence and kind of a path.
#[derive(Clone, Copy, Debug)]
pub struct FileKind {
    kind: Kind,
}

/// Holds when the path exists.
pub const fn exists() -> FileKind {
    FileKind { kind: Kind::Any }
}

/// Holds when the path is a directory.
pub const fn is_dir() -> FileKind {
    FileKind {
        kind: Kind::Directory,
    }
}

/// Holds when the path is a regular file.
pub const fn is_file() -> FileKind {
    FileKind { kind: Kind::File }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Kind::Any => write!(f, "path exists"),
            Kind::Directory => write!(f, "path is a directory"),
            Kind::File => write!(f, "path is a file"),
        }
    }
}

impl PredicateReflection for FileKind {}

impl Predicate<Path> for FileKind {
    fn eval(&self, variable: &Path) -> bool {
        match self.kind {
            Kind::Any => predicates::path::exists().eval(variable),
            Kind::Directory => predicates::path::is_dir().follow_links(true).eval(variable),
            Kind::File => predicates::path::is_file().follow_links(true).eval(variable),
        }
    }

    fn find_case<'a>(&'a self, expected: bool, variable: &Path) -> Option<Case<'a>> {
        let result = self.eval(variable);
        if result != expected {
            return None;
        }

        let found = if exists().eval(variable) {
            file_kind(variable)
        } else {
            "did not exist"
        };

        Some(case(self, result, variable, Some(found.to_owned())))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Read,
    Write,
}

/// Predicate on whether a path can be opened for reading or writing.
#[derive(Clone, Copy, Debug)]
pub struct FileAccess {
    mode: Mode,
}

/// Holds when the path can be read.
pub const fn readable() -> FileAccess {
    FileAccess { mode: Mode::Read }
}

/// Holds when the path can be written.
pub const fn writable() -> FileAccess {
    FileAccess { mode: Mode::Write }
}

impl FileAccess {
    fn check(self, path: &Path) -> std::io::Result<()> {
        match self.mode {
            Mode::Read if path.is_dir() => fs::read_dir(path).map(|_| ()),
            Mode::Read => fs::File::open(path).map(|_| ()),
            Mode::Write if path.is_dir() => {
                if fs::metadata(path)?.permissions().readonly() {
                    Err(std::io::Error::new(
                        std::io::ErrorKind::PermissionDenied,
                        "directory is read-only",
                    ))
                } else {
                    Ok(())
                }
            }
            // Appending neither creates nor truncates the file.
            Mode::Write => fs::OpenOptions::new()
                .append(true)
                .open(path)
                .map(|_| ()),
        }
    }
}

impl fmt::Display for FileAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::Read => write!(f, "path is readable"),
            Mode::Write => write!(f, "path is writable"),
        }
    }
}

impl PredicateReflection for FileAccess {}

impl Predicate<Path> for FileAccess {
    fn eval(&self, variable: &Path) -> bool {
        self.check(variable).is_ok()
    }

    fn find_case<'a>(&'a self, expected: bool, variable: &Path) -> Option<Case<'a>> {
        let result = self.check(variable).is_ok();
        if result != expected {
            return None;
        }

        let found = (!result).then(|| match self.mode {
            Mode::Read => "not readable".to_owned(),
            Mode::Write => "not writable".to_owned(),
        });

        Some(case(self, result, variable, found))
    }
}

/// Predicate on the size in bytes of a file.
#[derive(Clone, Debug)]
pub struct FileSize<P> {
    size: P,
}

/// Holds when the file is exactly `size` bytes long.
pub fn sized(size: u64) -> FileSize<EqPredicate<u64>> {
    sized_by(predicates::ord::eq(size))
}

/// Holds when the file's size in bytes satisfies `size`.
pub const fn sized_by<P: Predicate<u64>>(size: P) -> FileSize<P> {
    FileSize { size }
}

impl<P: Predicate<u64>> fmt::Display for FileSize<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file sized with {} bytes", self.size)
    }
}

impl<P: Predicate<u64>> PredicateReflection for FileSize<P> {}

impl<P: Predicate<u64>> Predicate<Path> for FileSize<P> {
    fn eval(&self, variable: &Path) -> bool {
        fs::metadata(variable).is_ok_and(|metadata| self.size.eval(&metadata.len()))
    }

    fn find_case<'a>(&'a self, expected: bool, variable: &Path) -> Option<Case<'a>> {
        match fs::metadata(variable) {
            Ok(metadata) => {
                let len = metadata.len();
                let result = self.size.eval(&len);
                (result == expected)
                    .then(|| case(self, result, variable, Some(format!("was {len} bytes"))))
            }
            Err(error) => (!expected).then(|| error_case(self, variable, &error)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Name,
    CanonicalPath,
    AbsolutePath,
}

/// Predicate matching a regular expression against the whole of a path's
/// name, canonical path or absolute path.
#[derive(Clone, Debug)]
pub struct PathPattern {
    target: Target,
    pattern: String,
    regex: Regex,
}

impl PathPattern {
    fn new(target: Target, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            target,
            pattern: pattern.to_owned(),
            regex: Regex::new(&format!("^(?:{pattern})$"))?,
        })
    }

    fn subject(&self, path: &Path) -> std::io::Result<String> {
        let subject = match self.target {
            Target::Name => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Target::CanonicalPath => fs::canonicalize(path)?.to_string_lossy().into_owned(),
            Target::AbsolutePath => std::path::absolute(path)?.to_string_lossy().into_owned(),
        };
        Ok(subject)
    }
}

/// Holds when the final component of the path matches `pattern`.
///
/// # Errors
///
/// Returns an error if `pattern` is not a valid regular expression.
pub fn named(pattern: &str) -> Result<PathPattern, regex::Error> {
    PathPattern::new(Target::Name, pattern)
}

/// Holds when the canonical form of the path matches `pattern`. The path must
/// exist.
///
/// # Errors
///
/// Returns an error if `pattern` is not a valid regular expression.
pub fn with_canonical_path(pattern: &str) -> Result<PathPattern, regex::Error> {
    PathPattern::new(Target::CanonicalPath, pattern)
}

/// Holds when the absolute form of the path matches `pattern`.
///
/// # Errors
///
/// Returns an error if `pattern` is not a valid regular expression.
pub fn with_absolute_path(pattern: &str) -> Result<PathPattern, regex::Error> {
    PathPattern::new(Target::AbsolutePath, pattern)
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Target::Name => write!(f, "file named {:?}", self.pattern),
            Target::CanonicalPath => write!(f, "file with canonical path {:?}", self.pattern),
            Target::AbsolutePath => write!(f, "file with absolute path {:?}", self.pattern),
        }
    }
}

impl PredicateReflection for PathPattern {}

impl Predicate<Path> for PathPattern {
    fn eval(&self, variable: &Path) -> bool {
        self.subject(variable)
            .is_ok_and(|subject| self.regex.is_match(&subject))
    }

    fn find_case<'a>(&'a self, expected: bool, variable: &Path) -> Option<Case<'a>> {
        match self.subject(variable) {
            Ok(subject) => {
                let result = self.regex.is_match(&subject);
                let found = match self.target {
                    Target::Name => format!("named {subject:?}"),
                    Target::CanonicalPath | Target::AbsolutePath => format!("was {subject:?}"),
                };
                (result == expected).then(|| case(self, result, variable, Some(found)))
            }
            Err(error) => (!expected).then(|| error_case(self, variable, &error)),
        }
    }
}

/// Predicate on the presence of text fragments in a file's content.
#[derive(Clone, Debug)]
pub struct FileContent {
    entries: Vec<String>,
    present: bool,
}

/// Holds when the file's content contains every one of `entries`.
pub fn contains<I, S>(entries: I) -> FileContent
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    FileContent {
        entries: entries.into_iter().map(Into::into).collect(),
        present: true,
    }
}

/// Holds when the file's content contains none of `entries`.
pub fn does_not_contain<I, S>(entries: I) -> FileContent
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    FileContent {
        entries: entries.into_iter().map(Into::into).collect(),
        present: false,
    }
}

impl FileContent {
    /// Entries whose presence contradicts this predicate.
    fn offending(&self, content: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| content.contains(entry.as_str()) != self.present)
            .cloned()
            .collect()
    }
}

impl fmt::Display for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.present {
            "contains"
        } else {
            "does not contain"
        };
        write!(f, "file {verb} {}", entry_list(&self.entries))
    }
}

impl PredicateReflection for FileContent {}

impl Predicate<Path> for FileContent {
    fn eval(&self, variable: &Path) -> bool {
        fs::read_to_string(variable).is_ok_and(|content| self.offending(&content).is_empty())
    }

    fn find_case<'a>(&'a self, expected: bool, variable: &Path) -> Option<Case<'a>> {
        match fs::read_to_string(variable) {
            Ok(content) => {
                let offending = self.offending(&content);
                let result = offending.is_empty();
                if result != expected {
                    return None;
                }

                let found = if result {
                    None
                } else if self.present {
                    Some(format!("did not contain {}", entry_list(&offending)))
                } else {
                    Some(format!("contained {}", entry_list(&offending)))
                };

                Some(case(self, result, variable, found))
            }
            Err(error) => (!expected).then(|| error_case(self, variable, &error)),
        }
    }
}

#[allow(clippy::panic_in_result_fn)]
#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;

    fn products(case: &Case<'_>) -> Vec<String> {
        case.products()
            .skip(1)
            .map(|product| product.to_string())
            .collect()
    }

    #[test]
    fn kinds() -> anyhow::Result<()> {
        let temp = assert_fs::TempDir::new()?;
        let file = temp.child("a.txt");
        file.write_str("abc")?;

        assert!(exists().eval(file.path()));
        assert!(is_file().eval(file.path()));
        assert!(!is_dir().eval(file.path()));
        assert!(is_dir().eval(temp.path()));
        assert!(!exists().eval(temp.child("missing").path()));

        let predicate = is_dir();
        let case = predicate
            .find_case(false, file.path())
            .ok_or_else(|| anyhow::anyhow!("no failing case"))?;
        assert_eq!(products(&case), ["found: is a file"]);

        let predicate = is_file();
        let case = predicate
            .find_case(false, temp.child("missing").path())
            .ok_or_else(|| anyhow::anyhow!("no failing case"))?;
        assert_eq!(products(&case), ["found: did not exist"]);

        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn kinds_follow_symlinks() -> anyhow::Result<()> {
        let temp = assert_fs::TempDir::new()?;
        let file = temp.child("a.txt");
        file.touch()?;
        let link = temp.child("link.txt");
        std::os::unix::fs::symlink(file.path(), link.path())?;
        let dangling = temp.child("dangling");
        std::os::unix::fs::symlink(temp.child("missing").path(), dangling.path())?;

        assert!(is_file().eval(link.path()));
        assert!(!is_dir().eval(link.path()));
        assert!(!exists().eval(dangling.path()));

        Ok(())
    }

    #[test]
    fn size() -> anyhow::Result<()> {
        let temp = assert_fs::TempDir::new()?;
        let file = temp.child("a.txt");
        file.write_str("abcd")?;

        assert!(sized(4).eval(file.path()));
        assert!(sized_by(predicates::ord::gt(2)).eval(file.path()));

        let predicate = sized(3);
        let case = predicate
            .find_case(false, file.path())
            .ok_or_else(|| anyhow::anyhow!("no failing case"))?;
        assert_eq!(products(&case), ["found: was 4 bytes"]);

        Ok(())
    }

    #[test]
    fn names_match_whole_regex() -> anyhow::Result<()> {
        let temp = assert_fs::TempDir::new()?;
        let file = temp.child("report-01.log");

        assert!(named(r"report-\d+\.log")?.eval(file.path()));
        assert!(!named("report")?.eval(file.path()));
        assert!(named("[").is_err());

        let predicate = named("other")?;
        let case = predicate
            .find_case(false, file.path())
            .ok_or_else(|| anyhow::anyhow!("no failing case"))?;
        assert_eq!(products(&case), [r#"found: named "report-01.log""#]);

        Ok(())
    }

    #[test]
    fn canonical_and_absolute_paths() -> anyhow::Result<()> {
        let temp = assert_fs::TempDir::new()?;
        let file = temp.child("a.txt");
        file.touch()?;

        assert!(with_canonical_path(".*a\\.txt")?.eval(file.path()));
        assert!(with_absolute_path(".*a\\.txt")?.eval(file.path()));
        // Canonicalization requires the path to exist.
        assert!(!with_canonical_path(".*")?.eval(temp.child("missing").path()));

        Ok(())
    }

    #[test]
    fn content() -> anyhow::Result<()> {
        let temp = assert_fs::TempDir::new()?;
        let file = temp.child("a.txt");
        file.write_str("alpha\nbeta\n")?;

        assert!(contains(["alpha", "beta"]).eval(file.path()));
        assert!(does_not_contain(["gamma"]).eval(file.path()));

        let predicate = contains(["alpha", "gamma", "delta"]);
        let case = predicate
            .find_case(false, file.path())
            .ok_or_else(|| anyhow::anyhow!("no failing case"))?;
        assert_eq!(
            products(&case),
            [r#"found: did not contain ["gamma"]["delta"]"#]
        );

        let predicate = does_not_contain(["beta"]);
        let case = predicate
            .find_case(false, file.path())
            .ok_or_else(|| anyhow::anyhow!("no failing case"))?;
        assert_eq!(products(&case), [r#"found: contained ["beta"]"#]);

        Ok(())
    }

    #[test]
    fn unreadable_content_is_a_mismatch() -> anyhow::Result<()> {
        let temp = assert_fs::TempDir::new()?;
        let missing = temp.child("missing.txt");

        assert!(!contains(["x"]).eval(missing.path()));

        let predicate = contains(["x"]);
        let case = predicate
            .find_case(false, missing.path())
            .ok_or_else(|| anyhow::anyhow!("no failing case"))?;
        assert!(case.products().any(|product| product.name() == "error"));

        Ok(())
    }

    #[test]
    fn access() -> anyhow::Result<()> {
        let temp = assert_fs::TempDir::new()?;
        let file = temp.child("a.txt");
        file.touch()?;

        assert!(readable().eval(file.path()));
        assert!(writable().eval(file.path()));
        assert!(readable().eval(temp.path()));
        assert!(!readable().eval(temp.child("missing").path()));
        // Checking writability must not create the file.
        assert!(!writable().eval(temp.child("missing").path()));
        assert!(!temp.child("missing").path().exists());

        Ok(())
    }

    #[test]
    fn descriptions() -> anyhow::Result<()> {
        assert_eq!(is_dir().to_string(), "path is a directory");
        assert_eq!(named("a.*")?.to_string(), r#"file named "a.*""#);
        assert_eq!(
            contains(["a", "b"]).to_string(),
            r#"file contains ["a"]["b"]"#
        );

        Ok(())
    }
}
