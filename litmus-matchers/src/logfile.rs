//! Predicates scanning a log file line by line.
//!
//! A log file predicate holds as soon as one line matches. When the predicate
//! is inverted with [`PredicateBooleanExt::not`](predicates::prelude::PredicateBooleanExt::not),
//! the failure names the offending line.

use std::fmt;
use std::fs;
use std::path::Path;

use predicates::Predicate;
use predicates::reflection::{Case, PredicateReflection, Product};
use regex::Regex;

use crate::trace_categories;

#[derive(Clone, Debug)]
enum LineMatcher {
    Text(String),
    Pattern(Regex),
    ErrorType(String),
}

impl LineMatcher {
    fn matches(&self, line: &str) -> bool {
        match self {
            Self::Text(text) => line.contains(text.as_str()),
            Self::Pattern(regex) => regex.is_match(line),
            Self::ErrorType(type_name) => line.contains(&format!("{type_name}:")),
        }
    }
}

/// Predicate holding when some line of a log file matches.
#[derive(Clone, Debug)]
pub struct LogFile {
    matcher: LineMatcher,
    // As given by the caller, for display.
    source: String,
}

/// Holds when some line contains `text`.
pub fn has_text(text: impl Into<String>) -> LogFile {
    let text = text.into();
    LogFile {
        source: text.clone(),
        matcher: LineMatcher::Text(text),
    }
}

/// Holds when some line matches `pattern` in its entirety.
///
/// # Errors
///
/// Returns an error if `pattern` is not a valid regular expression.
pub fn has_text_matching(pattern: &str) -> Result<LogFile, regex::Error> {
    Ok(LogFile {
        source: pattern.to_owned(),
        matcher: LineMatcher::Pattern(Regex::new(&format!("^(?:{pattern})$"))?),
    })
}

/// Holds when some line reports an error of the named type, i.e. contains
/// `"<type_name>:"`.
pub fn has_error_of_type(type_name: impl Into<String>) -> LogFile {
    let type_name = type_name.into();
    LogFile {
        source: type_name.clone(),
        matcher: LineMatcher::ErrorType(type_name),
    }
}

struct Hit {
    number: usize,
    line: String,
}

impl LogFile {
    /// Returns the first matching line.
    ///
    /// # Panics
    ///
    /// Panics if the log file cannot be read.
    #[allow(clippy::panic)]
    fn scan(&self, path: &Path) -> Option<Hit> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) => panic!("failed to read log file '{}': {error}", path.display()),
        };

        let hit = content
            .lines()
            .enumerate()
            .find(|(_, line)| self.matcher.matches(line))
            .map(|(index, line)| Hit {
                number: index + 1,
                line: line.to_owned(),
            });

        tracing::trace!(
            target: trace_categories::LOGFILE,
            "scanned '{}' for {self}: {}",
            path.display(),
            hit.as_ref()
                .map_or_else(|| "no match".to_owned(), |hit| format!("line {}", hit.number))
        );

        hit
    }

    fn absence(&self) -> String {
        match &self.matcher {
            LineMatcher::Text(_) | LineMatcher::ErrorType(_) => {
                format!("did not contain {:?}", self.source)
            }
            LineMatcher::Pattern(_) => format!("did not match {:?}", self.source),
        }
    }
}

impl fmt::Display for LogFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.matcher {
            LineMatcher::Text(_) => write!(f, "log file contains {:?}", self.source),
            LineMatcher::Pattern(_) => write!(f, "log file matches {:?}", self.source),
            LineMatcher::ErrorType(_) => {
                write!(f, "log file contains error of type {:?}", self.source)
            }
        }
    }
}

impl PredicateReflection for LogFile {}

impl Predicate<Path> for LogFile {
    fn eval(&self, variable: &Path) -> bool {
        self.scan(variable).is_some()
    }

    fn find_case<'a>(&'a self, expected: bool, variable: &Path) -> Option<Case<'a>> {
        let hit = self.scan(variable);
        let result = hit.is_some();
        if result != expected {
            return None;
        }

        let name = variable.file_name().map_or_else(
            || variable.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );

        let found = match hit {
            Some(hit) => format!("contained on line {}: {:?}", hit.number, hit.line),
            None => self.absence(),
        };

        Some(
            Case::new(Some(self), result)
                .add_product(Product::new("log file", name))
                .add_product(Product::new("found", found)),
        )
    }
}

#[allow(clippy::panic_in_result_fn)]
#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use predicates::prelude::PredicateBooleanExt;
    use pretty_assertions::assert_eq;

    const LOG: &str = "\
2024-01-01 INFO starting
2024-01-01 WARN disk almost full
2024-01-01 ERROR io::Error: connection reset
";

    fn log_file() -> anyhow::Result<(assert_fs::TempDir, std::path::PathBuf)> {
        let temp = assert_fs::TempDir::new()?;
        let log = temp.child("server.log");
        log.write_str(LOG)?;
        let path = log.path().to_path_buf();
        Ok((temp, path))
    }

    fn products(case: &Case<'_>) -> Vec<String> {
        case.products().map(|product| product.to_string()).collect()
    }

    #[test]
    fn text() -> anyhow::Result<()> {
        let (_temp, log) = log_file()?;

        assert!(has_text("disk almost").eval(log.as_path()));
        assert!(!has_text("shutdown").eval(log.as_path()));

        let predicate = has_text("shutdown");
        let case = predicate
            .find_case(false, log.as_path())
            .ok_or_else(|| anyhow::anyhow!("no failing case"))?;
        assert_eq!(
            products(&case),
            ["log file: server.log", r#"found: did not contain "shutdown""#]
        );

        Ok(())
    }

    #[test]
    fn pattern_must_match_whole_line() -> anyhow::Result<()> {
        let (_temp, log) = log_file()?;

        assert!(has_text_matching(r".*WARN.*")?.eval(log.as_path()));
        assert!(!has_text_matching("WARN")?.eval(log.as_path()));

        Ok(())
    }

    #[test]
    fn error_type() -> anyhow::Result<()> {
        let (_temp, log) = log_file()?;

        assert!(has_error_of_type("io::Error").eval(log.as_path()));
        assert!(!has_error_of_type("fmt::Error").eval(log.as_path()));

        Ok(())
    }

    #[test]
    fn inverted_reports_offending_line() -> anyhow::Result<()> {
        let (_temp, log) = log_file()?;
        let predicate = has_error_of_type("io::Error").not();

        assert!(!predicate.eval(log.as_path()));

        let case = predicate
            .find_case(false, log.as_path())
            .ok_or_else(|| anyhow::anyhow!("no failing case"))?;
        let child = case
            .children()
            .next()
            .ok_or_else(|| anyhow::anyhow!("no inner case"))?;
        assert_eq!(
            products(child),
            [
                "log file: server.log",
                r#"found: contained on line 3: "2024-01-01 ERROR io::Error: connection reset""#
            ]
        );

        Ok(())
    }

    #[test]
    #[should_panic(expected = "failed to read log file")]
    fn missing_log_file_panics() {
        has_text("x").eval(Path::new("/nonexistent/litmus/server.log"));
    }
}
