//! Integration tests for file and log-file predicates.

#![allow(clippy::panic_in_result_fn)]

use anyhow::Result;
use assert_fs::prelude::*;
use litmus_matchers::predicates::prelude::*;
use litmus_matchers::{check, files, logfile};
use pretty_assertions::assert_eq;

#[test]
fn combined_file_predicates() -> Result<()> {
    let temp = assert_fs::TempDir::new()?;
    let report = temp.child("report.txt");
    report.write_str("status: ok\n")?;

    let predicate = files::is_file()
        .and(files::named(r"report\.\w+")?)
        .and(files::contains(["status: ok"]))
        .and(files::does_not_contain(["status: failed"]));

    check(report.path(), &predicate)?;

    Ok(())
}

#[test]
fn check_renders_file_mismatch() -> Result<()> {
    let temp = assert_fs::TempDir::new()?;

    let failure = check(temp.path(), &files::is_file())
        .err()
        .ok_or_else(|| anyhow::anyhow!("check passed"))?;

    assert_eq!(
        failure.message(),
        format!(
            "expected: path is a file\n  path: {}\n  found: is a directory",
            temp.path().display()
        )
    );

    Ok(())
}

#[test]
fn log_without_errors() -> Result<()> {
    let temp = assert_fs::TempDir::new()?;
    let log = temp.child("app.log");
    log.write_str("INFO started\nWARN slow response\nINFO stopped\n")?;

    check(log.path(), &logfile::has_text("started"))?;
    check(log.path(), &logfile::has_error_of_type("TimeoutError").not())?;

    let failure = check(log.path(), &logfile::has_text("slow").not())
        .err()
        .ok_or_else(|| anyhow::anyhow!("check passed"))?;
    assert!(
        failure
            .message()
            .ends_with(r#"found: contained on line 2: "WARN slow response""#)
    );

    Ok(())
}
