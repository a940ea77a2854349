//! Logging of test lifecycle events.

use std::fmt;

use tracing::Level;

use crate::info::TestInfo;
use crate::trace_categories;

/// Emits `message` at a level chosen at run time.
pub(crate) fn log_at(level: Level, message: fmt::Arguments<'_>) {
    if level == Level::ERROR {
        tracing::error!(target: trace_categories::LIFECYCLE, "{message}");
    } else if level == Level::WARN {
        tracing::warn!(target: trace_categories::LIFECYCLE, "{message}");
    } else if level == Level::INFO {
        tracing::info!(target: trace_categories::LIFECYCLE, "{message}");
    } else if level == Level::DEBUG {
        tracing::debug!(target: trace_categories::LIFECYCLE, "{message}");
    } else {
        tracing::trace!(target: trace_categories::LIFECYCLE, "{message}");
    }
}

/// Logs when tests start and how they end.
#[derive(Clone, Copy, Debug)]
pub struct TestTracer {
    level: Level,
}

impl Default for TestTracer {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl TestTracer {
    /// Creates a tracer logging at `INFO`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level lifecycle messages are logged at.
    #[must_use]
    pub const fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Logs that the test is starting. The returned guard logs the outcome
    /// when dropped: `FAILED` if the thread is panicking, `SUCCEEDED`
    /// otherwise, then `FINISHED`.
    pub fn start(&self, info: &TestInfo) -> TraceGuard {
        let prefix = format!("TEST {}", info.method_name());
        log_at(self.level, format_args!("{prefix} STARTING"));

        TraceGuard {
            level: self.level,
            prefix,
        }
    }
}

/// Logs the outcome of a test when dropped.
#[derive(Debug)]
pub struct TraceGuard {
    level: Level,
    prefix: String,
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        let prefix = &self.prefix;
        if std::thread::panicking() {
            log_at(self.level, format_args!("{prefix} FAILED"));
        } else {
            log_at(self.level, format_args!("{prefix} SUCCEEDED"));
        }
        log_at(self.level, format_args!("{prefix} FINISHED"));
    }
}
