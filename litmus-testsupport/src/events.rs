//! Installation of the tracing subscriber used by tests.

use std::fmt::Display;
use std::sync::{Mutex, PoisonError};

use tracing_subscriber::Layer;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::Error;

/// Type of event to trace.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, clap::ValueEnum)]
pub enum TraceEvent {
    /// Traces rendering of side-by-side diffs.
    #[clap(name = "diff")]
    Diff,
    /// Traces test directory resolution.
    #[clap(name = "dirs")]
    Dirs,
    /// Traces file predicates.
    #[clap(name = "files")]
    Files,
    /// Traces updates to the test-run index.
    #[clap(name = "index")]
    Index,
    /// Traces scanning of log files.
    #[clap(name = "logfile")]
    Logfile,
    /// Traces structural similarity comparisons.
    #[clap(name = "similarity")]
    Similarity,
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.target())
    }
}

impl TraceEvent {
    const fn target(self) -> &'static str {
        match self {
            Self::Diff => "diff",
            Self::Dirs => "dirs",
            Self::Files => "files",
            Self::Index => "index",
            Self::Logfile => "logfile",
            Self::Similarity => "similarity",
        }
    }
}

static INSTALLED: Mutex<bool> = Mutex::new(false);

/// Composes the filter for the given events: everything at `INFO`, plus
/// `TRACE` for each enabled event's target.
pub fn compose_filter(enabled_events: &[TraceEvent]) -> Targets {
    Targets::new()
        .with_default(LevelFilter::INFO)
        .with_targets(
            enabled_events
                .iter()
                .map(|event| (event.target(), tracing::Level::TRACE)),
        )
}

/// Installs a global subscriber writing to the test harness's captured
/// output. Installing more than once is a no-op.
pub fn init(enabled_events: &[TraceEvent]) -> Result<(), Error> {
    let mut installed = INSTALLED.lock().unwrap_or_else(PoisonError::into_inner);
    if *installed {
        return Ok(());
    }

    let layer = tracing_subscriber::fmt::layer()
        .with_test_writer()
        .without_time()
        .with_filter(compose_filter(enabled_events));

    tracing_subscriber::registry().with(layer).try_init()?;
    *installed = true;

    Ok(())
}
