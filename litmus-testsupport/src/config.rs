//! Configuration for test support, read from the environment.

use std::path::PathBuf;

use clap::Parser;

use crate::error::Error;
use crate::events::TraceEvent;

/// Settings shared by the test support facilities. Every setting may be
/// supplied through an environment variable.
#[derive(Clone, Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct SupportConfig {
    /// Base directory of the crate under test; defaults to its manifest
    /// directory.
    #[clap(long = "basedir", env = "LITMUS_BASEDIR")]
    pub base_dir: Option<PathBuf>,

    /// Build output directory; defaults to `target` under the base directory.
    #[clap(long = "target-dir", env = "CARGO_TARGET_DIR")]
    pub target_dir: Option<PathBuf>,

    /// Directory for temporary files; defaults to the target directory.
    #[clap(long = "tmpdir", env = "LITMUS_TMPDIR")]
    pub tmp_dir: Option<PathBuf>,

    /// Root of test data files; defaults to `tests/data` under the base
    /// directory.
    #[clap(long = "data-dir", env = "LITMUS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory holding the test-run index; defaults to `test-index` under
    /// the target directory.
    #[clap(long = "index-dir", env = "LITMUS_INDEX_DIR")]
    pub index_dir: Option<PathBuf>,

    /// Level at which test lifecycle and `log` messages are emitted.
    #[clap(long = "trace-level", env = "LITMUS_TRACE_LEVEL", default_value_t = tracing::Level::INFO)]
    pub trace_level: tracing::Level,

    /// Areas to trace in detail.
    #[clap(long = "trace", env = "LITMUS_TRACE", value_delimiter = ',')]
    pub trace_events: Vec<TraceEvent>,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            target_dir: None,
            tmp_dir: None,
            data_dir: None,
            index_dir: None,
            trace_level: tracing::Level::INFO,
            trace_events: vec![],
        }
    }
}

impl SupportConfig {
    /// Reads the configuration from environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self::try_parse_from([env!("CARGO_PKG_NAME")])?)
    }
}
