//! Per-test bundle of support facilities.

use std::fmt::Display;
use std::path::PathBuf;

use crate::config::SupportConfig;
use crate::data::TestData;
use crate::error::Error;
use crate::events;
use crate::index::TestIndex;
use crate::info::TestInfo;
use crate::tracer::{TestTracer, TraceGuard, log_at};
use crate::util::TestUtil;

/// Creates a [`TestSupport`] for the enclosing test function, configured from
/// the environment.
///
/// ```
/// fn writes_report() -> Result<(), litmus_testsupport::Error> {
///     let support = litmus_testsupport::test_support!()?;
///     support.log("writing report");
///     Ok(())
/// }
/// # writes_report().unwrap();
/// ```
#[macro_export]
macro_rules! test_support {
    () => {
        $crate::TestSupport::new($crate::test_info!())
    };
}

/// Everything a test commonly needs: its identity, directories and tracing.
/// Creating the bundle logs that the test is starting; dropping it logs how
/// the test ended.
#[derive(Debug)]
pub struct TestSupport {
    config: SupportConfig,
    info: TestInfo,
    util: TestUtil,
    _trace: TraceGuard,
}

impl TestSupport {
    /// Creates the bundle for the test identified by `info`, reading the
    /// configuration from the environment.
    pub fn new(info: TestInfo) -> Result<Self, Error> {
        Ok(Self::with_config(SupportConfig::from_env()?, info))
    }

    /// Creates the bundle for the test identified by `info`.
    pub fn with_config(config: SupportConfig, info: TestInfo) -> Self {
        if let Err(error) = events::init(&config.trace_events) {
            tracing::debug!("tracing not installed: {error}");
        }

        let util = TestUtil::new(&config, &info);
        let trace = TestTracer::new()
            .with_level(config.trace_level)
            .start(&info);

        Self {
            config,
            info,
            util,
            _trace: trace,
        }
    }

    /// The configuration in effect.
    pub const fn config(&self) -> &SupportConfig {
        &self.config
    }

    /// Identity of the test.
    pub const fn info(&self) -> &TestInfo {
        &self.info
    }

    /// Directory helper for the test.
    pub const fn util(&self) -> &TestUtil {
        &self.util
    }

    /// Mutable directory helper for the test.
    pub const fn util_mut(&mut self) -> &mut TestUtil {
        &mut self.util
    }

    /// Test data resolver, rooted at the configured data directory or
    /// `tests/data` under the base directory.
    pub fn test_data(&self) -> TestData {
        let data_dir = self
            .config
            .data_dir
            .clone()
            .unwrap_or_else(|| self.util.resolve_file("tests/data"));
        TestData::new(data_dir, &self.info)
    }

    /// Test-run index, in the configured index directory or `test-index`
    /// under the target directory.
    pub fn test_index(&self) -> TestIndex {
        TestIndex::new(self.index_dir())
    }

    /// Logs `message` at the configured trace level.
    pub fn log(&self, message: impl Display) {
        log_at(self.config.trace_level, format_args!("{message}"));
    }

    fn index_dir(&self) -> PathBuf {
        self.config
            .index_dir
            .clone()
            .unwrap_or_else(|| self.util.target_dir().join("test-index"))
    }
}
