//! Lookup of test data files.

use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::info::TestInfo;
use crate::trace_categories;

/// Resolves test data files, preferring the most specific location.
#[derive(Clone, Debug)]
pub struct TestData {
    data_dir: PathBuf,
    info: TestInfo,
}

impl TestData {
    /// Creates a resolver rooted at `data_dir` for the test identified by
    /// `info`.
    pub fn new(data_dir: impl Into<PathBuf>, info: &TestInfo) -> Self {
        Self {
            data_dir: data_dir.into(),
            info: info.clone(),
        }
    }

    /// Root of the data files.
    pub fn data_dir(&self) -> &Path {
        self.data_dir.as_path()
    }

    /// Locations searched for `path`, most specific first:
    ///
    /// 1. `<data>/<module path>/<method>/<path>`
    /// 2. `<data>/<module path>/<path>`
    /// 3. `<data>/<parent module path>/<path>`
    /// 4. `<data>/<path>`
    pub fn candidates(&self, path: impl AsRef<Path>) -> Vec<PathBuf> {
        let path = path.as_ref();
        let module_dir = self.data_dir.join(self.info.module_dir());

        vec![
            module_dir.join(self.info.plain_method_name()).join(path),
            module_dir.join(path),
            self.data_dir.join(self.info.package_dir()).join(path),
            self.data_dir.join(path),
        ]
    }

    /// Returns the first existing candidate location of `path`.
    pub fn resolve_file(&self, path: impl AsRef<Path>) -> Result<PathBuf, Error> {
        let path = path.as_ref();
        let candidates = self.candidates(path);

        if let Some(found) = candidates.iter().find(|candidate| candidate.exists()) {
            tracing::debug!(
                target: trace_categories::DIRS,
                "resolved {} to {}",
                path.display(),
                found.display()
            );
            return Ok(found.clone());
        }

        Err(Error::PathNotFound {
            path: path.to_path_buf(),
            candidates,
        })
    }
}
