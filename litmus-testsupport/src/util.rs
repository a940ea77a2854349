//! Directories of the crate under test.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SupportConfig;
use crate::error::Error;
use crate::info::TestInfo;
use crate::trace_categories;

/// Resolves paths against the base directory of the crate under test and
/// creates temporary files for a test.
#[derive(Clone, Debug)]
pub struct TestUtil {
    info: TestInfo,
    base_dir: PathBuf,
    target_dir: PathBuf,
    tmp_dir: Option<PathBuf>,
}

impl TestUtil {
    /// Creates a helper for the test identified by `info`.
    pub fn new(config: &SupportConfig, info: &TestInfo) -> Self {
        let base_dir = config
            .base_dir
            .clone()
            .unwrap_or_else(|| info.manifest_dir().to_path_buf());
        let target_dir = config
            .target_dir
            .clone()
            .unwrap_or_else(|| base_dir.join("target"));

        tracing::trace!(
            target: trace_categories::DIRS,
            "base directory: {}",
            base_dir.display()
        );

        Self {
            info: info.clone(),
            base_dir,
            target_dir,
            tmp_dir: config.tmp_dir.clone(),
        }
    }

    /// Base directory of the crate under test.
    pub fn base_dir(&self) -> &Path {
        self.base_dir.as_path()
    }

    /// Build output directory.
    pub fn target_dir(&self) -> &Path {
        self.target_dir.as_path()
    }

    /// Directory temporary files are created in; the target directory unless
    /// overridden.
    pub fn tmp_dir(&self) -> &Path {
        self.tmp_dir.as_deref().unwrap_or(&self.target_dir)
    }

    /// Overrides the directory temporary files are created in.
    pub fn set_tmp_dir(&mut self, tmp_dir: impl Into<PathBuf>) {
        self.tmp_dir = Some(tmp_dir.into());
    }

    /// Resolves `path` against the base directory. An absolute path is
    /// returned unchanged, with a warning.
    pub fn resolve_file(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            tracing::warn!(
                target: trace_categories::DIRS,
                "given path is already absolute; nothing to resolve: {}",
                path.display()
            );
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Creates an empty file named `<prefix>-<random>.tmp` in the temporary
    /// directory. The file is kept after the test.
    pub fn create_temp_file(&self, prefix: &str) -> Result<PathBuf, Error> {
        Self::create_temp_file_in(self.tmp_dir(), prefix)
    }

    /// Creates an empty file named `<prefix>-<random>.tmp` in `dir`.
    pub fn create_temp_file_in(dir: &Path, prefix: &str) -> Result<PathBuf, Error> {
        create_dir(dir)?;

        let file = tempfile::Builder::new()
            .prefix(&format!("{prefix}-"))
            .suffix(".tmp")
            .tempfile_in(dir)?;
        let (_, path) = file.keep().map_err(|error| error.error)?;

        Ok(path)
    }

    /// Creates a directory named `<prefix>-<random>.tmp` in the temporary
    /// directory. The directory is kept after the test.
    pub fn create_temp_dir(&self, prefix: &str) -> Result<PathBuf, Error> {
        Self::create_temp_dir_in(self.tmp_dir(), prefix)
    }

    /// Creates a directory named `<prefix>-<random>.tmp` in `dir`.
    pub fn create_temp_dir_in(dir: &Path, prefix: &str) -> Result<PathBuf, Error> {
        create_dir(dir)?;

        let temp_dir = tempfile::Builder::new()
            .prefix(&format!("{prefix}-"))
            .suffix(".tmp")
            .tempdir_in(dir)?;

        Ok(temp_dir.keep())
    }

    /// Path of `path` in the test's own area under `target/<root>`, i.e.
    /// `target/<root>/<module path>/<method>/<path>`.
    pub fn method_target_file(&self, root: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
        self.target_dir
            .join(root)
            .join(self.info.module_dir())
            .join(self.info.plain_method_name())
            .join(path)
    }
}

/// Creates `path` and its parents if missing.
pub(crate) fn create_dir(path: &Path) -> Result<(), Error> {
    fs::create_dir_all(path).map_err(|source| Error::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}

#[allow(clippy::panic_in_result_fn)]
#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn util(base: &Path) -> TestUtil {
        let config = SupportConfig {
            base_dir: Some(base.to_path_buf()),
            ..SupportConfig::default()
        };
        TestUtil::new(&config, &TestInfo::new("app::tests", "renders[1]", "/unused"))
    }

    #[test]
    fn directories() {
        let util = util(Path::new("/work/app"));

        assert_eq!(util.base_dir(), Path::new("/work/app"));
        assert_eq!(util.target_dir(), Path::new("/work/app/target"));
        assert_eq!(util.tmp_dir(), Path::new("/work/app/target"));
        assert_eq!(
            util.resolve_file("conf/app.yaml"),
            Path::new("/work/app/conf/app.yaml")
        );
        assert_eq!(util.resolve_file("/etc/hosts"), Path::new("/etc/hosts"));
        assert_eq!(
            util.method_target_file("reports", "out.txt"),
            Path::new("/work/app/target/reports/app/tests/renders/out.txt")
        );
    }

    #[test]
    fn defaults_to_manifest_dir() {
        let info = TestInfo::new("app::tests", "renders", "/work/crate");
        let util = TestUtil::new(&SupportConfig::default(), &info);

        assert_eq!(util.base_dir(), Path::new("/work/crate"));
    }

    #[test]
    fn temp_files() -> anyhow::Result<()> {
        let temp = assert_fs::TempDir::new()?;
        let mut util = util(temp.path());
        util.set_tmp_dir(temp.path().join("scratch"));

        let file = util.create_temp_file("report")?;
        assert!(file.is_file());
        assert_eq!(file.parent(), Some(temp.path().join("scratch").as_path()));

        let name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        assert!(name.starts_with("report-"));
        assert!(name.ends_with(".tmp"));

        let dir = util.create_temp_dir("work")?;
        assert!(dir.is_dir());

        Ok(())
    }
}
