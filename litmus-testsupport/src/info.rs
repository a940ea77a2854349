//! Identity of the running test.

use std::path::{Path, PathBuf};

const PROBE: &str = "__litmus_probe";

/// Identity of a test: the module it is defined in, its function name and the
/// manifest directory of the crate it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestInfo {
    module_path: String,
    method_name: String,
    manifest_dir: PathBuf,
}

/// Captures the [`TestInfo`] of the enclosing test function.
///
/// ```
/// fn renders_report() {
///     let info = litmus_testsupport::test_info!();
///     assert_eq!(info.method_name(), "renders_report");
/// }
/// # renders_report();
/// ```
#[macro_export]
macro_rules! test_info {
    () => {{
        fn __litmus_probe() {}
        $crate::TestInfo::from_probe(
            ::std::any::type_name_of_val(&__litmus_probe),
            env!("CARGO_MANIFEST_DIR"),
        )
    }};
}

impl TestInfo {
    /// Creates a test identity.
    pub fn new(
        module_path: impl Into<String>,
        method_name: impl Into<String>,
        manifest_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            module_path: module_path.into(),
            method_name: method_name.into(),
            manifest_dir: manifest_dir.into(),
        }
    }

    /// Builds an identity from the type name of a probe function declared
    /// inside the test function. Used by [`test_info!`].
    #[doc(hidden)]
    pub fn from_probe(probe: &str, manifest_dir: &str) -> Self {
        let path = probe.strip_suffix(PROBE).unwrap_or(probe);
        let segments: Vec<&str> = path
            .split("::")
            .filter(|segment| !segment.is_empty() && *segment != "{{closure}}")
            .collect();

        match segments.split_last() {
            Some((method, module)) => Self::new(module.join("::"), *method, manifest_dir),
            None => Self::new("", "", manifest_dir),
        }
    }

    /// Path of the module defining the test, e.g. `my_crate::tests`.
    pub fn class_name(&self) -> &str {
        self.module_path.as_str()
    }

    /// Name of the test function.
    pub fn method_name(&self) -> &str {
        self.method_name.as_str()
    }

    /// Name of the test function without any `[...]` parameter suffix.
    pub fn plain_method_name(&self) -> &str {
        self.method_name
            .split_once('[')
            .map_or(self.method_name.as_str(), |(name, _)| name)
    }

    /// Human-readable name, `method (module)`.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.method_name, self.module_path)
    }

    /// Path of the module enclosing the test's module.
    pub fn package_name(&self) -> &str {
        self.module_path
            .rsplit_once("::")
            .map_or("", |(parent, _)| parent)
    }

    /// The test's module path as a relative directory, e.g. `my_crate/tests`.
    pub fn module_dir(&self) -> PathBuf {
        self.module_path.split("::").collect()
    }

    /// The enclosing module path as a relative directory.
    pub fn package_dir(&self) -> PathBuf {
        self.package_name()
            .split("::")
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    /// Manifest directory of the crate defining the test.
    pub fn manifest_dir(&self) -> &Path {
        self.manifest_dir.as_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn captures_enclosing_function() {
        let info = crate::test_info!();

        assert_eq!(info.method_name(), "captures_enclosing_function");
        assert_eq!(info.class_name(), "litmus_testsupport::info::tests");
        assert_eq!(info.package_name(), "litmus_testsupport::info");
        assert_eq!(info.manifest_dir(), Path::new(env!("CARGO_MANIFEST_DIR")));
    }

    #[test]
    fn closures_are_transparent() {
        let infos: Vec<TestInfo> = (0..1).map(|_| crate::test_info!()).collect();

        assert_eq!(infos[0].method_name(), "closures_are_transparent");
    }

    #[test]
    fn names_and_directories() {
        let info = TestInfo::new("app::reports::tests", "renders[2]", "/work");

        assert_eq!(info.display_name(), "renders[2] (app::reports::tests)");
        assert_eq!(info.plain_method_name(), "renders");
        assert_eq!(info.module_dir(), Path::new("app/reports/tests"));
        assert_eq!(info.package_dir(), Path::new("app/reports"));
    }

    #[test]
    fn top_level_module() {
        let info = TestInfo::from_probe("probe_tests::works::__litmus_probe", "/work");

        assert_eq!(info.class_name(), "probe_tests");
        assert_eq!(info.method_name(), "works");
        assert_eq!(info.package_name(), "");
        assert_eq!(info.package_dir(), PathBuf::new());
    }
}
