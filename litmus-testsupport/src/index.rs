//! Persistent index of test runs.
//!
//! The index lives in `index.yaml` under an index directory. Each test that
//! touches the index is assigned the next value of a shared counter, gets an
//! entry in the file and a directory named after its number where it may keep
//! artifacts. Entries record the outcome and duration of the test along with
//! any information and links the test chose to record.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::info::TestInfo;
use crate::trace_categories;
use crate::util::create_dir;

const INDEX_FILE: &str = "index.yaml";

// Serializes read-modify-write cycles on index files within this process.
static INDEX_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    INDEX_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct IndexFile {
    counter: u64,
    #[serde(default)]
    tests: Vec<TestEntry>,
}

/// A test recorded in the index.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct TestEntry {
    /// Number of the test within the index.
    pub index: u64,
    /// Module path of the test.
    pub module: String,
    /// Function name of the test.
    pub method: String,
    /// Whether the test succeeded; absent until it has finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Duration of the test in whole seconds; absent until it has finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Message of the failure that ended the test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
    /// Information and links recorded by the test.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub infos: Vec<InfoEntry>,
}

/// A key/value pair recorded by a test.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct InfoEntry {
    /// Key of the entry.
    pub key: String,
    /// Value of the entry; for links, a path relative to the index directory
    /// or a URL.
    pub value: String,
    /// Whether the value is a link.
    #[serde(default)]
    pub link: bool,
}

fn load(path: &Path) -> Result<IndexFile, Error> {
    if !path.exists() {
        return Ok(IndexFile::default());
    }

    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

fn save(path: &Path, index: &IndexFile) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }

    fs::write(path, serde_yaml::to_string(index)?)?;
    Ok(())
}

/// An index directory shared by many tests.
#[derive(Clone, Debug)]
pub struct TestIndex {
    index_dir: PathBuf,
}

impl TestIndex {
    /// Opens the index in `index_dir`. Nothing is written until a test uses
    /// the index.
    pub fn new(index_dir: impl Into<PathBuf>) -> Self {
        Self {
            index_dir: index_dir.into(),
        }
    }

    /// Directory holding the index.
    pub fn index_dir(&self) -> &Path {
        self.index_dir.as_path()
    }

    /// Reads the entries currently recorded in the index.
    pub fn entries(&self) -> Result<Vec<TestEntry>, Error> {
        let _lock = lock();
        Ok(load(&self.index_file())?.tests)
    }

    /// Starts tracking the test identified by `info`. The test is added to the
    /// index on first use of the returned handle, or when it is dropped.
    pub fn start(&self, info: &TestInfo) -> IndexedTest {
        IndexedTest {
            index_dir: self.index_dir.clone(),
            module: info.class_name().to_owned(),
            method: info.method_name().to_owned(),
            started: Instant::now(),
            state: None,
            outcome: None,
        }
    }

    fn index_file(&self) -> PathBuf {
        self.index_dir.join(INDEX_FILE)
    }
}

#[derive(Debug)]
struct Registered {
    index: u64,
    directory: PathBuf,
}

#[derive(Debug)]
enum Outcome {
    Succeeded,
    Failed(String),
}

/// A test tracked in an index. Dropping the handle records the duration of
/// the test and, unless already recorded, its outcome: failed if the thread is
/// panicking, succeeded otherwise.
#[derive(Debug)]
pub struct IndexedTest {
    index_dir: PathBuf,
    module: String,
    method: String,
    started: Instant,
    state: Option<Registered>,
    outcome: Option<Outcome>,
}

impl IndexedTest {
    /// Number of the test within the index.
    pub fn index(&mut self) -> Result<u64, Error> {
        Ok(self.register()?.index)
    }

    /// Directory reserved for this test's artifacts.
    pub fn directory(&mut self) -> Result<PathBuf, Error> {
        Ok(self.register()?.directory.clone())
    }

    /// Subdirectory `name` of this test's directory, created if missing.
    pub fn directory_named(&mut self, name: impl AsRef<Path>) -> Result<PathBuf, Error> {
        let dir = self.directory()?.join(name);
        create_dir(&dir)?;
        Ok(dir)
    }

    /// Records a key/value pair.
    pub fn record_info(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        self.record(key.into(), value.into(), false)
    }

    /// Records a link, such as a URL.
    pub fn record_link(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        self.record(key.into(), value.into(), true)
    }

    /// Records a link to `file`, relative to the index directory. Nothing is
    /// recorded if the file does not exist.
    pub fn record_link_to_file(
        &mut self,
        key: impl Into<String>,
        file: &Path,
    ) -> Result<(), Error> {
        if !file.exists() {
            tracing::debug!(
                target: trace_categories::INDEX,
                "not linking missing file {}",
                file.display()
            );
            return Ok(());
        }

        self.register()?;
        let relative = relative_path(&self.index_dir, file)?;
        self.record_link(key, relative.to_string_lossy())
    }

    /// Marks the test as succeeded.
    pub fn succeeded(&mut self) -> Result<(), Error> {
        self.outcome = Some(Outcome::Succeeded);
        self.update(|entry| {
            entry.success = Some(true);
            entry.failure_message = None;
        })
    }

    /// Marks the test as failed with `message`.
    pub fn failed(&mut self, message: impl Into<String>) -> Result<(), Error> {
        let message = message.into();
        self.outcome = Some(Outcome::Failed(message.clone()));
        self.update(|entry| {
            entry.success = Some(false);
            entry.failure_message = Some(message);
        })
    }

    fn record(&mut self, key: String, value: String, link: bool) -> Result<(), Error> {
        self.update(|entry| entry.infos.push(InfoEntry { key, value, link }))
    }

    fn register(&mut self) -> Result<&Registered, Error> {
        let registered = match self.state.take() {
            Some(registered) => registered,
            None => self.create_entry()?,
        };

        Ok(self.state.insert(registered))
    }

    fn create_entry(&self) -> Result<Registered, Error> {
        let index_file = self.index_dir.join(INDEX_FILE);

        let index = {
            let _lock = lock();
            let mut file = load(&index_file)?;
            file.counter += 1;
            file.tests.push(TestEntry {
                index: file.counter,
                module: self.module.clone(),
                method: self.method.clone(),
                ..TestEntry::default()
            });
            save(&index_file, &file)?;
            file.counter
        };

        let directory = self.index_dir.join(index.to_string());
        create_dir(&directory)?;

        tracing::debug!(
            target: trace_categories::INDEX,
            "registered {}::{} as test {index}",
            self.module,
            self.method
        );

        Ok(Registered { index, directory })
    }

    fn update(&mut self, change: impl FnOnce(&mut TestEntry)) -> Result<(), Error> {
        let index = self.register()?.index;
        let index_file = self.index_dir.join(INDEX_FILE);

        let _lock = lock();
        let mut file = load(&index_file)?;
        if let Some(entry) = file.tests.iter_mut().find(|entry| entry.index == index) {
            change(entry);
        }
        save(&index_file, &file)
    }

    fn finish(&mut self) -> Result<(), Error> {
        let duration = self.started.elapsed().as_secs();
        let outcome = match self.outcome.take() {
            Some(outcome) => outcome,
            None if std::thread::panicking() => Outcome::Failed("test panicked".to_owned()),
            None => Outcome::Succeeded,
        };

        self.update(|entry| {
            entry.duration = Some(duration);
            match outcome {
                Outcome::Succeeded => entry.success = Some(true),
                Outcome::Failed(message) => {
                    entry.success = Some(false);
                    entry.failure_message = Some(message);
                }
            }
        })
    }
}

impl Drop for IndexedTest {
    fn drop(&mut self) {
        if let Err(error) = self.finish() {
            tracing::warn!(
                target: trace_categories::INDEX,
                "failed to record outcome of {}::{}: {error}",
                self.module,
                self.method
            );
        }
    }
}

/// Path of `to` relative to the directory `from`, climbing with `..` when
/// `to` lies outside `from`. Both paths must exist.
pub fn relative_path(from: &Path, to: &Path) -> Result<PathBuf, Error> {
    let from = fs::canonicalize(from)?;
    let to = fs::canonicalize(to)?;

    match pathdiff::diff_paths(&to, &from) {
        Some(relative) => Ok(relative),
        None => Err(Error::NoRelativePath { from, to }),
    }
}
