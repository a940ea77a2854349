use std::path::PathBuf;

/// Error type for test support facilities.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A path could not be resolved in any of the candidate locations.
    #[error("path {} not found in any of: {}", .path.display(), display_paths(.candidates))]
    PathNotFound {
        /// The path being resolved.
        path: PathBuf,
        /// Locations that were tried, in order.
        candidates: Vec<PathBuf>,
    },

    /// A directory could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirectory {
        /// The directory.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// No relative path leads from one path to the other.
    #[error("no relative path from {} to {}", .from.display(), .to.display())]
    NoRelativePath {
        /// The directory the path would be relative to.
        from: PathBuf,
        /// The path that was to be made relative.
        to: PathBuf,
    },

    /// The configuration could not be read from the environment.
    #[error("invalid configuration: {0}")]
    Config(#[from] clap::Error),

    /// The test index could not be read or written.
    #[error("failed to read or write test index: {0}")]
    Index(#[from] serde_yaml::Error),

    /// Tracing could not be initialized.
    #[error("failed to initialize tracing: {0}")]
    TracingInit(#[from] tracing_subscriber::util::TryInitError),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
