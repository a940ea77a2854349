//! Error types for matchers.

/// Failure raised by an accessor or element producer while a value is being
/// inspected.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct AccessError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl AccessError {
    /// Creates an access error with the given message and no underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error.
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }
}

/// Error that aborts a similarity comparison. Distinct from a value being
/// dissimilar, which is a normal outcome.
#[derive(thiserror::Error, Debug)]
pub enum SimilarityError {
    /// An accessor or element producer failed while being read.
    #[error("failed to read value at '{path}': {source}")]
    Accessor {
        /// Path of the value that could not be read.
        path: String,
        /// The underlying failure.
        #[source]
        source: AccessError,
    },
}

/// A failed assertion, carrying the rendered explanation.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct AssertionFailure {
    message: String,
}

impl AssertionFailure {
    pub(crate) const fn new(message: String) -> Self {
        Self { message }
    }

    /// Returns the rendered explanation of the failure.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}
