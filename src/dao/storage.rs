use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The realtime database refused a write because it is offline.
    #[error("realtime location `{location}` is offline")]
    Offline { location: String },
    /// A stored value could not be decoded into the expected shape.
    #[error("malformed value at `{location}`")]
    Malformed {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a decoding error for the given location.
    pub fn malformed(location: impl Into<String>, source: serde_json::Error) -> Self {
        StorageError::Malformed {
            location: location.into(),
            source,
        }
    }
}
