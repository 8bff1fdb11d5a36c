use std::error::Error;
use thiserror::Error;

/// Result alias shared by every statistics storage operation.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by statistics storage backends regardless of the underlying
/// database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Wrap any backend failure into an unavailable error.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
