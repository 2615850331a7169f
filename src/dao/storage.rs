use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
///
/// Every variant is transport-level and transient from the caller's point of
/// view; domain outcomes (missing row, lost conditional insert) are expressed
/// through the return values of the [`GameStore`](crate::dao::game_store::GameStore)
/// methods instead, so retrying a failed call is always safe.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or rejected the request outright.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable context for operators.
        message: String,
        /// Backend-specific failure chained for diagnostics.
        #[source]
        source: Box<dyn Error + Send + Sync>,
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
}
