use std::time::Duration;

use thiserror::Error;

use super::conversion::{DBFromConversionError, DBToConversionError};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage is unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
    #[error("Storage did not respond within {0:?}")]
    TimedOut(Duration),
    #[error("Stored data is invalid: {0}")]
    InvalidRow(#[from] DBFromConversionError),
    #[error("Value cannot be stored: {0}")]
    InvalidValue(#[from] DBToConversionError),
}

impl StorageError {
    /// The backing store could not be reached or did not answer in time.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StorageError::Unavailable(_) | StorageError::TimedOut(_))
    }
}
