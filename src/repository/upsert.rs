use std::{future::Future, time::Duration};

use async_trait::async_trait;
use sqlx::{Pool, Sqlite, SqliteConnection};
use tracing::debug;

use super::StorageError;

/// A row written with "update, else insert" semantics.
///
/// Tables behind an `UpsertRecord` must carry a uniqueness constraint on the key
/// that `update` filters by, so a concurrent insert shows up as a constraint
/// violation rather than a duplicate row.
#[async_trait]
pub trait UpsertRecord: Send + Sync {
    /// Returns the number of rows affected.
    async fn update(&self, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error>;

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    Updated,
    Inserted,
}

pub async fn upsert<R: UpsertRecord>(
    pool: &Pool<Sqlite>,
    timeout: Duration,
    record: &R,
) -> Result<UpsertOutcome, StorageError> {
    bounded(timeout, async {
        let mut conn = pool.acquire().await?;

        if record.update(&mut *conn).await? > 0 {
            return Ok(UpsertOutcome::Updated);
        }

        match record.insert(&mut *conn).await {
            Ok(()) => Ok(UpsertOutcome::Inserted),

            // Somebody inserted the same key between our update and insert.
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                debug!("Lost an insert race, retrying as update: {err}");
                record.update(&mut *conn).await?;
                Ok(UpsertOutcome::Updated)
            }

            Err(err) => Err(StorageError::from(err)),
        }
    })
    .await
}

/// Runs a storage operation, reporting it as timed out after `timeout`.
pub async fn bounded<T, F>(timeout: Duration, operation: F) -> Result<T, StorageError>
where
    F: Future<Output = Result<T, StorageError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_elapsed) => Err(StorageError::TimedOut(timeout)),
    }
}
