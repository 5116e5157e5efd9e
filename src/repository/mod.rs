mod conversion;
mod error;
mod exp_repository;
mod guild_config_repository;
mod upsert;

use std::time::Duration;

pub use error::StorageError;
pub use exp_repository::ExpRepository;
pub use guild_config_repository::GuildConfigRepository;

/// Default bound on a single storage operation.
pub const STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    // Every connection to `sqlite::memory:` is its own database, so keep exactly one alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("In-memory database should open");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Migrations should apply to an empty database");

    pool
}
