use std::time::Duration;

use async_trait::async_trait;
use poise::serenity_prelude::GuildId;
use sqlx::{query, query_as, FromRow, Pool, Sqlite, SqliteConnection};
use tracing::debug;

use crate::models::{GuildConfig, LevelUpChannel};

use super::{
    conversion::{DBConvertible, DBFromConversionError},
    upsert::{bounded, upsert, UpsertRecord},
    StorageError,
};

pub struct GuildConfigRepository {
    pool: Pool<Sqlite>,
    timeout: Duration,
}

impl GuildConfigRepository {
    pub fn new(pool: Pool<Sqlite>, timeout: Duration) -> GuildConfigRepository {
        GuildConfigRepository { pool, timeout }
    }

    /// The stored configuration, or the defaults if the guild never changed anything.
    pub async fn get(&self, guild: GuildId) -> Result<GuildConfig, StorageError> {
        let guild = guild.to_db()?;

        let row = bounded(self.timeout, async {
            let row = query_as::<_, SqlGuildConfig>(
                r#"
                    SELECT exp_active, exp_levelup_channel FROM guild_config
                    WHERE guild_id = $1
                "#,
            )
            .bind(guild)
            .fetch_optional(&self.pool)
            .await?;
            Ok::<_, StorageError>(row)
        })
        .await?;

        match row {
            Some(row) => Ok(row.into_domain()?),
            None => Ok(GuildConfig::default()),
        }
    }

    pub async fn set_exp_active(&self, guild: GuildId, active: bool) -> Result<(), StorageError> {
        let change = GuildConfigChange {
            guild_id: guild.to_db()?,
            field: GuildConfigField::ExpActive(active),
        };
        let outcome = upsert(&self.pool, self.timeout, &change).await?;
        debug!("Set exp_active of {guild} to {active} ({outcome:?})");
        Ok(())
    }

    /// Inverts the effective EXP state and returns the new one. An explicit value is
    /// always stored, so a toggled guild never goes back to "unset".
    pub async fn toggle_exp_active(&self, guild: GuildId) -> Result<bool, StorageError> {
        let active = !self.get(guild).await?.exp_enabled();
        self.set_exp_active(guild, active).await?;
        Ok(active)
    }

    pub async fn set_level_up_channel(
        &self,
        guild: GuildId,
        channel: LevelUpChannel,
    ) -> Result<(), StorageError> {
        let change = GuildConfigChange {
            guild_id: guild.to_db()?,
            field: GuildConfigField::LevelUpChannel(channel.to_db()?),
        };
        let outcome = upsert(&self.pool, self.timeout, &change).await?;
        debug!("Set level up channel of {guild} to {channel:?} ({outcome:?})");
        Ok(())
    }
}

#[derive(Debug, FromRow)]
pub struct SqlGuildConfig {
    exp_active: Option<bool>,
    exp_levelup_channel: Option<i64>,
}

impl SqlGuildConfig {
    fn into_domain(self) -> Result<GuildConfig, DBFromConversionError> {
        Ok(GuildConfig {
            exp_active: self.exp_active,
            level_up_channel: LevelUpChannel::from_db(&self.exp_levelup_channel)?,
        })
    }
}

/// A single guild setting. Other columns of the row are left untouched.
enum GuildConfigField {
    ExpActive(bool),
    LevelUpChannel(Option<i64>),
}

struct GuildConfigChange {
    guild_id: i64,
    field: GuildConfigField,
}

#[async_trait]
impl UpsertRecord for GuildConfigChange {
    async fn update(&self, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
        let result = match self.field {
            GuildConfigField::ExpActive(active) => {
                query("UPDATE guild_config SET exp_active = $1 WHERE guild_id = $2")
                    .bind(active)
                    .bind(self.guild_id)
                    .execute(&mut *conn)
                    .await?
            }

            GuildConfigField::LevelUpChannel(channel) => {
                query("UPDATE guild_config SET exp_levelup_channel = $1 WHERE guild_id = $2")
                    .bind(channel)
                    .bind(self.guild_id)
                    .execute(&mut *conn)
                    .await?
            }
        };

        Ok(result.rows_affected())
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        match self.field {
            GuildConfigField::ExpActive(active) => {
                query("INSERT INTO guild_config (guild_id, exp_active) VALUES ($1, $2)")
                    .bind(self.guild_id)
                    .bind(active)
                    .execute(&mut *conn)
                    .await?;
            }

            GuildConfigField::LevelUpChannel(channel) => {
                query("INSERT INTO guild_config (guild_id, exp_levelup_channel) VALUES ($1, $2)")
                    .bind(self.guild_id)
                    .bind(channel)
                    .execute(&mut *conn)
                    .await?;
            }
        }

        Ok(())
    }
}
