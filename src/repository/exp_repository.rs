use std::time::Duration;

use async_trait::async_trait;
use poise::serenity_prelude::{GuildId, UserId};
use sqlx::{query, query_as, query_scalar, FromRow, Pool, Sqlite, SqliteConnection};
use tracing::debug;

use crate::models::{ExpRecord, RankCardColor};

use super::{
    conversion::{DBConvertible, DBFromConversionError, DBToConversionError},
    upsert::{bounded, upsert, UpsertRecord},
    StorageError,
};

/// Per-guild EXP totals and per-user rank card colours.
pub struct ExpRepository {
    pool: Pool<Sqlite>,
    timeout: Duration,
}

impl ExpRepository {
    pub fn new(pool: Pool<Sqlite>, timeout: Duration) -> ExpRepository {
        ExpRepository { pool, timeout }
    }

    /// EXP of a member, zero if they never earned any.
    pub async fn get_exp(&self, guild: GuildId, user: UserId) -> Result<u64, StorageError> {
        let guild = guild.to_db()?;
        let user = user.to_db()?;

        let exp = bounded(self.timeout, async {
            let exp: Option<i64> =
                query_scalar("SELECT exp FROM user_exp WHERE guild_id = $1 AND user_id = $2")
                    .bind(guild)
                    .bind(user)
                    .fetch_optional(&self.pool)
                    .await?;
            Ok::<_, StorageError>(exp)
        })
        .await?;

        match exp {
            Some(exp) => Ok(u64::from_db(&exp)?),
            None => Ok(0),
        }
    }

    pub async fn set_exp(&self, guild: GuildId, user: UserId, exp: u64) -> Result<(), StorageError> {
        let record = ExpRecord { guild, user, exp }.to_db()?;
        let outcome = upsert(&self.pool, self.timeout, &record).await?;
        debug!("Set EXP of {user} in {guild} to {exp} ({outcome:?})");
        Ok(())
    }

    pub async fn get_color(&self, user: UserId) -> Result<Option<RankCardColor>, StorageError> {
        let user = user.to_db()?;

        let color = bounded(self.timeout, async {
            let color = query_as::<_, SqlRankCard>(
                "SELECT user_id, red, green, blue FROM user_exp_card WHERE user_id = $1",
            )
            .bind(user)
            .fetch_optional(&self.pool)
            .await?;
            Ok::<_, StorageError>(color)
        })
        .await?;

        match color {
            Some(card) => Ok(Some(RankCardColor::from_db(&(card.red, card.green, card.blue))?)),
            None => Ok(None),
        }
    }

    pub async fn set_color(&self, user: UserId, color: RankCardColor) -> Result<(), StorageError> {
        let (red, green, blue) = color.to_db()?;
        let card = SqlRankCard {
            user_id: user.to_db()?,
            red,
            green,
            blue,
        };

        upsert(&self.pool, self.timeout, &card).await?;
        Ok(())
    }

    /// Returns whether there was a colour to clear.
    pub async fn clear_color(&self, user: UserId) -> Result<bool, StorageError> {
        let user = user.to_db()?;

        let deleted = bounded(self.timeout, async {
            let result = query("DELETE FROM user_exp_card WHERE user_id = $1")
                .bind(user)
                .execute(&self.pool)
                .await?;
            Ok::<_, StorageError>(result.rows_affected())
        })
        .await?;

        Ok(deleted > 0)
    }

    /// Number of members in the guild with at least `exp` EXP.
    ///
    /// Members tied on EXP share the lower rank: two members tied at the top of a
    /// guild both have rank 2.
    pub async fn rank_of(&self, guild: GuildId, exp: u64) -> Result<u64, StorageError> {
        let guild = guild.to_db()?;
        let exp = exp.to_db()?;

        let count = bounded(self.timeout, async {
            let count: i64 =
                query_scalar("SELECT COUNT(*) FROM user_exp WHERE guild_id = $1 AND exp >= $2")
                    .bind(guild)
                    .bind(exp)
                    .fetch_one(&self.pool)
                    .await?;
            Ok::<_, StorageError>(count)
        })
        .await?;

        Ok(u64::from_db(&count)?)
    }

    /// Up to `limit` members of the guild, most EXP first. Ties are ordered by user id.
    pub async fn top_n(&self, guild: GuildId, limit: u32) -> Result<Vec<ExpRecord>, StorageError> {
        let guild = guild.to_db()?;

        let rows = bounded(self.timeout, async {
            let rows = query_as::<_, SqlExpRecord>(
                r#"
                    SELECT guild_id, user_id, exp FROM user_exp
                    WHERE guild_id = $1
                    ORDER BY exp DESC, user_id ASC
                    LIMIT $2
                "#,
            )
            .bind(guild)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
            Ok::<_, StorageError>(rows)
        })
        .await?;

        rows.iter()
            .map(|row| ExpRecord::from_db(row).map_err(StorageError::from))
            .collect()
    }
}

#[derive(Debug, FromRow)]
pub struct SqlExpRecord {
    guild_id: i64,
    user_id: i64,
    exp: i64,
}

impl DBConvertible for ExpRecord {
    type DBType = SqlExpRecord;

    fn to_db(&self) -> Result<Self::DBType, DBToConversionError> {
        Ok(SqlExpRecord {
            guild_id: self.guild.to_db()?,
            user_id: self.user.to_db()?,
            exp: self.exp.to_db()?,
        })
    }

    fn from_db(value: &Self::DBType) -> Result<Self, DBFromConversionError> {
        Ok(ExpRecord {
            guild: GuildId::from_db(&value.guild_id)?,
            user: UserId::from_db(&value.user_id)?,
            exp: u64::from_db(&value.exp)?,
        })
    }
}

#[async_trait]
impl UpsertRecord for SqlExpRecord {
    async fn update(&self, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
        let result = query("UPDATE user_exp SET exp = $1 WHERE guild_id = $2 AND user_id = $3")
            .bind(self.exp)
            .bind(self.guild_id)
            .bind(self.user_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        query("INSERT INTO user_exp (guild_id, user_id, exp) VALUES ($1, $2, $3)")
            .bind(self.guild_id)
            .bind(self.user_id)
            .bind(self.exp)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[derive(Debug, FromRow)]
pub struct SqlRankCard {
    user_id: i64,
    red: i64,
    green: i64,
    blue: i64,
}

#[async_trait]
impl UpsertRecord for SqlRankCard {
    async fn update(&self, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
        let result =
            query("UPDATE user_exp_card SET red = $1, green = $2, blue = $3 WHERE user_id = $4")
                .bind(self.red)
                .bind(self.green)
                .bind(self.blue)
                .bind(self.user_id)
                .execute(&mut *conn)
                .await?;
        Ok(result.rows_affected())
    }

    async fn insert(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        query("INSERT INTO user_exp_card (user_id, red, green, blue) VALUES ($1, $2, $3, $4)")
            .bind(self.user_id)
            .bind(self.red)
            .bind(self.green)
            .bind(self.blue)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use poise::serenity_prelude::{GuildId, UserId};
    use sqlx::query_scalar;

    use super::ExpRepository;
    use crate::{
        models::RankCardColor,
        repository::{test_pool, STORAGE_TIMEOUT},
    };

    const GUILD: GuildId = GuildId::new(100);
    const OTHER_GUILD: GuildId = GuildId::new(200);

    async fn repository() -> (ExpRepository, sqlx::SqlitePool) {
        let pool = test_pool().await;
        (ExpRepository::new(pool.clone(), STORAGE_TIMEOUT), pool)
    }

    #[test(tokio::test)]
    async fn missing_record_is_zero() {
        let (exp, _) = repository().await;
        assert_eq!(exp.get_exp(GUILD, UserId::new(1)).await.unwrap(), 0);
    }

    #[test(tokio::test)]
    async fn set_exp_overwrites_single_row() {
        let (exp, pool) = repository().await;
        let user = UserId::new(1);

        exp.set_exp(GUILD, user, 120).await.unwrap();
        assert_eq!(exp.get_exp(GUILD, user).await.unwrap(), 120);

        exp.set_exp(GUILD, user, 80).await.unwrap();
        assert_eq!(exp.get_exp(GUILD, user).await.unwrap(), 80);

        let rows: i64 =
            query_scalar("SELECT COUNT(*) FROM user_exp WHERE guild_id = 100 AND user_id = 1")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(rows, 1);
    }

    #[test(tokio::test)]
    async fn exp_is_per_guild() {
        let (exp, _) = repository().await;
        let user = UserId::new(1);

        exp.set_exp(GUILD, user, 10).await.unwrap();
        exp.set_exp(OTHER_GUILD, user, 20).await.unwrap();

        assert_eq!(exp.get_exp(GUILD, user).await.unwrap(), 10);
        assert_eq!(exp.get_exp(OTHER_GUILD, user).await.unwrap(), 20);
    }

    #[test(tokio::test)]
    async fn rank_counts_members_with_at_least_as_much_exp() {
        let (exp, _) = repository().await;

        exp.set_exp(GUILD, UserId::new(1), 100).await.unwrap();
        exp.set_exp(GUILD, UserId::new(2), 100).await.unwrap();
        exp.set_exp(GUILD, UserId::new(3), 50).await.unwrap();
        exp.set_exp(OTHER_GUILD, UserId::new(4), 1000).await.unwrap();

        assert_eq!(exp.rank_of(GUILD, 100).await.unwrap(), 2);
        assert_eq!(exp.rank_of(GUILD, 50).await.unwrap(), 3);
        assert_eq!(exp.rank_of(GUILD, 101).await.unwrap(), 0);
    }

    #[test(tokio::test)]
    async fn top_n_is_sorted_and_tolerates_large_limit() {
        let (exp, _) = repository().await;

        exp.set_exp(GUILD, UserId::new(1), 30).await.unwrap();
        exp.set_exp(GUILD, UserId::new(2), 90).await.unwrap();
        exp.set_exp(GUILD, UserId::new(3), 60).await.unwrap();
        exp.set_exp(OTHER_GUILD, UserId::new(4), 500).await.unwrap();

        let top = exp.top_n(GUILD, 50).await.unwrap();
        let users = top.iter().map(|r| (r.user.get(), r.exp)).collect::<Vec<_>>();
        assert_eq!(users, vec![(2, 90), (3, 60), (1, 30)]);

        let top = exp.top_n(GUILD, 2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].user, UserId::new(2));
    }

    #[test(tokio::test)]
    async fn top_n_breaks_ties_by_user() {
        let (exp, _) = repository().await;

        exp.set_exp(GUILD, UserId::new(7), 40).await.unwrap();
        exp.set_exp(GUILD, UserId::new(3), 40).await.unwrap();

        let top = exp.top_n(GUILD, 10).await.unwrap();
        assert_eq!(top[0].user, UserId::new(3));
        assert_eq!(top[1].user, UserId::new(7));
    }

    #[test(tokio::test)]
    async fn color_set_update_and_clear() {
        let (exp, _) = repository().await;
        let user = UserId::new(1);

        assert_eq!(exp.get_color(user).await.unwrap(), None);

        exp.set_color(user, RankCardColor::new(1, 2, 3)).await.unwrap();
        exp.set_color(user, RankCardColor::new(255, 0, 128)).await.unwrap();
        assert_eq!(
            exp.get_color(user).await.unwrap(),
            Some(RankCardColor::new(255, 0, 128))
        );

        assert!(exp.clear_color(user).await.unwrap());
        assert_eq!(exp.get_color(user).await.unwrap(), None);
        assert!(!exp.clear_color(user).await.unwrap());
    }

    #[test(tokio::test)]
    async fn unavailable_storage_is_an_error_not_zero() {
        let (exp, pool) = repository().await;
        pool.close().await;

        let err = exp.get_exp(GUILD, UserId::new(1)).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
