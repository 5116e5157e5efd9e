use poise::serenity_prelude::{GuildId, UserId};

use crate::{
    models::RankCardColor,
    repository::{ExpRepository, StorageError},
};

use super::curve::level_and_remainder;

/// Everything shown on a member's rank card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankInfo {
    pub exp: u64,
    pub level: u64,
    /// EXP collected towards the next level.
    pub remaining: u64,
    pub rank: u64,
    /// EXP needed to get from `level` to the next one.
    pub next_level_exp: u64,
    pub color: RankCardColor,
    /// Whether `color` was picked by the member rather than the fallback.
    pub custom_color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user: UserId,
    pub exp: u64,
    pub level: u64,
}

pub async fn build_rank_info(
    exp_repository: &ExpRepository,
    guild: GuildId,
    user: UserId,
    fallback_color: RankCardColor,
) -> Result<RankInfo, StorageError> {
    let exp = exp_repository.get_exp(guild, user).await?;
    let progress = level_and_remainder(exp);
    let rank = exp_repository.rank_of(guild, exp).await?;
    let custom_color = exp_repository.get_color(user).await?;

    Ok(RankInfo {
        exp,
        level: progress.level,
        remaining: progress.remainder,
        rank,
        next_level_exp: progress.next_level_exp(),
        color: custom_color.unwrap_or(fallback_color),
        custom_color: custom_color.is_some(),
    })
}

pub async fn build_leaderboard(
    exp_repository: &ExpRepository,
    guild: GuildId,
    top: u32,
) -> Result<Vec<LeaderboardEntry>, StorageError> {
    let records = exp_repository.top_n(guild, top).await?;

    Ok(records
        .into_iter()
        .map(|record| LeaderboardEntry {
            user: record.user,
            exp: record.exp,
            level: level_and_remainder(record.exp).level,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use poise::serenity_prelude::{GuildId, UserId};

    use super::{build_leaderboard, build_rank_info, LeaderboardEntry, RankInfo};
    use crate::{
        models::RankCardColor,
        repository::{test_pool, ExpRepository, STORAGE_TIMEOUT},
    };

    const GUILD: GuildId = GuildId::new(1);
    const FALLBACK: RankCardColor = RankCardColor {
        red: 10,
        green: 20,
        blue: 30,
    };

    async fn repository() -> ExpRepository {
        ExpRepository::new(test_pool().await, STORAGE_TIMEOUT)
    }

    #[test(tokio::test)]
    async fn rank_info_of_active_member() {
        let exp = repository().await;
        exp.set_exp(GUILD, UserId::new(1), 400).await.unwrap();
        exp.set_exp(GUILD, UserId::new(2), 1000).await.unwrap();
        exp.set_color(UserId::new(1), RankCardColor::new(1, 2, 3))
            .await
            .unwrap();

        let info = build_rank_info(&exp, GUILD, UserId::new(1), FALLBACK)
            .await
            .unwrap();

        assert_eq!(
            info,
            RankInfo {
                exp: 400,
                level: 2,
                remaining: 25,
                rank: 2,
                next_level_exp: 295,
                color: RankCardColor::new(1, 2, 3),
                custom_color: true,
            }
        );
    }

    #[test(tokio::test)]
    async fn rank_info_of_unknown_member_uses_fallback() {
        let exp = repository().await;
        exp.set_exp(GUILD, UserId::new(1), 10).await.unwrap();

        let info = build_rank_info(&exp, GUILD, UserId::new(9), FALLBACK)
            .await
            .unwrap();

        assert_eq!(info.exp, 0);
        assert_eq!(info.level, 0);
        assert_eq!(info.next_level_exp, 155);
        assert_eq!(info.rank, 1);
        assert_eq!(info.color, FALLBACK);
        assert!(!info.custom_color);
    }

    #[test(tokio::test)]
    async fn leaderboard_has_levels() {
        let exp = repository().await;
        exp.set_exp(GUILD, UserId::new(1), 154).await.unwrap();
        exp.set_exp(GUILD, UserId::new(2), 375).await.unwrap();

        let board = build_leaderboard(&exp, GUILD, 15).await.unwrap();

        assert_eq!(
            board,
            vec![
                LeaderboardEntry {
                    user: UserId::new(2),
                    exp: 375,
                    level: 2,
                },
                LeaderboardEntry {
                    user: UserId::new(1),
                    exp: 154,
                    level: 0,
                },
            ]
        );
    }

    #[test(tokio::test)]
    async fn empty_leaderboard() {
        let exp = repository().await;
        assert!(build_leaderboard(&exp, GUILD, 15).await.unwrap().is_empty());
    }
}
