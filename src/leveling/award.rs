use std::{ops::RangeInclusive, sync::Arc};

use poise::serenity_prelude::{ChannelId, GuildId, Mentionable, UserId};
use rand::Rng;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
    models::{GuildConfig, LevelUpChannel},
    repository::{ExpRepository, GuildConfigRepository, StorageError},
};

use super::{
    cooldown::{CooldownTable, AWARD_COOLDOWN},
    curve::level_and_remainder,
    NotificationSink,
};

/// EXP granted per eligible message, inclusive on both ends.
pub const AWARD_RANGE: RangeInclusive<u64> = 15..=25;

/// The parts of a chat message the award pipeline cares about.
#[derive(Clone, Copy, Debug)]
pub struct InboundMessage {
    pub author: UserId,
    pub author_is_bot: bool,
    pub guild: GuildId,
    pub channel: ChannelId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AwardOutcome {
    BotAuthor,
    ExpInactive,
    CoolingDown,
    Awarded {
        old_exp: u64,
        new_exp: u64,
        old_level: u64,
        new_level: u64,
        /// Channel the level-up announcement was delivered to, if any.
        announced_in: Option<ChannelId>,
    },
}

/// Grants EXP for chat activity, at most once per member per guild per cooldown.
pub struct AwardPipeline {
    exp_repository: Arc<ExpRepository>,
    guild_config_repository: Arc<GuildConfigRepository>,
    cooldowns: CooldownTable,
}

impl AwardPipeline {
    pub fn new(
        exp_repository: Arc<ExpRepository>,
        guild_config_repository: Arc<GuildConfigRepository>,
    ) -> AwardPipeline {
        AwardPipeline {
            exp_repository,
            guild_config_repository,
            cooldowns: CooldownTable::new(),
        }
    }

    #[cfg(test)]
    pub fn cooldowns(&self) -> &CooldownTable {
        &self.cooldowns
    }

    #[tracing::instrument(skip(self, sink))]
    pub async fn on_message(
        &self,
        message: InboundMessage,
        sink: &dyn NotificationSink,
    ) -> Result<AwardOutcome, StorageError> {
        let award = rand::thread_rng().gen_range(AWARD_RANGE);
        self.on_message_at(message, sink, OffsetDateTime::now_utc(), award)
            .await
    }

    async fn on_message_at(
        &self,
        message: InboundMessage,
        sink: &dyn NotificationSink,
        now: OffsetDateTime,
        award: u64,
    ) -> Result<AwardOutcome, StorageError> {
        let InboundMessage {
            author,
            guild,
            author_is_bot,
            ..
        } = message;

        if author_is_bot {
            return Ok(AwardOutcome::BotAuthor);
        }

        // Skip the config lookup for members that are certainly not eligible.
        if self.cooldowns.is_hot(guild, author, now) {
            return Ok(AwardOutcome::CoolingDown);
        }

        // Inactive guilds must not start a cooldown, or re-enabling EXP would
        // swallow the next award.
        let config = self.guild_config_repository.get(guild).await?;
        if !config.exp_enabled() {
            return Ok(AwardOutcome::ExpInactive);
        }

        if !self.cooldowns.try_start(guild, author, now, AWARD_COOLDOWN) {
            return Ok(AwardOutcome::CoolingDown);
        }

        let old_exp = self.exp_repository.get_exp(guild, author).await?;
        let old_level = level_and_remainder(old_exp).level;

        let new_exp = old_exp.saturating_add(award);
        self.exp_repository.set_exp(guild, author, new_exp).await?;
        let new_level = level_and_remainder(new_exp).level;

        debug!("Awarded {award} EXP to {author} in {guild}, now at {new_exp}");

        // The EXP is committed at this point; announcing can only fail on its own.
        let announced_in = if new_level > old_level {
            info!("{author} reached level {new_level} in {guild}");
            self.announce_level_up(&config, &message, new_level, sink)
                .await
        } else {
            None
        };

        Ok(AwardOutcome::Awarded {
            old_exp,
            new_exp,
            old_level,
            new_level,
            announced_in,
        })
    }

    async fn announce_level_up(
        &self,
        config: &GuildConfig,
        message: &InboundMessage,
        level: u64,
        sink: &dyn NotificationSink,
    ) -> Option<ChannelId> {
        let channel = match config.level_up_channel {
            LevelUpChannel::Disabled => return None,

            LevelUpChannel::Unset => message.channel,

            LevelUpChannel::Channel(channel) => {
                if !sink.channel_resolves(channel).await {
                    debug!(
                        "Level up channel {channel} of {} is gone, not announcing",
                        message.guild
                    );
                    return None;
                }
                channel
            }
        };

        match sink
            .send_to_channel(channel, &level_up_message(message.author, level))
            .await
        {
            Ok(()) => Some(channel),
            Err(err) => {
                warn!(
                    "Could not announce level {level} of {} in {channel}: {err}",
                    message.author
                );
                None
            }
        }
    }
}

pub fn level_up_message(user: UserId, level: u64) -> String {
    format!("{} Your level has raised to **{level}**!", user.mention())
}
