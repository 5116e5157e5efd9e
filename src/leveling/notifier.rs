use async_trait::async_trait;
use poise::serenity_prelude::{self as serenity, ChannelId};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Channel {0} is unreachable")]
    Unreachable(ChannelId),
    #[error(transparent)]
    Discord(#[from] serenity::Error),
}

/// Where level-up announcements are delivered.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Whether the channel still exists and the bot can see it.
    async fn channel_resolves(&self, channel: ChannelId) -> bool;

    async fn send_to_channel(&self, channel: ChannelId, text: &str) -> Result<(), NotifyError>;
}

/// Sends announcements through the gateway context that delivered the event.
pub struct DiscordNotifier<'a> {
    ctx: &'a serenity::Context,
}

impl<'a> DiscordNotifier<'a> {
    pub fn new(ctx: &'a serenity::Context) -> DiscordNotifier<'a> {
        DiscordNotifier { ctx }
    }
}

#[async_trait]
impl NotificationSink for DiscordNotifier<'_> {
    async fn channel_resolves(&self, channel: ChannelId) -> bool {
        match channel.to_channel(self.ctx).await {
            Ok(_) => true,
            Err(err) => {
                debug!("Channel {channel} does not resolve: {err}");
                false
            }
        }
    }

    async fn send_to_channel(&self, channel: ChannelId, text: &str) -> Result<(), NotifyError> {
        channel.say(&self.ctx.http, text).await?;
        Ok(())
    }
}
