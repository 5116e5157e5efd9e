use poise::{
    serenity_prelude::{self as serenity, FullEvent, Message},
    FrameworkContext,
};
use tracing::info;

use crate::{
    commands::CommandError,
    leveling::{AwardOutcome, DiscordNotifier, InboundMessage},
    BotState,
};

pub async fn handle_event(
    ctx: &serenity::Context,
    event: &FullEvent,
    framework: FrameworkContext<'_, BotState, CommandError>,
    data: &BotState,
) -> Result<(), CommandError> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!(
                "Connected to {} on {} guilds. {} commands registered.",
                data_about_bot.user.name,
                data_about_bot.guilds.len(),
                framework.options().commands.len(),
            );
        }

        FullEvent::Message { new_message } => on_message(ctx, new_message, data).await?,

        _ => {}
    }

    Ok(())
}

async fn on_message(
    ctx: &serenity::Context,
    message: &Message,
    data: &BotState,
) -> Result<(), CommandError> {
    let Some(pipeline) = &data.award_pipeline else {
        return Ok(());
    };

    // Direct messages don't earn EXP.
    let Some(guild) = message.guild_id else {
        return Ok(());
    };

    let inbound = InboundMessage {
        author: message.author.id,
        author_is_bot: message.author.bot,
        guild,
        channel: message.channel_id,
    };

    match pipeline
        .on_message(inbound, &DiscordNotifier::new(ctx))
        .await
    {
        Ok(AwardOutcome::Awarded {
            new_level,
            old_level,
            ..
        }) if new_level > old_level => {
            info!("{} levelled up to {new_level} in {guild}", message.author.id);
            Ok(())
        }

        Ok(_) => Ok(()),

        // Logged once, by the framework's event handler error arm.
        Err(err) => Err(err.into()),
    }
}
