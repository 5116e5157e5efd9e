use poise::{serenity_prelude::User, CreateReply};
use tracing::info;

use crate::{
    commands::{guild_id, user_err, CommandResult, Context, MAX_EXP},
    models::LevelUpChannel,
};

#[poise::command(
    slash_command,
    guild_only,
    subcommands("reset", "sethere", "disable"),
    subcommand_required,
    required_permissions = "ADMINISTRATOR",
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn levelupchannel(_ctx: Context<'_>) -> CommandResult {
    Ok(())
}

/// Reset level up alerts to be sent in the message's channel.
#[poise::command(slash_command)]
pub async fn reset(ctx: Context<'_>) -> CommandResult {
    set_level_up_channel(ctx, LevelUpChannel::Unset, "Level up alerts have been reset").await
}

/// Set level up alerts to be sent in the current channel.
#[poise::command(slash_command)]
pub async fn sethere(ctx: Context<'_>) -> CommandResult {
    let channel = LevelUpChannel::Channel(ctx.channel_id());
    set_level_up_channel(ctx, channel, "Level up alerts will now be sent here").await
}

/// Completely disable level up alerts.
#[poise::command(slash_command)]
pub async fn disable(ctx: Context<'_>) -> CommandResult {
    set_level_up_channel(ctx, LevelUpChannel::Disabled, "Level up alerts are now disabled").await
}

async fn set_level_up_channel(
    ctx: Context<'_>,
    channel: LevelUpChannel,
    confirmation: &str,
) -> CommandResult {
    let guild = guild_id(ctx)?;

    ctx.data()
        .guild_config_repository
        .set_level_up_channel(guild, channel)
        .await?;

    info!("{} set the level up channel of {guild} to {channel:?}", ctx.author().id);

    ctx.send(
        CreateReply::default()
            .content(confirmation)
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Toggle whether users should gain EXP for sending messages.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn toggleexp(ctx: Context<'_>) -> CommandResult {
    let guild = guild_id(ctx)?;
    let active = ctx
        .data()
        .guild_config_repository
        .toggle_exp_active(guild)
        .await?;

    info!("{} toggled EXP in {guild}, active: {active}", ctx.author().id);

    let message = if active {
        "EXP has been enabled"
    } else {
        "EXP has been disabled"
    };
    ctx.send(CreateReply::default().content(message).ephemeral(true))
        .await?;

    Ok(())
}

/// Edit the amount of EXP a user has.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn expedit(
    ctx: Context<'_>,
    #[description = "The user to edit EXP for"] user: User,
    #[description = "The new value for the user's EXP"] exp: u64,
) -> CommandResult {
    if exp > MAX_EXP {
        return Err(user_err("That amount of EXP is too high"));
    }

    let guild = guild_id(ctx)?;

    ctx.data()
        .exp_repository
        .set_exp(guild, user.id, exp)
        .await?;

    info!("{} set the EXP of {} in {guild} to {exp}", ctx.author().id, user.id);

    ctx.send(
        CreateReply::default()
            .content("EXP successfully updated")
            .ephemeral(true),
    )
    .await?;

    Ok(())
}
