use indoc::formatdoc;
use poise::{
    serenity_prelude::{CreateAllowedMentions, CreateEmbed, GuildId, Mentionable, User},
    CreateReply,
};
use rand::seq::SliceRandom;

use crate::{
    commands::{guild_id, CommandError, CommandResult, Context},
    leveling::{build_leaderboard, build_rank_info},
    models::RankCardColor,
    repository::ExpRepository,
    utils::formatting::{format_text_rank, progress_bar, PROGRESS_BAR_WIDTH},
};

const LEADERBOARD_SIZE: u32 = 15;

const RANK_TIPS: &[&str] = &[
    "**Tip:** If the text is hard to read, you can change the color with /changerank",
    "**Tip:** If you don't like the color of your rank card, you can change it with /changerank",
];

/// Check your current level, rank, and distance from the next level.
#[poise::command(slash_command, guild_only)]
pub async fn rank(
    ctx: Context<'_>,
    #[description = "Optional user to get rank for"] member: Option<User>,
) -> CommandResult {
    let guild = guild_id(ctx)?;
    let user = member.as_ref().unwrap_or_else(|| ctx.author());
    let fallback_color = user
        .accent_colour
        .map(RankCardColor::from)
        .unwrap_or(RankCardColor::DEFAULT);

    let info = build_rank_info(&ctx.data().exp_repository, guild, user.id, fallback_color).await?;

    let embed = CreateEmbed::new()
        .title(&user.name)
        .thumbnail(user.face())
        .colour(info.color)
        .field("Level", info.level.to_string(), true)
        .field("EXP", info.exp.to_string(), true)
        .field("Rank", format!("#{}", info.rank), true)
        .field(
            "Progress",
            format!(
                "`[{}]` {} / {}",
                progress_bar(info.remaining, info.next_level_exp, PROGRESS_BAR_WIDTH),
                info.remaining,
                info.next_level_exp
            ),
            false,
        );

    let mut reply = CreateReply::default().embed(embed);

    if !info.custom_color && user.id == ctx.author().id {
        let tip = RANK_TIPS.choose(&mut rand::thread_rng()).copied();
        if let Some(tip) = tip {
            reply = reply.content(tip);
        }
    }

    ctx.send(reply).await?;

    Ok(())
}

/// A version of /rank that uses text only.
#[poise::command(slash_command, guild_only)]
pub async fn textrank(
    ctx: Context<'_>,
    #[description = "Optional user to get rank for"] member: Option<User>,
) -> CommandResult {
    let guild = guild_id(ctx)?;
    let user = member.as_ref().unwrap_or_else(|| ctx.author());

    let info = build_rank_info(
        &ctx.data().exp_repository,
        guild,
        user.id,
        RankCardColor::DEFAULT,
    )
    .await?;

    ctx.say(format_text_rank(&user.name, &info)).await?;

    Ok(())
}

/// View the members with the most EXP across the whole server.
#[poise::command(slash_command, guild_only)]
pub async fn leaderboard(ctx: Context<'_>) -> CommandResult {
    let guild = guild_id(ctx)?;
    ctx.defer().await?;

    let Some(message) = leaderboard_message(&ctx.data().exp_repository, guild).await? else {
        ctx.say("Nobody has any EXP in this server!").await?;
        return Ok(());
    };

    ctx.send(
        CreateReply::default()
            .content(message)
            .allowed_mentions(CreateAllowedMentions::new()),
    )
    .await?;

    Ok(())
}

/// Set the color of your rank card. It should be given as RGB values.
#[poise::command(slash_command)]
pub async fn changerank(
    ctx: Context<'_>,
    #[description = "Must be between 0 and 255"] red: u8,
    #[description = "Must be between 0 and 255"] green: u8,
    #[description = "Must be between 0 and 255"] blue: u8,
) -> CommandResult {
    let color = RankCardColor::new(red, green, blue);

    ctx.data()
        .exp_repository
        .set_color(ctx.author().id, color)
        .await?;

    ctx.send(
        CreateReply::default()
            .content("Rank card updated")
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// Reset the color of your rank card to the default.
#[poise::command(slash_command)]
pub async fn resetrank(ctx: Context<'_>) -> CommandResult {
    ctx.data()
        .exp_repository
        .clear_color(ctx.author().id)
        .await?;

    ctx.send(
        CreateReply::default()
            .content("Rank card reset")
            .ephemeral(true),
    )
    .await?;

    Ok(())
}

/// The leaderboard text for a guild, or `None` if nobody has EXP yet.
async fn leaderboard_message(
    exp_repository: &ExpRepository,
    guild: GuildId,
) -> Result<Option<String>, CommandError> {
    let board = build_leaderboard(exp_repository, guild, LEADERBOARD_SIZE).await?;
    if board.is_empty() {
        return Ok(None);
    }

    let list = board
        .iter()
        .enumerate()
        .fold(String::new(), |acc, (place, entry)| {
            acc + &format!(
                "**{}.** {} | `{}` EXP | level `{}`\n",
                place + 1,
                entry.user.mention(),
                entry.exp,
                entry.level,
            )
        });

    Ok(Some(formatdoc! {
        r#"
            # Leaderboard

            {list}
        "#,
        list = list,
    }))
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use poise::serenity_prelude::{GuildId, UserId};

    use super::leaderboard_message;
    use crate::{
        commands::CommandError,
        repository::{test_pool, ExpRepository, STORAGE_TIMEOUT},
    };

    const GUILD: GuildId = GuildId::new(100);

    #[test(tokio::test)]
    async fn empty_guild_has_no_leaderboard() {
        let exp = ExpRepository::new(test_pool().await, STORAGE_TIMEOUT);

        assert!(leaderboard_message(&exp, GUILD).await.unwrap().is_none());
    }

    #[test(tokio::test)]
    async fn leaderboard_lists_members_by_exp() {
        let exp = ExpRepository::new(test_pool().await, STORAGE_TIMEOUT);
        exp.set_exp(GUILD, UserId::new(1), 100).await.unwrap();
        exp.set_exp(GUILD, UserId::new(2), 300).await.unwrap();

        let message = leaderboard_message(&exp, GUILD).await.unwrap().unwrap();

        assert!(message.starts_with("# Leaderboard"));
        let first = message.find("**1.** <@2> | `300` EXP").unwrap();
        let second = message.find("**2.** <@1> | `100` EXP").unwrap();
        assert!(first < second);
    }

    #[test(tokio::test)]
    async fn unreachable_storage_keeps_its_error_kind() {
        let pool = test_pool().await;
        let exp = ExpRepository::new(pool.clone(), STORAGE_TIMEOUT);
        pool.close().await;

        match leaderboard_message(&exp, GUILD).await {
            Err(CommandError::Storage(err)) => assert!(err.is_unavailable()),
            other => panic!("expected an unavailable storage error, got {other:?}"),
        }
    }
}
