use crate::{
    commands::{user_err, CommandResult, Context, MAX_CALCULATOR_LEVEL, MAX_EXP},
    leveling::curve::{level_and_remainder, total_exp_for_level},
};

#[poise::command(slash_command, subcommands("level", "exp"), subcommand_required)]
pub async fn rankcalculator(_ctx: Context<'_>) -> CommandResult {
    Ok(())
}

/// Calculate the level you would be at with a given amount of EXP.
#[poise::command(slash_command)]
pub async fn level(
    ctx: Context<'_>,
    #[description = "The input EXP amount"] exp: u64,
) -> CommandResult {
    if exp > MAX_EXP {
        return Err(user_err("The given EXP value is too high"));
    }

    let progress = level_and_remainder(exp);
    ctx.say(format!(
        "With {exp} EXP you would be at level `{}` with `{}` EXP towards the next level",
        progress.level, progress.remainder
    ))
    .await?;

    Ok(())
}

/// Calculate the minimum amount of EXP needed for a particular level.
#[poise::command(slash_command)]
pub async fn exp(
    ctx: Context<'_>,
    #[description = "The input level value"] level: u64,
) -> CommandResult {
    if level > MAX_CALCULATOR_LEVEL {
        return Err(user_err("The given level value is too high"));
    }

    ctx.say(format!(
        "To be at level {level} you would need at least `{}` EXP",
        total_exp_for_level(level)
    ))
    .await?;

    Ok(())
}
