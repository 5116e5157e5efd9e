mod admin;
mod rank_calculator;
mod ranking;

use poise::serenity_prelude::GuildId;

use crate::{repository::StorageError, BotState};

pub use admin::{expedit, levelupchannel, toggleexp};
pub use rank_calculator::rankcalculator;
pub use ranking::{changerank, leaderboard, rank, resetrank, textrank};

type CommandResult = Result<(), CommandError>;
type Context<'a> = poise::Context<'a, BotState, CommandError>;

/// Highest EXP an admin may assign, and the highest the calculator accepts.
const MAX_EXP: u64 = 999_999_999;
const MAX_CALCULATOR_LEVEL: u64 = 1000;

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("{message}")]
    User { message: String },
    #[error("{message}")]
    Internal { message: String },
    #[error(transparent)]
    Serenity(#[from] serenity::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn user_err(message: impl Into<String>) -> CommandError {
    CommandError::User {
        message: message.into(),
    }
}

fn internal_err(message: impl Into<String>) -> CommandError {
    CommandError::Internal {
        message: message.into(),
    }
}

fn guild_id(ctx: Context<'_>) -> Result<GuildId, CommandError> {
    ctx.guild_id()
        .ok_or(internal_err("This command should be executed only in a guild"))
}
