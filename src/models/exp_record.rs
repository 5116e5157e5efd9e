use poise::serenity_prelude::{GuildId, UserId};

/// EXP a member has collected in one guild.
///
/// A missing row is the same as a record with zero EXP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpRecord {
    pub guild: GuildId,
    pub user: UserId,
    pub exp: u64,
}
