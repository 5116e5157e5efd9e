mod exp_record;
mod guild_config;
mod rank_card;

pub use exp_record::ExpRecord;
pub use guild_config::{GuildConfig, LevelUpChannel};
pub use rank_card::RankCardColor;
