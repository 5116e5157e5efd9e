use serde::Deserialize;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::{commands, BotState};

/// Feature groups that can be switched on and off in the config.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Plugin {
    /// Rank, leaderboard and rank card commands.
    Ranking,
    /// Level up channel, EXP toggle and EXP editing.
    Admin,
    /// EXP awards for chat messages.
    Experience,
}

impl Plugin {
    pub fn all() -> Vec<Plugin> {
        Plugin::iter().collect()
    }

    pub fn commands(&self) -> Vec<poise::Command<BotState, commands::CommandError>> {
        match self {
            Plugin::Ranking => vec![
                commands::rank(),
                commands::textrank(),
                commands::leaderboard(),
                commands::changerank(),
                commands::resetrank(),
                commands::rankcalculator(),
            ],

            Plugin::Admin => vec![
                commands::levelupchannel(),
                commands::toggleexp(),
                commands::expedit(),
            ],

            Plugin::Experience => vec![],
        }
    }
}

/// Commands of all enabled plugins, each plugin counted once.
pub fn enabled_commands(plugins: &[Plugin]) -> Vec<poise::Command<BotState, commands::CommandError>> {
    let mut seen = Vec::with_capacity(plugins.len());

    plugins
        .iter()
        .filter(|plugin| {
            if seen.contains(*plugin) {
                false
            } else {
                seen.push(**plugin);
                true
            }
        })
        .flat_map(Plugin::commands)
        .collect()
}
