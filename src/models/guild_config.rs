use poise::serenity_prelude::ChannelId;

/// Where level-up announcements go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LevelUpChannel {
    /// Announce in the channel the triggering message was sent in.
    #[default]
    Unset,
    /// Never announce.
    Disabled,
    Channel(ChannelId),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GuildConfig {
    /// `None` means the guild never configured it, which counts as enabled.
    pub exp_active: Option<bool>,
    pub level_up_channel: LevelUpChannel,
}

impl GuildConfig {
    pub fn exp_enabled(&self) -> bool {
        self.exp_active.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::GuildConfig;

    #[test]
    fn unconfigured_guild_has_exp_enabled() {
        assert!(GuildConfig::default().exp_enabled());
    }

    #[test]
    fn only_explicit_false_disables_exp() {
        let enabled = GuildConfig {
            exp_active: Some(true),
            ..Default::default()
        };
        let disabled = GuildConfig {
            exp_active: Some(false),
            ..Default::default()
        };

        assert!(enabled.exp_enabled());
        assert!(!disabled.exp_enabled());
    }
}
