use std::{collections::HashMap, sync::Mutex};

use poise::serenity_prelude::{GuildId, UserId};
use time::{Duration, OffsetDateTime};

/// Time a member has to wait between two EXP awards in the same guild.
pub const AWARD_COOLDOWN: Duration = Duration::seconds(60);

/// In-memory award cooldowns, keyed by guild and then by member.
///
/// Entries are overwritten on every award and never removed; an expired entry
/// behaves exactly like a missing one.
#[derive(Debug, Default)]
pub struct CooldownTable {
    expiries: Mutex<HashMap<GuildId, HashMap<UserId, OffsetDateTime>>>,
}

impl CooldownTable {
    pub fn new() -> CooldownTable {
        CooldownTable::default()
    }

    pub fn is_hot(&self, guild: GuildId, user: UserId, now: OffsetDateTime) -> bool {
        let expiries = self.lock();
        expiries
            .get(&guild)
            .and_then(|users| users.get(&user))
            .is_some_and(|expiry| now < *expiry)
    }

    /// Starts a cooldown unless one is already running.
    ///
    /// Returns `false` without touching the table if the member is still cooling
    /// down. Check and update happen under one lock, so two concurrent messages
    /// can't both win.
    pub fn try_start(
        &self,
        guild: GuildId,
        user: UserId,
        now: OffsetDateTime,
        cooldown: Duration,
    ) -> bool {
        let mut expiries = self.lock();
        let users = expiries.entry(guild).or_default();

        if users.get(&user).is_some_and(|expiry| now < *expiry) {
            return false;
        }

        users.insert(user, now + cooldown);
        true
    }

    /// Number of members with a cooldown entry in the guild, expired or not.
    #[cfg(test)]
    pub fn entries(&self, guild: GuildId) -> usize {
        self.lock().get(&guild).map_or(0, HashMap::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<GuildId, HashMap<UserId, OffsetDateTime>>> {
        // The map stays consistent even if a holder panicked: every write is a single insert.
        self.expiries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude::{GuildId, UserId};
    use time::{Duration, OffsetDateTime};

    use super::{CooldownTable, AWARD_COOLDOWN};

    const GUILD: GuildId = GuildId::new(1);
    const USER: UserId = UserId::new(2);

    #[test]
    fn first_award_starts_cooldown() {
        let table = CooldownTable::new();
        let now = OffsetDateTime::now_utc();

        assert!(!table.is_hot(GUILD, USER, now));
        assert!(table.try_start(GUILD, USER, now, AWARD_COOLDOWN));
        assert!(table.is_hot(GUILD, USER, now));
        assert!(!table.try_start(GUILD, USER, now + Duration::seconds(59), AWARD_COOLDOWN));
    }

    #[test]
    fn expiry_is_exclusive() {
        let table = CooldownTable::new();
        let now = OffsetDateTime::now_utc();

        assert!(table.try_start(GUILD, USER, now, AWARD_COOLDOWN));
        assert!(!table.is_hot(GUILD, USER, now + AWARD_COOLDOWN));
        assert!(table.try_start(GUILD, USER, now + AWARD_COOLDOWN, AWARD_COOLDOWN));
        assert!(table.is_hot(GUILD, USER, now + AWARD_COOLDOWN + Duration::seconds(1)));
    }

    #[test]
    fn guilds_and_users_are_independent() {
        let table = CooldownTable::new();
        let now = OffsetDateTime::now_utc();

        assert!(table.try_start(GUILD, USER, now, AWARD_COOLDOWN));
        assert!(table.try_start(GuildId::new(9), USER, now, AWARD_COOLDOWN));
        assert!(table.try_start(GUILD, UserId::new(9), now, AWARD_COOLDOWN));
        assert_eq!(table.entries(GUILD), 2);
    }

    #[test]
    fn concurrent_starts_award_once() {
        let table = CooldownTable::new();
        let now = OffsetDateTime::now_utc();

        let winners = std::thread::scope(|scope| {
            let handles = (0..8)
                .map(|_| scope.spawn(|| table.try_start(GUILD, USER, now, AWARD_COOLDOWN)))
                .collect::<Vec<_>>();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|won| *won)
                .count()
        });

        assert_eq!(winners, 1);
    }
}
