mod award;
mod cooldown;
mod notifier;
mod rank;

pub mod curve;

pub use award::{AwardOutcome, AwardPipeline, InboundMessage};
pub use notifier::{DiscordNotifier, NotificationSink};
pub use rank::{build_leaderboard, build_rank_info, RankInfo};
