use crate::leveling::RankInfo;

pub const PROGRESS_BAR_WIDTH: usize = 20;

/// A fixed-width text bar, e.g. `[█████     ]`, without the brackets.
pub fn progress_bar(progress: u64, total: u64, width: usize) -> String {
    let filled = if total == 0 {
        width
    } else {
        let ratio = (progress as f64 / total as f64).clamp(0.0, 1.0);
        (ratio * width as f64).round() as usize
    };

    "█".repeat(filled) + &" ".repeat(width - filled)
}

pub fn format_text_rank(name: &str, info: &RankInfo) -> String {
    format!(
        "**{name}**: `{exp}` **EXP** | `{level}` **LV** | `{rank}` **RANK**\n`[{bar}]` **{remaining} / {next}**",
        exp = info.exp,
        level = info.level,
        rank = info.rank,
        bar = progress_bar(info.remaining, info.next_level_exp, PROGRESS_BAR_WIDTH),
        remaining = info.remaining,
        next = info.next_level_exp,
    )
}

#[cfg(test)]
mod tests {
    use super::{format_text_rank, progress_bar};
    use crate::{leveling::RankInfo, models::RankCardColor};

    #[test]
    fn empty_and_full_bars() {
        assert_eq!(progress_bar(0, 100, 4), "    ");
        assert_eq!(progress_bar(100, 100, 4), "████");
    }

    #[test]
    fn bar_rounds_to_nearest_cell() {
        assert_eq!(progress_bar(50, 100, 4), "██  ");
        assert_eq!(progress_bar(37, 100, 4), "█   ");
        assert_eq!(progress_bar(38, 100, 4), "██  ");
    }

    #[test]
    fn bar_never_overflows() {
        assert_eq!(progress_bar(500, 100, 3).chars().count(), 3);
        assert_eq!(progress_bar(1, 0, 3), "███");
    }

    #[test]
    fn text_rank() {
        let info = RankInfo {
            exp: 400,
            level: 2,
            remaining: 25,
            rank: 3,
            next_level_exp: 295,
            color: RankCardColor::DEFAULT,
            custom_color: false,
        };

        assert_eq!(
            format_text_rank("someone", &info),
            "**someone**: `400` **EXP** | `2` **LV** | `3` **RANK**\n`[██                  ]` **25 / 295**"
        );
    }
}
