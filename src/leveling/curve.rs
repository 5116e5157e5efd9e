//! The level curve: how much EXP each level costs.
//!
//! Levels start at 0 and are unbounded. All functions here are pure.

/// A total EXP amount split into a level and the EXP collected towards the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u64,
    pub remainder: u64,
}

impl LevelProgress {
    /// EXP needed to get from this level to the next.
    pub fn next_level_exp(&self) -> u64 {
        exp_for_level_step(self.level + 1)
    }
}

/// EXP needed to advance from `level - 1` to `level`.
pub fn exp_for_level_step(level: u64) -> u64 {
    5u64.saturating_mul(level.saturating_mul(level))
        .saturating_add(50u64.saturating_mul(level))
        .saturating_add(100)
}

pub fn level_and_remainder(total_exp: u64) -> LevelProgress {
    let mut level = 0;
    let mut remainder = total_exp;

    while remainder >= exp_for_level_step(level + 1) {
        level += 1;
        remainder -= exp_for_level_step(level);
    }

    LevelProgress { level, remainder }
}

/// Minimum total EXP of a member at `level`.
pub fn total_exp_for_level(level: u64) -> u64 {
    (1..=level).fold(0u64, |total, level| {
        total.saturating_add(exp_for_level_step(level))
    })
}

#[cfg(test)]
mod tests {
    use super::{exp_for_level_step, level_and_remainder, total_exp_for_level, LevelProgress};

    fn progress(level: u64, remainder: u64) -> LevelProgress {
        LevelProgress { level, remainder }
    }

    #[test]
    fn step_costs() {
        assert_eq!(exp_for_level_step(1), 155);
        assert_eq!(exp_for_level_step(2), 220);
        assert_eq!(exp_for_level_step(10), 1100);
    }

    #[test]
    fn totals() {
        assert_eq!(total_exp_for_level(0), 0);
        assert_eq!(total_exp_for_level(1), 155);
        assert_eq!(total_exp_for_level(2), 375);
        assert_eq!(total_exp_for_level(3), 670);
    }

    #[test]
    fn zero_exp_is_level_zero() {
        assert_eq!(level_and_remainder(0), progress(0, 0));
        assert_eq!(level_and_remainder(154), progress(0, 154));
        assert_eq!(level_and_remainder(155), progress(1, 0));
    }

    #[test]
    fn level_thresholds_round_trip() {
        for level in 0..=1000 {
            assert_eq!(
                level_and_remainder(total_exp_for_level(level)),
                progress(level, 0),
                "level {level}"
            );
        }
    }

    #[test]
    fn one_below_threshold_is_previous_level() {
        for level in 1..=1000 {
            assert_eq!(
                level_and_remainder(total_exp_for_level(level) - 1),
                progress(level - 1, exp_for_level_step(level) - 1),
                "level {level}"
            );
        }
    }

    #[test]
    fn totals_strictly_increase() {
        for level in 0..1000 {
            assert!(total_exp_for_level(level) < total_exp_for_level(level + 1));
        }
    }

    #[test]
    fn remainder_is_below_next_step() {
        for exp in (0..200_000).step_by(97) {
            let progress = level_and_remainder(exp);
            assert!(progress.remainder < progress.next_level_exp());
        }
    }

    #[test]
    fn highest_editable_exp() {
        let progress = level_and_remainder(999_999_999);
        assert!(total_exp_for_level(progress.level) <= 999_999_999);
        assert!(total_exp_for_level(progress.level + 1) > 999_999_999);
    }
}
