/// One row of the rig progression table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSpec {
    pub level: i64,
    /// Oil needed to move from `level - 1` to `level`. Zero for level 1.
    pub upgrade_cost: f64,
    /// Oil granted per successful mine at this level.
    pub payout: f64,
}

pub const LEVELS: [LevelSpec; 5] = [
    LevelSpec {
        level: 1,
        upgrade_cost: 0.0,
        payout: 17.5,
    },
    LevelSpec {
        level: 2,
        upgrade_cost: 5_000.0,
        payout: 35.0,
    },
    LevelSpec {
        level: 3,
        upgrade_cost: 15_000.0,
        payout: 70.0,
    },
    LevelSpec {
        level: 4,
        upgrade_cost: 40_000.0,
        payout: 140.0,
    },
    LevelSpec {
        level: 5,
        upgrade_cost: 100_000.0,
        payout: 280.0,
    },
];

pub const MIN_LEVEL: i64 = 1;
pub const MAX_LEVEL: i64 = LEVELS.len() as i64;

pub fn level_spec(level: i64) -> Option<&'static LevelSpec> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        return None;
    }
    LEVELS.get((level - 1) as usize)
}

/// Payout for `level`, falling back to level 1 for anything outside the table.
pub fn payout(level: i64) -> f64 {
    level_spec(level).unwrap_or(&LEVELS[0]).payout
}

/// Cost to reach `level`, or `None` when `level` is not in the table.
pub fn upgrade_cost(level: i64) -> Option<f64> {
    level_spec(level).map(|spec| spec.upgrade_cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_ordered_and_dense() {
        for (idx, spec) in LEVELS.iter().enumerate() {
            assert_eq!(spec.level, idx as i64 + 1);
        }
        assert_eq!(LEVELS[0].upgrade_cost, 0.0);
        for pair in LEVELS.windows(2) {
            assert!(pair[1].upgrade_cost > pair[0].upgrade_cost);
            assert!(pair[1].payout > pair[0].payout);
        }
    }

    #[test]
    fn test_payout_lookup() {
        assert_eq!(payout(1), 17.5);
        assert_eq!(payout(2), 35.0);
        assert_eq!(payout(MAX_LEVEL), 280.0);
    }

    #[test]
    fn test_payout_falls_back_to_level_one() {
        assert_eq!(payout(0), 17.5);
        assert_eq!(payout(-3), 17.5);
        assert_eq!(payout(MAX_LEVEL + 1), 17.5);
    }

    #[test]
    fn test_upgrade_cost_lookup() {
        assert_eq!(upgrade_cost(2), Some(5_000.0));
        assert_eq!(upgrade_cost(MAX_LEVEL + 1), None);
        assert_eq!(upgrade_cost(0), None);
    }
}
