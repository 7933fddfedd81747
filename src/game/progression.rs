use super::levels::{self, MAX_LEVEL};
use crate::error::{GameError, GameResult};
use crate::models::{DailyCheckin, Player, PlayerView};

pub const DEFAULT_COOLDOWN_MS: i64 = 6 * 60 * 60 * 1000;
pub const XU_PER_BLACK_OIL: i64 = 10;
pub const CHECKIN_BASE_REWARD: i64 = 20;
pub const CHECKIN_STREAK_BONUS: i64 = 5;
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
pub const MAX_CLIENT_VALUE: f64 = 1_000_000_000.0;
pub const MIN_WITHDRAWAL_XU: i64 = 200;
pub const CONTACT_PREFIX: &str = "84";
pub const CONTACT_MIN_LEN: usize = 9;
pub const WITHDRAWAL_HISTORY_LIMIT: i64 = 20;
const MAX_PLAYER_ID_LEN: usize = 64;
const MAX_DISPLAY_NAME_CHARS: usize = 64;

/// Tunable game balance. Everything except the cooldown is fixed economy.
#[derive(Debug, Clone)]
pub struct GameRules {
    pub cooldown_ms: i64,
    pub xu_per_black_oil: i64,
    pub max_client_value: f64,
    pub min_withdrawal_xu: i64,
    pub history_limit: i64,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            xu_per_black_oil: XU_PER_BLACK_OIL,
            max_client_value: MAX_CLIENT_VALUE,
            min_withdrawal_xu: MIN_WITHDRAWAL_XU,
            history_limit: WITHDRAWAL_HISTORY_LIMIT,
        }
    }
}

impl GameRules {
    pub fn with_cooldown_ms(cooldown_ms: i64) -> Self {
        Self {
            cooldown_ms,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradePlan {
    pub next_level: i64,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertPlan {
    pub black_oil: i64,
    pub xu: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckinPlan {
    pub day: i64,
    pub streak: i64,
    pub reward: i64,
}

pub fn validate_player_id(raw: &str) -> GameResult<&str> {
    let id = raw.trim();
    if id.is_empty()
        || id.len() > MAX_PLAYER_ID_LEN
        || id.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(GameError::InvalidPlayerId);
    }
    Ok(id)
}

/// Blank names count as "not supplied"; long ones are cut to a sane length.
pub fn normalize_display_name(raw: Option<&str>) -> Option<String> {
    let name = raw?.trim();
    if name.is_empty() {
        return None;
    }
    Some(name.chars().take(MAX_DISPLAY_NAME_CHARS).collect())
}

/// Milliseconds until the next mine is allowed; 0 when it is allowed now.
pub fn cooldown_remaining_ms(player: &Player, rules: &GameRules, now_ms: i64) -> i64 {
    if player.last_mine_at <= 0 {
        return 0;
    }
    let elapsed = (now_ms - player.last_mine_at).max(0);
    if elapsed >= rules.cooldown_ms {
        0
    } else {
        rules.cooldown_ms - elapsed
    }
}

/// Returns the oil a mine would yield right now.
pub fn plan_mine(player: &Player, rules: &GameRules, now_ms: i64) -> GameResult<f64> {
    let remaining_ms = cooldown_remaining_ms(player, rules, now_ms);
    if remaining_ms > 0 {
        return Err(GameError::Cooldown { remaining_ms });
    }
    Ok(levels::payout(player.rig_level))
}

pub fn plan_upgrade(player: &Player) -> GameResult<UpgradePlan> {
    if player.rig_level >= MAX_LEVEL {
        return Err(GameError::MaxLevel {
            level: player.rig_level,
        });
    }
    let next_level = (player.rig_level + 1).max(levels::MIN_LEVEL);
    let cost = levels::upgrade_cost(next_level).ok_or(GameError::MaxLevel {
        level: player.rig_level,
    })?;
    if player.oil < cost {
        return Err(GameError::InsufficientOil {
            cost,
            oil: player.oil,
        });
    }
    Ok(UpgradePlan { next_level, cost })
}

/// Exchanges black oil for xu. `None` converts the whole balance.
pub fn plan_convert(
    player: &Player,
    rules: &GameRules,
    requested: Option<i64>,
) -> GameResult<ConvertPlan> {
    if matches!(requested, Some(amount) if amount < 1) {
        return Err(GameError::Validation(
            "black_oil must be at least 1".to_string(),
        ));
    }
    let available = player.black_oil;
    let black_oil = requested.unwrap_or(available);
    if black_oil < 1 || black_oil > available {
        return Err(GameError::InsufficientBlackOil {
            requested: black_oil.max(1),
            available,
        });
    }
    let xu = black_oil
        .checked_mul(rules.xu_per_black_oil)
        .ok_or_else(|| GameError::Validation("black_oil amount is too large".to_string()))?;
    Ok(ConvertPlan { black_oil, xu })
}

/// UTC day number used for check-in bookkeeping.
pub fn day_index(now_ms: i64) -> i64 {
    now_ms.div_euclid(DAY_MS)
}

/// The first check-in ever pays the base reward. Later ones pay the base
/// plus a bonus per streak day; missing a day resets the streak to 1.
pub fn plan_checkin(previous: Option<&DailyCheckin>, now_ms: i64) -> GameResult<CheckinPlan> {
    let today = day_index(now_ms);
    let Some(previous) = previous else {
        return Ok(CheckinPlan {
            day: today,
            streak: 1,
            reward: CHECKIN_BASE_REWARD,
        });
    };

    if previous.last_day >= today {
        let next_day_ms = (previous.last_day + 1) * DAY_MS;
        return Err(GameError::AlreadyCheckedIn {
            remaining_ms: next_day_ms - now_ms,
        });
    }

    let streak = if previous.last_day == today - 1 {
        previous.streak + 1
    } else {
        1
    };
    Ok(CheckinPlan {
        day: today,
        streak,
        reward: CHECKIN_BASE_REWARD + streak * CHECKIN_STREAK_BONUS,
    })
}

/// A referral payload only counts when it names someone other than the player.
pub fn referrer_for<'a>(player_id: &str, referrer: Option<&'a str>) -> Option<&'a str> {
    let referrer = validate_player_id(referrer?).ok()?;
    (referrer != player_id).then_some(referrer)
}

/// Magnitude clamp for client-reported values. Consistency with server-side
/// progression is not checked.
pub fn validate_snapshot(rules: &GameRules, oil: f64, xu: i64) -> GameResult<()> {
    if !oil.is_finite() || oil < 0.0 {
        return Err(GameError::Validation(
            "oil must be a non-negative number".to_string(),
        ));
    }
    if xu < 0 {
        return Err(GameError::Validation("xu must not be negative".to_string()));
    }
    if oil > rules.max_client_value {
        return Err(GameError::ImplausibleValue {
            field: "oil",
            value: oil,
            max: rules.max_client_value,
        });
    }
    if xu as f64 > rules.max_client_value {
        return Err(GameError::ImplausibleValue {
            field: "xu",
            value: xu as f64,
            max: rules.max_client_value,
        });
    }
    Ok(())
}

pub fn validate_withdrawal(rules: &GameRules, amount_xu: i64, contact: &str) -> GameResult<()> {
    if amount_xu < rules.min_withdrawal_xu {
        return Err(GameError::WithdrawalTooSmall {
            amount: amount_xu,
            minimum: rules.min_withdrawal_xu,
        });
    }
    if !contact.starts_with(CONTACT_PREFIX) || contact.len() < CONTACT_MIN_LEN {
        return Err(GameError::InvalidContact {
            prefix: CONTACT_PREFIX,
        });
    }
    Ok(())
}

pub fn view(player: Player, rules: &GameRules, now_ms: i64) -> PlayerView {
    let cooldown_remaining_ms = cooldown_remaining_ms(&player, rules, now_ms);
    let next_upgrade_cost = if player.rig_level < MAX_LEVEL {
        levels::upgrade_cost(player.rig_level + 1)
    } else {
        None
    };
    PlayerView {
        payout: levels::payout(player.rig_level),
        max_level: MAX_LEVEL,
        next_upgrade_cost,
        cooldown_remaining_ms,
        player,
    }
}
