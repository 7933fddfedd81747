use super::progression::{self, GameRules};
use crate::db;
use crate::error::{GameError, GameResult};
use crate::models::{CheckinOutcome, Player, PlayerView};
use anyhow::anyhow;
use sqlx::{Any, Pool};
use tracing::{debug, info};

/// How many times a conditional write is re-decided after losing a race.
const MAX_WRITE_ATTEMPTS: usize = 5;

async fn load(
    pool: &Pool<Any>,
    player_id: &str,
    display_name: Option<&str>,
    now_ms: i64,
) -> GameResult<Player> {
    let name = progression::normalize_display_name(display_name);
    Ok(db::get_or_create_player(pool, player_id, name.as_deref(), now_ms).await?)
}

async fn reload(pool: &Pool<Any>, player_id: &str) -> GameResult<Player> {
    db::get_player(pool, player_id)
        .await?
        .ok_or_else(|| GameError::Storage(anyhow!("player {player_id} disappeared")))
}

pub async fn fetch_state(
    pool: &Pool<Any>,
    rules: &GameRules,
    player_id: &str,
    display_name: Option<&str>,
    now_ms: i64,
) -> GameResult<PlayerView> {
    let id = progression::validate_player_id(player_id)?;
    let player = load(pool, id, display_name, now_ms).await?;
    Ok(progression::view(player, rules, now_ms))
}

pub async fn mine(
    pool: &Pool<Any>,
    rules: &GameRules,
    player_id: &str,
    display_name: Option<&str>,
    now_ms: i64,
) -> GameResult<PlayerView> {
    let id = progression::validate_player_id(player_id)?;
    let mut player = load(pool, id, display_name, now_ms).await?;

    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let payout = progression::plan_mine(&player, rules, now_ms)
            .inspect_err(|err| debug!(player_id = id, error = %err, "Mine rejected"))?;

        if db::apply_mine(pool, id, payout, player.last_mine_at, now_ms).await? {
            let updated = reload(pool, id).await?;
            info!(
                player_id = id,
                level = updated.rig_level,
                payout,
                oil = updated.oil,
                "Oil mined"
            );
            return Ok(progression::view(updated, rules, now_ms));
        }

        debug!(player_id = id, attempt, "Mine lost a concurrent write, re-reading");
        player = reload(pool, id).await?;
    }

    Err(GameError::Contended)
}

pub async fn upgrade(
    pool: &Pool<Any>,
    rules: &GameRules,
    player_id: &str,
    display_name: Option<&str>,
    now_ms: i64,
) -> GameResult<PlayerView> {
    let id = progression::validate_player_id(player_id)?;
    let mut player = load(pool, id, display_name, now_ms).await?;

    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let plan = progression::plan_upgrade(&player)
            .inspect_err(|err| debug!(player_id = id, error = %err, "Upgrade rejected"))?;

        if db::apply_upgrade(pool, id, player.rig_level, plan.next_level, plan.cost).await? {
            let updated = reload(pool, id).await?;
            info!(
                player_id = id,
                level = plan.next_level,
                cost = plan.cost,
                oil = updated.oil,
                "Rig upgraded"
            );
            return Ok(progression::view(updated, rules, now_ms));
        }

        debug!(player_id = id, attempt, "Upgrade lost a concurrent write, re-reading");
        player = reload(pool, id).await?;
    }

    Err(GameError::Contended)
}

/// Exchanges black oil for xu; `black_oil = None` converts the whole balance.
pub async fn convert(
    pool: &Pool<Any>,
    rules: &GameRules,
    player_id: &str,
    display_name: Option<&str>,
    black_oil: Option<i64>,
    now_ms: i64,
) -> GameResult<PlayerView> {
    let id = progression::validate_player_id(player_id)?;
    let mut player = load(pool, id, display_name, now_ms).await?;

    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let plan = progression::plan_convert(&player, rules, black_oil)
            .inspect_err(|err| debug!(player_id = id, error = %err, "Convert rejected"))?;

        if db::apply_convert(pool, id, plan.black_oil, plan.xu).await? {
            let updated = reload(pool, id).await?;
            info!(
                player_id = id,
                black_oil = plan.black_oil,
                xu = plan.xu,
                "Black oil converted"
            );
            return Ok(progression::view(updated, rules, now_ms));
        }

        debug!(player_id = id, attempt, "Convert lost a concurrent write, re-reading");
        player = reload(pool, id).await?;
    }

    Err(GameError::Contended)
}

/// Daily check-in paying black oil. One claim per UTC day.
pub async fn checkin(
    pool: &Pool<Any>,
    rules: &GameRules,
    player_id: &str,
    display_name: Option<&str>,
    now_ms: i64,
) -> GameResult<CheckinOutcome> {
    let id = progression::validate_player_id(player_id)?;
    load(pool, id, display_name, now_ms).await?;

    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let previous = db::get_checkin(pool, id).await?;
        let plan = progression::plan_checkin(previous.as_ref(), now_ms)
            .inspect_err(|err| debug!(player_id = id, error = %err, "Check-in rejected"))?;

        let previous_day = previous.map(|checkin| checkin.last_day);
        if db::apply_checkin(pool, id, previous_day, plan.day, plan.streak, plan.reward).await? {
            let updated = reload(pool, id).await?;
            info!(
                player_id = id,
                streak = plan.streak,
                reward = plan.reward,
                black_oil = updated.black_oil,
                "Checked in"
            );
            return Ok(CheckinOutcome {
                view: progression::view(updated, rules, now_ms),
                reward: plan.reward,
                streak: plan.streak,
            });
        }

        debug!(player_id = id, attempt, "Check-in lost a concurrent write, re-reading");
    }

    Err(GameError::Contended)
}

/// Result of a bot `/start`: the player's state and whether this call created
/// the player.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub view: PlayerView,
    pub joined: bool,
}

/// Get-or-create that also records who invited the player. The referrer is
/// only stored when the player is created by this call.
pub async fn enroll(
    pool: &Pool<Any>,
    rules: &GameRules,
    player_id: &str,
    display_name: Option<&str>,
    referrer: Option<&str>,
    now_ms: i64,
) -> GameResult<Enrollment> {
    let id = progression::validate_player_id(player_id)?;
    let referrer = progression::referrer_for(id, referrer);
    let name = progression::normalize_display_name(display_name);

    let joined = db::create_player(pool, id, name.as_deref(), referrer, now_ms).await?;
    if joined {
        info!(player_id = id, referred_by = referrer, "Player joined");
    }

    let player = load(pool, id, display_name, now_ms).await?;
    Ok(Enrollment {
        view: progression::view(player, rules, now_ms),
        joined,
    })
}

pub async fn count_referrals(pool: &Pool<Any>, player_id: &str) -> GameResult<i64> {
    let id = progression::validate_player_id(player_id)?;
    Ok(db::count_referrals(pool, id).await?)
}

/// Stores client-reported balances after the magnitude clamp. Level and
/// cooldown stay server-owned.
pub async fn sync_snapshot(
    pool: &Pool<Any>,
    rules: &GameRules,
    player_id: &str,
    display_name: Option<&str>,
    oil: f64,
    xu: i64,
    now_ms: i64,
) -> GameResult<PlayerView> {
    let id = progression::validate_player_id(player_id)?;
    progression::validate_snapshot(rules, oil, xu)
        .inspect_err(|err| debug!(player_id = id, error = %err, "Snapshot rejected"))?;

    let before = load(pool, id, display_name, now_ms).await?;
    db::write_snapshot(pool, id, oil, xu).await?;
    debug!(
        player_id = id,
        oil_before = before.oil,
        oil_after = oil,
        xu_before = before.currency,
        xu_after = xu,
        "Client snapshot stored"
    );

    let updated = reload(pool, id).await?;
    Ok(progression::view(updated, rules, now_ms))
}
