use crate::models::{DailyCheckin, Player, Withdrawal, WITHDRAWAL_PENDING};
use anyhow::Result;
use sqlx::{Any, Pool};

const PLAYER_COLUMNS: &str =
    "id, display_name, oil, xu, black_oil, rig_level, last_mine_at, referred_by, created_at";

pub async fn run_migrations(pool: &Pool<Any>, database_url: &str) -> Result<()> {
    if database_url.starts_with("postgres") {
        sqlx::raw_sql(include_str!("../../migrations/postgres/001_init.sql"))
            .execute(pool)
            .await?;
    } else {
        sqlx::raw_sql(include_str!("../../migrations/sqlite/001_init.sql"))
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Inserts a default player record. Returns `false` when the player already
/// existed, in which case the stored referrer is left alone.
pub async fn create_player(
    pool: &Pool<Any>,
    player_id: &str,
    display_name: Option<&str>,
    referred_by: Option<&str>,
    now_ms: i64,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO players
            (id, display_name, oil, xu, black_oil, rig_level, last_mine_at, referred_by, created_at)
         VALUES ($1, $2, $3, 0, 0, 1, 0, $4, $5)
         ON CONFLICT(id) DO NOTHING",
    )
    .bind(player_id)
    .bind(display_name)
    .bind(0.0_f64)
    .bind(referred_by)
    .bind(now_ms)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Loads the player, inserting a default record first if none exists.
/// A supplied display name replaces the stored one when it differs.
pub async fn get_or_create_player(
    pool: &Pool<Any>,
    player_id: &str,
    display_name: Option<&str>,
    now_ms: i64,
) -> Result<Player> {
    create_player(pool, player_id, display_name, None, now_ms).await?;

    if let Some(name) = display_name {
        sqlx::query(
            "UPDATE players SET display_name = $1
             WHERE id = $2 AND (display_name IS NULL OR display_name <> $1)",
        )
        .bind(name)
        .bind(player_id)
        .execute(pool)
        .await?;
    }

    let player: Player = sqlx::query_as(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1"
    ))
    .bind(player_id)
    .fetch_one(pool)
    .await?;
    Ok(player)
}

pub async fn get_player(pool: &Pool<Any>, player_id: &str) -> Result<Option<Player>> {
    let player: Option<Player> = sqlx::query_as(&format!(
        "SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1"
    ))
    .bind(player_id)
    .fetch_optional(pool)
    .await?;
    Ok(player)
}

/// Credits a mine only if nobody else mined since `expected_last_mine_at` was read.
pub async fn apply_mine(
    pool: &Pool<Any>,
    player_id: &str,
    payout: f64,
    expected_last_mine_at: i64,
    now_ms: i64,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE players SET oil = oil + $1, last_mine_at = $2
         WHERE id = $3 AND last_mine_at = $4",
    )
    .bind(payout)
    .bind(now_ms)
    .bind(player_id)
    .bind(expected_last_mine_at)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn apply_upgrade(
    pool: &Pool<Any>,
    player_id: &str,
    expected_level: i64,
    next_level: i64,
    cost: f64,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE players SET oil = oil - $1, rig_level = $2
         WHERE id = $3 AND rig_level = $4 AND oil >= $1",
    )
    .bind(cost)
    .bind(next_level)
    .bind(player_id)
    .bind(expected_level)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn apply_convert(
    pool: &Pool<Any>,
    player_id: &str,
    black_oil: i64,
    xu: i64,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE players SET black_oil = black_oil - $1, xu = xu + $2
         WHERE id = $3 AND black_oil >= $1",
    )
    .bind(black_oil)
    .bind(xu)
    .bind(player_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn count_referrals(pool: &Pool<Any>, player_id: &str) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM players WHERE referred_by = $1")
        .bind(player_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn get_checkin(pool: &Pool<Any>, player_id: &str) -> Result<Option<DailyCheckin>> {
    let checkin: Option<DailyCheckin> =
        sqlx::query_as("SELECT last_day, streak FROM daily_checkins WHERE player_id = $1")
            .bind(player_id)
            .fetch_optional(pool)
            .await?;
    Ok(checkin)
}

/// Claims the check-in for `day` and credits the reward in one transaction.
/// The claim only succeeds if the stored day still equals `previous_day`
/// (or no row exists yet when it is `None`).
pub async fn apply_checkin(
    pool: &Pool<Any>,
    player_id: &str,
    previous_day: Option<i64>,
    day: i64,
    streak: i64,
    reward: i64,
) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let claimed = match previous_day {
        None => sqlx::query(
            "INSERT INTO daily_checkins (player_id, last_day, streak)
             VALUES ($1, $2, $3)
             ON CONFLICT(player_id) DO NOTHING",
        )
        .bind(player_id)
        .bind(day)
        .bind(streak)
        .execute(&mut *tx)
        .await?,
        Some(previous_day) => sqlx::query(
            "UPDATE daily_checkins SET last_day = $1, streak = $2
             WHERE player_id = $3 AND last_day = $4",
        )
        .bind(day)
        .bind(streak)
        .bind(player_id)
        .bind(previous_day)
        .execute(&mut *tx)
        .await?,
    };

    if claimed.rows_affected() != 1 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("UPDATE players SET black_oil = black_oil + $1 WHERE id = $2")
        .bind(reward)
        .bind(player_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(true)
}

pub async fn write_snapshot(pool: &Pool<Any>, player_id: &str, oil: f64, xu: i64) -> Result<()> {
    sqlx::query("UPDATE players SET oil = $1, xu = $2 WHERE id = $3")
        .bind(oil)
        .bind(xu)
        .bind(player_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn insert_withdrawal(
    pool: &Pool<Any>,
    player_id: &str,
    display_name: Option<&str>,
    amount_xu: i64,
    contact: &str,
    now_ms: i64,
) -> Result<Withdrawal> {
    let withdrawal: Withdrawal = sqlx::query_as(
        "INSERT INTO withdrawals (player_id, display_name, amount_xu, contact, status, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, player_id, amount_xu, contact, status, created_at",
    )
    .bind(player_id)
    .bind(display_name)
    .bind(amount_xu)
    .bind(contact)
    .bind(WITHDRAWAL_PENDING)
    .bind(now_ms)
    .fetch_one(pool)
    .await?;
    Ok(withdrawal)
}

pub async fn list_withdrawals(
    pool: &Pool<Any>,
    player_id: &str,
    limit: i64,
) -> Result<Vec<Withdrawal>> {
    let rows: Vec<Withdrawal> = sqlx::query_as(
        "SELECT id, player_id, amount_xu, contact, status, created_at
         FROM withdrawals
         WHERE player_id = $1
         ORDER BY created_at DESC, id DESC
         LIMIT $2",
    )
    .bind(player_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
