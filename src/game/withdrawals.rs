use super::progression::{self, GameRules};
use crate::db;
use crate::error::GameResult;
use crate::models::Withdrawal;
use sqlx::{Any, Pool};
use tracing::{debug, info};

/// Records a cash-out request as `pending`. The balance is not debited here;
/// settlement happens when an operator reviews the request.
pub async fn create_withdrawal(
    pool: &Pool<Any>,
    rules: &GameRules,
    player_id: &str,
    display_name: Option<&str>,
    amount_xu: i64,
    contact: &str,
    now_ms: i64,
) -> GameResult<Withdrawal> {
    let id = progression::validate_player_id(player_id)?;
    let contact = contact.trim();
    progression::validate_withdrawal(rules, amount_xu, contact)
        .inspect_err(|err| debug!(player_id = id, error = %err, "Withdrawal rejected"))?;

    let name = progression::normalize_display_name(display_name);
    let withdrawal =
        db::insert_withdrawal(pool, id, name.as_deref(), amount_xu, contact, now_ms).await?;
    info!(
        player_id = id,
        withdrawal_id = withdrawal.id,
        amount_xu,
        "Withdrawal requested"
    );
    Ok(withdrawal)
}

pub async fn list_withdrawals(
    pool: &Pool<Any>,
    rules: &GameRules,
    player_id: &str,
) -> GameResult<Vec<Withdrawal>> {
    let id = progression::validate_player_id(player_id)?;
    Ok(db::list_withdrawals(pool, id, rules.history_limit).await?)
}
