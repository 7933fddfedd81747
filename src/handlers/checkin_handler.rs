use crate::error::GameError;
use crate::models::{Message, User};
use crate::{game, utils, AppState};
use anyhow::Result;
use std::sync::Arc;

fn format_wait(remaining_ms: i64) -> String {
    let minutes = (remaining_ms + 59_999) / 60_000;
    format!("{}h {}m", minutes / 60, minutes % 60)
}

pub async fn handle_checkin(state: Arc<AppState>, message: &Message, from: &User) -> Result<()> {
    let telegram = state.telegram()?;
    let player_id = from.id.to_string();

    let text = match game::engine::checkin(
        &state.db,
        &state.rules,
        &player_id,
        from.display_name(),
        utils::now_millis(),
    )
    .await
    {
        Ok(outcome) => format!(
            "📅 Checked in! +<b>{}</b> black oil (streak: {} days).\n\
             Black oil balance: <b>{}</b>",
            outcome.reward, outcome.streak, outcome.view.player.black_oil
        ),
        Err(GameError::AlreadyCheckedIn { remaining_ms }) => format!(
            "📅 You already checked in today. Come back in {}.",
            format_wait(remaining_ms)
        ),
        Err(err) => return Err(err.into()),
    };

    telegram
        .send_message(message.chat.id, Some(message.message_id), &text, None)
        .await?;

    Ok(())
}
