use crate::models::{Message, User};
use crate::{game, utils, AppState};
use anyhow::{anyhow, Result};
use std::sync::Arc;

pub fn invite_link(bot_username: &str, player_id: &str) -> String {
    format!("https://t.me/{bot_username}?start={player_id}")
}

pub async fn handle_invite(state: Arc<AppState>, message: &Message, from: &User) -> Result<()> {
    let telegram = state.telegram()?;
    if state.bot_username.is_empty() {
        return Err(anyhow!("TELEGRAM_BOT_USERNAME is required for invite links"));
    }

    let player_id = from.id.to_string();
    let invited = game::engine::count_referrals(&state.db, &player_id).await?;
    let text = format!(
        "👥 Invite friends with this link:\n{}\n\nFriends joined so far: <b>{}</b>",
        utils::escape_html(&invite_link(&state.bot_username, &player_id)),
        invited
    );

    telegram
        .send_message(message.chat.id, Some(message.message_id), &text, None)
        .await?;

    Ok(())
}
