use super::{checkin_handler, help_handler, invite_handler, start_handler};
use crate::models::Update;
use crate::AppState;
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

const FAILURE_NOTICE: &str =
    "⚠️ Something went wrong while handling your request. An admin will look into it.";

fn strip_bot_suffix<'a>(text: &'a str, bot_username: &str) -> &'a str {
    let trimmed = text.trim();
    if let Some(at_pos) = trimmed.find('@') {
        let suffix = &trimmed[at_pos + 1..];
        if suffix.eq_ignore_ascii_case(bot_username) {
            return &trimmed[..at_pos];
        }
    }
    trimmed
}

/// Lowercased command from the first token, or `None` when the message is not
/// a command or is addressed to a different bot.
fn command_name(text: &str, bot_username: &str) -> Option<String> {
    let first = text.split_whitespace().next()?;
    if !first.starts_with('/') {
        return None;
    }
    let command = strip_bot_suffix(first, bot_username);
    if command.contains('@') {
        return None;
    }
    Some(command.to_ascii_lowercase())
}

pub async fn process_update(state: Arc<AppState>, update: Update) -> Result<()> {
    let Some(message) = update.message else {
        return Ok(());
    };
    let Some(text) = &message.text else {
        return Ok(());
    };
    let Some(from) = &message.from else {
        return Ok(());
    };

    if from.is_bot {
        return Ok(());
    }

    let result = match command_name(text, &state.bot_username).as_deref() {
        Some("/start") => start_handler::handle_start(state.clone(), &message, from).await,
        Some("/help") => help_handler::handle_help(state.clone(), &message).await,
        Some("/ping") => help_handler::handle_ping(state.clone(), &message).await,
        Some("/checkin") => checkin_handler::handle_checkin(state.clone(), &message, from).await,
        Some("/invite") => invite_handler::handle_invite(state.clone(), &message, from).await,
        _ => return Ok(()),
    };

    if result.is_err() {
        if let Ok(telegram) = state.telegram() {
            if let Err(err) = telegram
                .send_message(message.chat.id, None, FAILURE_NOTICE, None)
                .await
            {
                warn!(chat_id = message.chat.id, "Failed to send failure notice: {err:?}");
            }
        }
    }

    result
}
