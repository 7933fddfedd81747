use crate::models::{InlineKeyboardButton, InlineKeyboardMarkup, Message, User, WebAppInfo};
use crate::{game, identity, utils, AppState};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

const LAUNCH_BUTTON_TEXT: &str = "⛏ Open Oil Mining";

/// Telegram only allows `web_app` buttons in private chats; groups get a plain link.
pub fn launch_keyboard(launch_url: String, private_chat: bool) -> InlineKeyboardMarkup {
    let button = if private_chat {
        InlineKeyboardButton {
            text: LAUNCH_BUTTON_TEXT.to_string(),
            url: None,
            web_app: Some(WebAppInfo { url: launch_url }),
        }
    } else {
        InlineKeyboardButton {
            text: LAUNCH_BUTTON_TEXT.to_string(),
            url: Some(launch_url),
            web_app: None,
        }
    };
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![button]],
    }
}

/// Numeric `/start` payload carried by invite links (`t.me/<bot>?start=<id>`).
pub fn referral_payload(text: &str) -> Option<&str> {
    let payload = text.split_whitespace().nth(1)?;
    payload
        .chars()
        .all(|c| c.is_ascii_digit())
        .then_some(payload)
}

pub async fn handle_start(state: Arc<AppState>, message: &Message, from: &User) -> Result<()> {
    let telegram = state.telegram()?;
    let chat_id = message.chat.id;
    let player_id = from.id.to_string();
    let display_name = from.display_name();
    let referrer = message.text.as_deref().and_then(referral_payload);

    let enrollment = game::engine::enroll(
        &state.db,
        &state.rules,
        &player_id,
        display_name,
        referrer,
        utils::now_millis(),
    )
    .await?;
    let view = &enrollment.view;

    let launch_url = identity::build_launch_url(
        &state.webapp_url,
        &player_id,
        display_name,
        state.launch_signing_secret.as_deref(),
    )?;

    let mut text = format!(
        "Hi {} 👋\nWelcome to <b>Oil Mining</b>.\n\
         Rig level: <b>{}</b>, oil: <b>{:.1}</b>, black oil: <b>{}</b>, xu: <b>{}</b>\n\n\
         Tap the button below to open the game!",
        utils::escape_html(from.greeting_name()),
        view.player.rig_level,
        view.player.oil,
        view.player.black_oil,
        view.player.currency,
    );
    if enrollment.joined && view.player.referred_by.is_some() {
        text.push_str("\nYou joined through a friend's invite.");
    }

    telegram
        .send_message(
            chat_id,
            Some(message.message_id),
            &text,
            Some(launch_keyboard(launch_url, message.chat.is_private())),
        )
        .await?;

    info!(
        chat_id = chat_id,
        player_id = player_id.as_str(),
        joined = enrollment.joined,
        signed = state.launch_signing_secret.is_some(),
        "Launch button sent"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_chat_gets_web_app_button() {
        let markup = launch_keyboard("https://rig.example/?tg_id=1".to_string(), true);
        let button = &markup.inline_keyboard[0][0];
        assert_eq!(
            button.web_app.as_ref().map(|w| w.url.as_str()),
            Some("https://rig.example/?tg_id=1")
        );
        assert!(button.url.is_none());
    }

    #[test]
    fn test_referral_payload() {
        assert_eq!(referral_payload("/start 12345"), Some("12345"));
        assert_eq!(referral_payload("/start@rigbot 777"), Some("777"));
        assert_eq!(referral_payload("/start"), None);
        assert_eq!(referral_payload("/start promo"), None);
        assert_eq!(referral_payload("/start -5"), None);
    }

    #[test]
    fn test_group_chat_gets_url_button() {
        let markup = launch_keyboard("https://rig.example/?tg_id=1".to_string(), false);
        let button = &markup.inline_keyboard[0][0];
        assert_eq!(button.url.as_deref(), Some("https://rig.example/?tg_id=1"));
        assert!(button.web_app.is_none());
    }
}
