use crate::models::Message;
use crate::AppState;
use anyhow::Result;
use std::sync::Arc;

pub async fn handle_help(state: Arc<AppState>, message: &Message) -> Result<()> {
    let help_text = r#"<b>Oil Mining Bot</b>

<b>/start</b>
Get the button that opens the game.

<b>/checkin</b>
Daily check-in for black oil. Keep a streak for bigger rewards.

<b>/invite</b>
Get your invite link and see how many friends joined.

Everything else happens inside the game:
• Mine oil once per cooldown window
• Upgrade your rig for bigger payouts
• Exchange black oil for xu (1 black oil = 10 xu)
• Request a withdrawal (minimum 200 xu)

<b>/ping</b>
Check that the bot is alive.

Use /help to show this message."#;

    state
        .telegram()?
        .send_message(message.chat.id, Some(message.message_id), help_text, None)
        .await?;

    Ok(())
}

pub async fn handle_ping(state: Arc<AppState>, message: &Message) -> Result<()> {
    state
        .telegram()?
        .send_message(
            message.chat.id,
            Some(message.message_id),
            "🏓 Pong! The bot is running.",
            None,
        )
        .await?;

    Ok(())
}
