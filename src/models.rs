use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const WITHDRAWAL_PENDING: &str = "pending";

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Player {
    #[serde(rename = "tg_id")]
    pub id: String,
    #[serde(rename = "username")]
    pub display_name: Option<String>,
    pub oil: f64,
    #[serde(rename = "xu")]
    #[sqlx(rename = "xu")]
    pub currency: i64,
    /// Check-in reward balance, exchangeable for xu.
    pub black_oil: i64,
    pub rig_level: i64,
    pub last_mine_at: i64,
    #[serde(rename = "ref_by")]
    pub referred_by: Option<String>,
    pub created_at: i64,
}

/// Player record as handed to the mini-app, with the derived numbers it renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    #[serde(flatten)]
    pub player: Player,
    pub payout: f64,
    pub max_level: i64,
    pub next_upgrade_cost: Option<f64>,
    pub cooldown_remaining_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct DailyCheckin {
    pub last_day: i64,
    pub streak: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckinOutcome {
    #[serde(flatten)]
    pub view: PlayerView,
    pub reward: i64,
    pub streak: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Withdrawal {
    pub id: i64,
    #[serde(rename = "tg_id")]
    pub player_id: String,
    pub amount_xu: i64,
    #[serde(rename = "phone")]
    pub contact: String,
    pub status: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
    pub from: Option<User>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Chat {
    pub fn is_private(&self) -> bool {
        self.kind.as_deref() == Some("private")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// Name carried into the mini-app launch URL.
    pub fn display_name(&self) -> Option<&str> {
        self.username
            .as_deref()
            .or(self.first_name.as_deref())
            .filter(|name| !name.trim().is_empty())
    }

    pub fn greeting_name(&self) -> &str {
        self.first_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("there")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebAppInfo {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_app: Option<WebAppInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Serialize)]
pub struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Serialize)]
pub struct SetWebhookRequest<'a> {
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<&'a str>,
}

#[derive(Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[allow(dead_code)]
    pub error_code: Option<i32>,
    pub description: Option<String>,
}
