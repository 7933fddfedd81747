pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod game;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod server;
pub mod utils;

use anyhow::{anyhow, Result};
use game::GameRules;
use identity::{HmacIdentityVerifier, IdentityVerifier, TrustClientIdentity};
use sqlx::{Any, Pool};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Any>,
    pub telegram: Option<api::TelegramApi>,
    pub bot_username: String,
    pub webapp_url: String,
    pub launch_signing_secret: Option<String>,
    pub rules: GameRules,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn from_config(db: Pool<Any>, config: &config::Config) -> Self {
        let verifier: Arc<dyn IdentityVerifier> =
            match (&config.launch_signing_secret, config.require_signed_identity) {
                (Some(secret), true) => Arc::new(HmacIdentityVerifier::new(secret.clone())),
                _ => Arc::new(TrustClientIdentity),
            };

        Self {
            db,
            telegram: config
                .bot
                .as_ref()
                .map(|bot| api::TelegramApi::new(bot.token.clone())),
            bot_username: config
                .bot
                .as_ref()
                .map(|bot| bot.username.clone())
                .unwrap_or_default(),
            webapp_url: config.webapp_url.clone(),
            launch_signing_secret: config.launch_signing_secret.clone(),
            rules: GameRules::with_cooldown_ms(config.mine_cooldown_ms),
            verifier,
        }
    }

    pub fn telegram(&self) -> Result<&api::TelegramApi> {
        self.telegram
            .as_ref()
            .ok_or_else(|| anyhow!("Telegram bot is not configured"))
    }
}
