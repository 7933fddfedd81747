use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

use crate::game::progression::DEFAULT_COOLDOWN_MS;

pub const DEFAULT_WEBHOOK_PATH: &str = "/telegram/webhook";

/// Runtime configuration, read from the environment (after `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub http_port: u16,
    pub log_dir: String,
    pub webapp_url: String,
    pub static_dir: Option<PathBuf>,
    pub bot: Option<BotConfig>,
    pub launch_signing_secret: Option<String>,
    pub require_signed_identity: bool,
    pub mine_cooldown_ms: i64,
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub username: String,
    pub webhook: Option<WebhookSettings>,
}

#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub url: String,
    pub path: String,
    pub secret_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bot = match get("TELEGRAM_BOT_TOKEN") {
            Some(token) => {
                let webhook = get("WEBHOOK_URL").map(|url| WebhookSettings {
                    url,
                    path: get("WEBHOOK_PATH")
                        .map(|path| format!("/{}", path.trim().trim_start_matches('/')))
                        .unwrap_or_else(|| DEFAULT_WEBHOOK_PATH.to_string()),
                    secret_token: get("WEBHOOK_SECRET_TOKEN"),
                });
                Some(BotConfig {
                    token,
                    username: get("TELEGRAM_BOT_USERNAME")
                        .unwrap_or_default()
                        .trim_start_matches('@')
                        .to_string(),
                    webhook,
                })
            }
            None => None,
        };

        let launch_signing_secret = get("LAUNCH_SIGNING_SECRET");
        let require_signed_identity = match get("REQUIRE_SIGNED_IDENTITY") {
            Some(value) => parse_bool(&value)
                .ok_or_else(|| anyhow!("REQUIRE_SIGNED_IDENTITY must be true or false"))?,
            None => false,
        };
        if require_signed_identity && launch_signing_secret.is_none() {
            return Err(anyhow!(
                "REQUIRE_SIGNED_IDENTITY is set but LAUNCH_SIGNING_SECRET is missing"
            ));
        }

        let mine_cooldown_ms = match get("MINE_COOLDOWN_SECS") {
            Some(value) => parse_number::<i64>("MINE_COOLDOWN_SECS", &value)?
                .checked_mul(1000)
                .filter(|ms| *ms >= 0)
                .ok_or_else(|| anyhow!("MINE_COOLDOWN_SECS is out of range"))?,
            None => DEFAULT_COOLDOWN_MS,
        };

        Ok(Self {
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:oilrig.db?mode=rwc".to_string()),
            http_port: match get("HTTP_PORT") {
                Some(value) => parse_number("HTTP_PORT", &value)?,
                None => 8080,
            },
            log_dir: get("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            webapp_url: get("WEBAPP_URL").unwrap_or_else(|| "https://example.com".to_string()),
            static_dir: get("STATIC_DIR").map(PathBuf::from),
            bot,
            launch_signing_secret,
            require_signed_identity,
            mine_cooldown_ms,
        })
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value: {value}"))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.database_url, "sqlite:oilrig.db?mode=rwc");
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.webapp_url, "https://example.com");
        assert_eq!(config.mine_cooldown_ms, DEFAULT_COOLDOWN_MS);
        assert!(config.bot.is_none());
        assert!(!config.require_signed_identity);
    }

    #[test]
    fn test_bot_with_webhook() {
        let config = config_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_BOT_USERNAME", "@OilRigBot"),
            ("WEBHOOK_URL", "https://rig.example/telegram/webhook"),
            ("WEBHOOK_SECRET_TOKEN", "hush"),
        ])
        .unwrap();
        let bot = config.bot.unwrap();
        assert_eq!(bot.username, "OilRigBot");
        let webhook = bot.webhook.unwrap();
        assert_eq!(webhook.path, DEFAULT_WEBHOOK_PATH);
        assert_eq!(webhook.secret_token.as_deref(), Some("hush"));
    }

    #[test]
    fn test_webhook_path_gets_leading_slash() {
        let config = config_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("WEBHOOK_URL", "https://rig.example/hook"),
            ("WEBHOOK_PATH", "hook"),
        ])
        .unwrap();
        assert_eq!(config.bot.unwrap().webhook.unwrap().path, "/hook");
    }

    #[test]
    fn test_cooldown_in_seconds() {
        let config = config_from(&[("MINE_COOLDOWN_SECS", "90")]).unwrap();
        assert_eq!(config.mine_cooldown_ms, 90_000);
        assert!(config_from(&[("MINE_COOLDOWN_SECS", "soon")]).is_err());
        assert!(config_from(&[("MINE_COOLDOWN_SECS", "-5")]).is_err());
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(config_from(&[("HTTP_PORT", "70000")]).is_err());
    }

    #[test]
    fn test_signed_identity_requires_secret() {
        assert!(config_from(&[("REQUIRE_SIGNED_IDENTITY", "true")]).is_err());
        let config = config_from(&[
            ("REQUIRE_SIGNED_IDENTITY", "yes"),
            ("LAUNCH_SIGNING_SECRET", "k"),
        ])
        .unwrap();
        assert!(config.require_signed_identity);
        assert!(config_from(&[("REQUIRE_SIGNED_IDENTITY", "maybe")]).is_err());
    }
}
