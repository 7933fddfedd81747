use anyhow::Result;
use oilrig::{
    config::Config,
    db, handlers,
    server::{self, RouterOptions, WebhookConfig},
    AppState,
};
use sqlx::any::AnyPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    std::fs::create_dir_all(&config.log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "oilrig.log");
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    sqlx::any::install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(if config.database_url.contains(":memory:") { 1 } else { 5 })
        .connect(&config.database_url)
        .await?;
    db::run_migrations(&pool, &config.database_url).await?;

    let state = Arc::new(AppState::from_config(pool, &config));

    let mut options = RouterOptions {
        webhook: None,
        static_dir: config.static_dir.clone(),
    };
    let mut poll_updates = false;

    match &config.bot {
        Some(bot) => match &bot.webhook {
            Some(webhook) => {
                server::register_webhook(&state, &webhook.url, webhook.secret_token.as_deref())
                    .await?;
                options.webhook = Some(WebhookConfig {
                    path: webhook.path.clone(),
                    secret_token: webhook.secret_token.clone(),
                });
            }
            None => poll_updates = true,
        },
        None => warn!("TELEGRAM_BOT_TOKEN is not set, running the web backend only"),
    }

    let server = server::start_server(state.clone(), config.http_port, options);

    if poll_updates {
        tokio::select! {
            result = server => result?,
            _ = poll_loop(state) => {},
        }
    } else {
        server.await?;
    }

    info!("Stopped");
    Ok(())
}

async fn poll_loop(state: Arc<AppState>) {
    let telegram = match state.telegram() {
        Ok(telegram) => telegram.clone(),
        Err(err) => {
            error!("Cannot poll updates: {err:?}");
            return;
        }
    };

    if let Err(err) = telegram.delete_webhook().await {
        warn!("Failed to clear webhook before polling: {err:?}");
    }

    info!("Bot started. Waiting for updates...");

    let mut offset: Option<i64> = None;
    loop {
        match telegram.get_updates(offset, 30).await {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);

                    if let Err(err) = handlers::process_update(state.clone(), update).await {
                        error!("Failed to process update: {err:?}");
                    }
                }
            }
            Err(err) => {
                error!("Error getting updates: {err:?}");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }
}
