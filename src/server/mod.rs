mod error;
mod extract;
mod routes;

pub use error::ErrorResponse;
pub use extract::{ApiJson, ApiQuery};

use crate::{handlers, AppState};
use anyhow::{anyhow, Result};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

pub struct WebhookConfig {
    pub path: String,
    pub secret_token: Option<String>,
}

#[derive(Default)]
pub struct RouterOptions {
    pub webhook: Option<WebhookConfig>,
    pub static_dir: Option<PathBuf>,
}

pub async fn register_webhook(
    state: &AppState,
    webhook_url: &str,
    secret_token: Option<&str>,
) -> Result<()> {
    info!(webhook_url = %webhook_url, "Setting webhook URL");
    if let Err(err) = state.telegram()?.set_webhook(webhook_url, secret_token).await {
        error!("Failed to set webhook: {err:?}");
        return Err(anyhow!("Failed to set webhook: {}", err));
    }
    info!("Webhook set successfully");
    Ok(())
}

pub async fn start_server(state: Arc<AppState>, port: u16, options: RouterOptions) -> Result<()> {
    let uses_webhook = options.webhook.is_some();
    let app = create_router(state.clone(), options);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port = port, "Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state, uses_webhook));

    if let Err(err) = server.await {
        error!("Server error: {err:?}");
        return Err(anyhow!("Server error: {}", err));
    }

    Ok(())
}

pub fn create_router(state: Arc<AppState>, options: RouterOptions) -> Router {
    let mut router = Router::new()
        .route("/api/state", get(routes::get_state).post(routes::sync_snapshot))
        .route("/api/mine", post(routes::mine))
        .route("/api/upgrade", post(routes::upgrade))
        .route("/api/convert", post(routes::convert))
        .route("/api/checkin", post(routes::checkin))
        .route("/api/withdraw", post(routes::create_withdrawal))
        .route("/api/withdraw-history", get(routes::withdrawal_history))
        .route("/health", get(health_check));

    if let Some(webhook) = options.webhook {
        let path = webhook.path.clone();
        let webhook_router = Router::new()
            .route(&path, post(webhook_handler))
            .route_layer(axum::middleware::from_fn_with_state(
                Arc::new(webhook),
                verify_secret_token_middleware,
            ));
        router = router.merge(webhook_router);
    }

    if let Some(static_dir) = options.static_dir {
        router = router.fallback_service(
            ServeDir::new(static_dir).append_index_html_on_directories(true),
        );
    }

    router.layer(CorsLayer::permissive()).with_state(state)
}

async fn verify_secret_token_middleware(
    State(config): State<Arc<WebhookConfig>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(expected_token) = &config.secret_token {
        let header_value = request
            .headers()
            .get("X-Telegram-Bot-Api-Secret-Token")
            .ok_or(StatusCode::UNAUTHORIZED)?
            .to_str()
            .map_err(|_| StatusCode::BAD_REQUEST)?;

        if header_value != expected_token {
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    Ok(next.run(request).await)
}

async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    axum::Json(update): axum::Json<crate::models::Update>,
) -> StatusCode {
    let state_clone = state.clone();
    tokio::spawn(async move {
        if let Err(err) = handlers::process_update(state_clone, update).await {
            error!("Failed to process update: {err:?}");
        }
    });

    StatusCode::OK
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

async fn shutdown_signal(state: Arc<AppState>, uses_webhook: bool) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    if !uses_webhook {
        return;
    }

    info!("Deleting webhook...");
    match state.telegram() {
        Ok(telegram) => {
            if let Err(err) = telegram.delete_webhook().await {
                warn!("Failed to delete webhook during shutdown: {err:?}");
            } else {
                info!("Webhook deleted successfully");
            }
        }
        Err(err) => warn!("Cannot delete webhook: {err:?}"),
    }
}
