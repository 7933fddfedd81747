use crate::error::GameError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// JSON body for every rejected API call. Optional fields carry the numbers
/// the mini-app needs to render the rejection.
#[derive(Serialize, Default)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oil: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

fn status_for(err: &GameError) -> StatusCode {
    match err {
        GameError::InvalidPlayerId
        | GameError::Validation(_)
        | GameError::WithdrawalTooSmall { .. }
        | GameError::InvalidContact { .. }
        | GameError::ImplausibleValue { .. } => StatusCode::BAD_REQUEST,
        GameError::InvalidSignature => StatusCode::UNAUTHORIZED,
        GameError::Cooldown { .. } => StatusCode::TOO_MANY_REQUESTS,
        GameError::MaxLevel { .. }
        | GameError::InsufficientOil { .. }
        | GameError::InsufficientBlackOil { .. }
        | GameError::AlreadyCheckedIn { .. } => StatusCode::CONFLICT,
        GameError::Contended => StatusCode::SERVICE_UNAVAILABLE,
        GameError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let mut body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
            shortfall: self.shortfall(),
            ..ErrorResponse::default()
        };

        match &self {
            GameError::Cooldown { remaining_ms } => body.remaining_ms = Some(*remaining_ms),
            GameError::InsufficientOil { cost, oil } => {
                body.cost = Some(*cost);
                body.oil = Some(*oil);
            }
            GameError::MaxLevel { level } => body.level = Some(*level),
            GameError::InsufficientBlackOil { available, .. } => {
                body.available = Some(*available)
            }
            GameError::AlreadyCheckedIn { remaining_ms } => body.remaining_ms = Some(*remaining_ms),
            GameError::WithdrawalTooSmall { minimum, .. } => body.minimum = Some(*minimum),
            GameError::ImplausibleValue { max, .. } => body.max = Some(*max),
            GameError::Storage(err) => {
                error!("Storage failure while handling request: {err:?}");
                body.error = "internal error".to_string();
            }
            _ => {}
        }

        (status, Json(body)).into_response()
    }
}
