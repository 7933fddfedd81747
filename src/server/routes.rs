use super::extract::{ApiJson, ApiQuery};
use crate::error::GameResult;
use crate::game::{engine, withdrawals};
use crate::models::{CheckinOutcome, PlayerView, Withdrawal};
use crate::{utils, AppState};
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

// A missing tg_id deserializes to "" so it is reported as an invalid player id
// rather than a generic body validation error.

#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    #[serde(default)]
    pub tg_id: String,
    pub username: Option<String>,
    pub sig: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotRequest {
    #[serde(default)]
    pub tg_id: String,
    pub username: Option<String>,
    pub sig: Option<String>,
    pub oil: f64,
    pub xu: i64,
}

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    #[serde(default)]
    pub tg_id: String,
    pub username: Option<String>,
    pub sig: Option<String>,
    pub black_oil: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    #[serde(default)]
    pub tg_id: String,
    pub username: Option<String>,
    pub sig: Option<String>,
    pub amount_xu: i64,
    pub phone: String,
}

fn verify(
    state: &AppState,
    tg_id: &str,
    username: Option<&str>,
    sig: Option<&str>,
) -> GameResult<()> {
    state.verifier.verify(tg_id.trim(), username, sig)
}

pub async fn get_state(
    State(state): State<Arc<AppState>>,
    ApiQuery(req): ApiQuery<PlayerRequest>,
) -> GameResult<Json<PlayerView>> {
    verify(&state, &req.tg_id, req.username.as_deref(), req.sig.as_deref())?;
    let view = engine::fetch_state(
        &state.db,
        &state.rules,
        &req.tg_id,
        req.username.as_deref(),
        utils::now_millis(),
    )
    .await?;
    Ok(Json(view))
}

pub async fn sync_snapshot(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SnapshotRequest>,
) -> GameResult<Json<PlayerView>> {
    verify(&state, &req.tg_id, req.username.as_deref(), req.sig.as_deref())?;
    let view = engine::sync_snapshot(
        &state.db,
        &state.rules,
        &req.tg_id,
        req.username.as_deref(),
        req.oil,
        req.xu,
        utils::now_millis(),
    )
    .await?;
    Ok(Json(view))
}

pub async fn mine(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<PlayerRequest>,
) -> GameResult<Json<PlayerView>> {
    verify(&state, &req.tg_id, req.username.as_deref(), req.sig.as_deref())?;
    let view = engine::mine(
        &state.db,
        &state.rules,
        &req.tg_id,
        req.username.as_deref(),
        utils::now_millis(),
    )
    .await?;
    Ok(Json(view))
}

pub async fn upgrade(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<PlayerRequest>,
) -> GameResult<Json<PlayerView>> {
    verify(&state, &req.tg_id, req.username.as_deref(), req.sig.as_deref())?;
    let view = engine::upgrade(
        &state.db,
        &state.rules,
        &req.tg_id,
        req.username.as_deref(),
        utils::now_millis(),
    )
    .await?;
    Ok(Json(view))
}

pub async fn convert(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ConvertRequest>,
) -> GameResult<Json<PlayerView>> {
    verify(&state, &req.tg_id, req.username.as_deref(), req.sig.as_deref())?;
    let view = engine::convert(
        &state.db,
        &state.rules,
        &req.tg_id,
        req.username.as_deref(),
        req.black_oil,
        utils::now_millis(),
    )
    .await?;
    Ok(Json(view))
}

pub async fn checkin(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<PlayerRequest>,
) -> GameResult<Json<CheckinOutcome>> {
    verify(&state, &req.tg_id, req.username.as_deref(), req.sig.as_deref())?;
    let outcome = engine::checkin(
        &state.db,
        &state.rules,
        &req.tg_id,
        req.username.as_deref(),
        utils::now_millis(),
    )
    .await?;
    Ok(Json(outcome))
}

pub async fn create_withdrawal(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<WithdrawRequest>,
) -> GameResult<Json<Withdrawal>> {
    verify(&state, &req.tg_id, req.username.as_deref(), req.sig.as_deref())?;
    let withdrawal = withdrawals::create_withdrawal(
        &state.db,
        &state.rules,
        &req.tg_id,
        req.username.as_deref(),
        req.amount_xu,
        &req.phone,
        utils::now_millis(),
    )
    .await?;
    Ok(Json(withdrawal))
}

pub async fn withdrawal_history(
    State(state): State<Arc<AppState>>,
    ApiQuery(req): ApiQuery<PlayerRequest>,
) -> GameResult<Json<Vec<Withdrawal>>> {
    verify(&state, &req.tg_id, req.username.as_deref(), req.sig.as_deref())?;
    let history = withdrawals::list_withdrawals(&state.db, &state.rules, &req.tg_id).await?;
    Ok(Json(history))
}
