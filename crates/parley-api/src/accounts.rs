use axum::{Json, extract::State};

use parley_types::api::{LoginRequest, RegisterRequest};
use parley_types::models::Account;

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::{AppState, run_blocking};

pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Json<Account>, ApiError> {
    let account = run_blocking(&state, move |svc| {
        svc.register_account(&req.username, &req.password)
    })
    .await?;

    Ok(Json(account))
}

/// No session or token is issued; a match simply echoes the account back.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<Account>, ApiError> {
    let account = run_blocking(&state, move |svc| svc.login(&req.username, &req.password)).await?;

    Ok(Json(account))
}
