use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::WithRejection;

use parley_types::api::{PostMessageRequest, UpdateMessageRequest};
use parley_types::models::Message;

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::{AppState, run_blocking};

type IdPath = WithRejection<Path<i32>, ApiError>;

pub async fn post_message(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<PostMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let message = run_blocking(&state, move |svc| {
        svc.post_message(req.posted_by, &req.message_text, req.time_posted_epoch)
    })
    .await?;

    Ok(Json(message))
}

pub async fn get_all_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = run_blocking(&state, |svc| svc.all_messages()).await?;
    Ok(Json(messages))
}

pub async fn get_message(
    State(state): State<AppState>,
    WithRejection(Path(message_id), _): IdPath,
) -> Result<Response, ApiError> {
    let message = run_blocking(&state, move |svc| svc.get_message(message_id)).await?;
    Ok(json_or_empty(message))
}

pub async fn delete_message(
    State(state): State<AppState>,
    WithRejection(Path(message_id), _): IdPath,
) -> Result<Response, ApiError> {
    let deleted = run_blocking(&state, move |svc| svc.delete_message(message_id)).await?;
    Ok(json_or_empty(deleted))
}

pub async fn update_message(
    State(state): State<AppState>,
    WithRejection(Path(message_id), _): IdPath,
    JsonBody(req): JsonBody<UpdateMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let message = run_blocking(&state, move |svc| {
        svc.update_message(message_id, &req.message_text)
    })
    .await?;

    Ok(Json(message))
}

pub async fn get_account_messages(
    State(state): State<AppState>,
    WithRejection(Path(account_id), _): IdPath,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = run_blocking(&state, move |svc| svc.account_messages(account_id)).await?;
    Ok(Json(messages))
}

/// Absent messages answer 200 with an empty body rather than 404.
fn json_or_empty(message: Option<Message>) -> Response {
    match message {
        Some(message) => Json(message).into_response(),
        None => StatusCode::OK.into_response(),
    }
}
