pub mod accounts;
pub mod error;
pub mod extract;
pub mod messages;
pub mod service;
pub mod state;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};

pub use state::{AppState, AppStateInner};

/// All routes, without transport layers (CORS, tracing) applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route(
            "/messages",
            post(messages::post_message).get(messages::get_all_messages),
        )
        .route(
            "/messages/{message_id}",
            get(messages::get_message)
                .delete(messages::delete_message)
                .patch(messages::update_message),
        )
        .route("/accounts/{account_id}/messages", get(messages::get_account_messages))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
