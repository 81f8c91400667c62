use std::sync::Arc;

use tracing::error;

use crate::error::ApiError;
use crate::service::{self, SocialService};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub service: SocialService,
}

/// Run a service call on the blocking pool; the store does synchronous I/O.
pub async fn run_blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&SocialService) -> service::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.service))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}
