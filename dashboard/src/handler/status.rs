use std::sync::Arc;

use axum::{Extension, Json};
use axum_macros::debug_handler;
use resources::models::{ErrResponse, RefreshStatus, Response};
use tokio::sync::mpsc::error::TrySendError;

use super::response::HandlerResult;
use crate::AppState;

#[debug_handler]
pub async fn get(Extension(app_state): Extension<Arc<AppState>>) -> HandlerResult<RefreshStatus> {
    let status = app_state.state.read().unwrap().status();
    Ok(Json(Response::new(None, Some(status))))
}

#[debug_handler]
pub async fn refresh(Extension(app_state): Extension<Arc<AppState>>) -> HandlerResult<()> {
    match app_state.refresh_tx.try_send(()) {
        // A full queue means a refresh is already pending
        Ok(_) | Err(TrySendError::Full(_)) => {
            Ok(Json(Response::new(Some("refresh triggered".to_string()), None)))
        },
        Err(err) => {
            tracing::error!("Failed to trigger refresh: {}", err);
            Err(ErrResponse::new(
                "Failed to trigger refresh".to_string(),
                Some(err.to_string()),
            ))
        },
    }
}
