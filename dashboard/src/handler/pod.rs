use std::sync::Arc;

use axum::{Extension, Json};
use axum_macros::debug_handler;
use resources::{models::Response, objects::pod::PodRecord};

use super::response::HandlerResult;
use crate::AppState;

#[debug_handler]
pub async fn list(Extension(app_state): Extension<Arc<AppState>>) -> HandlerResult<Vec<PodRecord>> {
    let state = app_state.state.read().unwrap();
    let pods = state
        .snapshot
        .as_ref()
        .map(|snapshot| snapshot.pods.clone())
        .unwrap_or_default();

    let res = Response::new(None, Some(pods));
    Ok(Json(res))
}
