use std::sync::Arc;

use axum::{Extension, Json};
use axum_macros::debug_handler;
use resources::{models::Response, objects::hardware::HardwareNodeRecord};

use super::response::HandlerResult;
use crate::AppState;

#[debug_handler]
pub async fn list(
    Extension(app_state): Extension<Arc<AppState>>,
) -> HandlerResult<Vec<HardwareNodeRecord>> {
    let state = app_state.state.read().unwrap();
    let hardware = state
        .snapshot
        .as_ref()
        .map(|snapshot| snapshot.hardware.clone())
        .unwrap_or_default();

    let res = Response::new(None, Some(hardware));
    Ok(Json(res))
}
