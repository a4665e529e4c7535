use std::sync::Arc;

use axum::{Extension, Json};
use axum_macros::debug_handler;
use resources::{models::Response, objects::node::NodeRecord};

use super::response::HandlerResult;
use crate::AppState;

#[debug_handler]
pub async fn list(
    Extension(app_state): Extension<Arc<AppState>>,
) -> HandlerResult<Vec<NodeRecord>> {
    let state = app_state.state.read().unwrap();
    let nodes = state
        .snapshot
        .as_ref()
        .map(|snapshot| snapshot.nodes.clone())
        .unwrap_or_default();

    let res = Response::new(None, Some(nodes));
    Ok(Json(res))
}
