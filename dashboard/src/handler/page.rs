use std::sync::Arc;

use axum::{response::Html, Extension};
use axum_macros::debug_handler;

use crate::{render, AppState};

#[debug_handler]
pub async fn dashboard(Extension(app_state): Extension<Arc<AppState>>) -> Html<String> {
    let state = app_state.state.read().unwrap();
    Html(render::page(&state, app_state.config.refresh_interval))
}
