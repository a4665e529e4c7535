use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Serialize, Deserialize)]
pub struct Response<T: Serialize> {
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T: Serialize> Response<T> {
    pub fn new(msg: Option<String>, data: Option<T>) -> Self {
        Response {
            msg,
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrResponse {
    pub msg: String,
    pub cause: Option<String>,
}

impl ErrResponse {
    pub fn new(msg: String, cause: Option<String>) -> Self {
        ErrResponse {
            msg,
            cause,
        }
    }
}

impl IntoResponse for ErrResponse {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self)).into_response()
    }
}

/// Where the refresh cycle currently stands.
#[derive(Debug, Serialize, Deserialize, Display, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RefreshPhase {
    /// No refresh has run yet.
    Idle,
    /// A refresh tick is in flight.
    Loading,
    /// The last tick completed and its snapshot is published.
    Rendered,
    /// The last tick died before producing a snapshot.
    Failed,
}

/// Refresh-cycle status reported by the dashboard API.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RefreshStatus {
    pub phase: RefreshPhase,
    /// Completion time of the last successful tick.
    pub last_updated: Option<NaiveDateTime>,
    /// Error of the last failed tick, cleared on success.
    pub last_error: Option<String>,
}
