use axum::Json;
use resources::models::{ErrResponse, Response};

pub type HandlerResult<T> = Result<Json<Response<T>>, ErrResponse>;
