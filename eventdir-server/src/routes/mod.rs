pub mod health;
pub mod records;
pub mod views;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eventdir_core::EventDirError;
use serde::Serialize;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(records::router())
        .merge(views::router())
        .merge(health::router())
        .with_state(state)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert errors to HTTP responses
pub struct AppError {
    status: StatusCode,
    error: anyhow::Error,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(message.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.error.to_string(),
        });
        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        let status = match error.downcast_ref::<EventDirError>() {
            Some(EventDirError::RecordNotFound(_)) => StatusCode::NOT_FOUND,
            Some(EventDirError::Export(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Some(
                EventDirError::Store(_)
                | EventDirError::StoreStatus { .. }
                | EventDirError::StoreTimeout(_),
            ) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AppError { status, error }
    }
}
