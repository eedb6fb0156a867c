use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use givd_core::consumption::FeedError;
use givd_core::errors::{Error as CoreError, StoreError};
use serde::Serialize;
use thiserror::Error;

#[allow(dead_code)]
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(String),
    // Surface the underlying error message to help debugging during development
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::PlanLimitReached(_) => StatusCode::PAYMENT_REQUIRED,
        CoreError::NotFound(_) | CoreError::Store(StoreError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        CoreError::Feed(FeedError::NotAuthenticated) => StatusCode::UNAUTHORIZED,
        CoreError::Feed(_) | CoreError::Store(_) => StatusCode::BAD_GATEWAY,
        CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => (core_status(e), e.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Unauthorized(reason) => (StatusCode::UNAUTHORIZED, reason.clone()),
            ApiError::Internal(reason) => (StatusCode::INTERNAL_SERVER_ERROR, reason.clone()),
            ApiError::Anyhow(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };
        if status.is_server_error() {
            tracing::warn!("Request failed with {}: {}", status, msg);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        ApiError::Core(CoreError::Feed(err))
    }
}
