use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cointrail_core::errors::Error as CoreError;
use cointrail_market_data::MarketDataError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    MarketData(#[from] MarketDataError),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => match e {
                CoreError::Validation(_) => StatusCode::BAD_REQUEST,
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::MarketData(_) => StatusCode::BAD_GATEWAY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
