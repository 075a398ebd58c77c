use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cwt_checkout::CheckoutError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    /// The one fatal checkout condition besides bad input: no booking
    /// number could be obtained at all. The response carries a flag so the
    /// frontend can distinguish it from a generic failure.
    SequenceUnavailable(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn from_checkout(err: CheckoutError) -> Self {
        match err {
            CheckoutError::EmptyCart => AppError::ValidationError(err.to_string()),
            CheckoutError::Sequence(inner) => AppError::SequenceUnavailable(inner.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            AppError::SequenceUnavailable(msg) => {
                tracing::error!("Booking sequence unavailable: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Checkout could not be processed",
                        "sequence_unavailable": true,
                    })),
                )
                    .into_response()
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
