use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::constants::INTERNAL_ERROR;
use shared::discount_claim::ErrorResponse;

use crate::services::mail_service::MailError;

#[derive(Debug)]
pub enum Error {
    BadRequest(&'static str),
    Conflict(&'static str),
    Mail(MailError),
}

impl From<MailError> for Error {
    fn from(err: MailError) -> Self {
        Error::Mail(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Error::Conflict(message) => (StatusCode::CONFLICT, message),
            Error::Mail(e) => {
                tracing::error!("Failed to deliver discount email: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}
