use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::handlers::shared::ApiResponse;
use crate::services::{BookingError, ErrorKind};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Booking(#[from] BookingError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    InternalServerError(Option<String>),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Booking(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidInput | ErrorKind::Conflict | ErrorKind::StateViolation => {
                    StatusCode::BAD_REQUEST
                }
                ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();

        // Storage failures are logged in full but never echoed to the client.
        let error_message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("Request failed with status {}: {}", status_code, self);
            "Internal server error".to_string()
        } else {
            log::warn!("Request failed with status {}: {}", status_code, self);
            self.to_string()
        };

        HttpResponse::build(status_code).json(ApiResponse::<()>::error(&error_message))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        log::error!("Anyhow error: {}", error);
        AppError::InternalServerError(Some(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn maps_booking_errors_by_kind() {
        assert_eq!(
            AppError::from(BookingError::RoomNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(BookingError::RoomFull).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(BookingError::TimeConflict).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(BookingError::InvalidDate).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(BookingError::Store(StoreError::Backend("down".into()))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn keeps_the_booking_message() {
        let err = AppError::from(BookingError::TeamSizeMismatch { required: 5 });
        assert_eq!(err.to_string(), "Team size mismatch. Required: 5 players");
    }
}
