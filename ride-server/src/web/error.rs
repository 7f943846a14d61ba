//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, info};

use crate::domain::BookingError;
use crate::fare::FareError;
use crate::maps::DistanceError;
use crate::payment::PaymentError;
use crate::session::SessionError;

use super::dto::ErrorResponse;

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest {
        message: String,
        field: Option<&'static str>,
    },
    PaymentRequired { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
    BadGateway { message: String },
    Unavailable { message: String },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::PaymentRequired { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message, .. }
            | AppError::PaymentRequired { message }
            | AppError::NotFound { message }
            | AppError::Conflict { message }
            | AppError::Internal { message }
            | AppError::BadGateway { message }
            | AppError::Unavailable { message } => message,
        }
    }

    fn field(&self) -> Option<&'static str> {
        match self {
            AppError::BadRequest { field, .. } => *field,
            _ => None,
        }
    }
}

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        let message = e.to_string();
        match e {
            BookingError::Validation(v) => AppError::BadRequest {
                message: v.message,
                field: Some(v.field),
            },
            BookingError::NotFound(_) => AppError::NotFound { message },
            BookingError::StateTransition(_)
            | BookingError::FareLocked(_)
            | BookingError::AmountMismatch { .. } => AppError::Conflict { message },
            BookingError::PaymentNotCaptured { .. } => AppError::PaymentRequired { message },
            BookingError::DistanceUnavailable(_) => AppError::Unavailable { message },
            BookingError::Store(_) => AppError::Internal { message },
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::IntentNotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            _ => AppError::BadGateway {
                message: format!("payment processor: {e}"),
            },
        }
    }
}

impl From<DistanceError> for AppError {
    fn from(e: DistanceError) -> Self {
        AppError::Unavailable {
            message: format!("maps provider: {e}"),
        }
    }
}

impl From<FareError> for AppError {
    fn from(e: FareError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
            field: Some("distanceKm"),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, message = self.message(), "request failed");
        } else {
            info!(%status, message = self.message(), "request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.message().to_string(),
            field: self.field(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookingId, BookingStatus, StateTransitionError, ValidationError};

    #[test]
    fn booking_errors_map_to_statuses() {
        let cases = [
            (
                BookingError::Validation(ValidationError::new("pickup", "required")),
                StatusCode::BAD_REQUEST,
            ),
            (
                BookingError::NotFound(BookingId::new("B1")),
                StatusCode::NOT_FOUND,
            ),
            (
                BookingError::StateTransition(StateTransitionError {
                    from: BookingStatus::Completed,
                    to: BookingStatus::Cancelled,
                }),
                StatusCode::CONFLICT,
            ),
            (
                BookingError::AmountMismatch {
                    booking_id: BookingId::new("B1"),
                    expected_minor: 35_000,
                    received_minor: 29_800,
                },
                StatusCode::CONFLICT,
            ),
            (
                BookingError::FareLocked(BookingStatus::Confirmed),
                StatusCode::CONFLICT,
            ),
            (
                BookingError::PaymentNotCaptured {
                    intent_id: "pi_1".into(),
                },
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                BookingError::DistanceUnavailable(DistanceError::RateLimited),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn validation_keeps_the_field() {
        let err = AppError::from(BookingError::Validation(ValidationError::new(
            "contactNumber",
            "not a phone number",
        )));
        assert_eq!(err.field(), Some("contactNumber"));
        assert_eq!(err.message(), "not a phone number");
    }

    #[test]
    fn processor_failures_are_bad_gateway() {
        assert_eq!(
            AppError::from(PaymentError::Unauthorized).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(PaymentError::IntentNotFound("pi_x".into())).status(),
            StatusCode::NOT_FOUND
        );
    }
}
