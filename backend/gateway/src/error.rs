//! HTTP error mapping.
//!
//! Every failure leaves the gateway as `{"detail": "..."}`. Internal failures
//! share one generic message; the specific kind is only logged.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use billscope_core::BillError;

pub const ONLY_PDF_DETAIL: &str = "Only PDF files are allowed";
pub const NO_FILE_DETAIL: &str = "No file provided";
pub const INTERNAL_DETAIL: &str = "An error occurred while processing the file";
pub const RATE_LIMITED_DETAIL: &str = "Too Many Requests";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 with the given detail.
    BadRequest(String),
    /// 429 with a `Retry-After` header.
    TooManyRequests { retry_after_secs: u64 },
    /// 500 with the generic detail.
    Internal,
}

impl From<BillError> for ApiError {
    fn from(err: BillError) -> Self {
        match err {
            BillError::Validation(message) => ApiError::BadRequest(message),
            BillError::RateLimited {
                retry_after_secs, ..
            } => ApiError::TooManyRequests { retry_after_secs },
            _ => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { detail })).into_response()
            }
            ApiError::TooManyRequests { retry_after_secs } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorBody {
                        detail: RATE_LIMITED_DETAIL.into(),
                    }),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    detail: INTERNAL_DETAIL.into(),
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_domain_errors_to_status() {
        let cases = [
            (BillError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                BillError::RateLimited {
                    identity: "1.2.3.4".into(),
                    retry_after_secs: 7,
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (BillError::Parse("no braces".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (BillError::Extraction("corrupt".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn too_many_requests_sets_retry_after() {
        let response = ApiError::TooManyRequests {
            retry_after_secs: 42,
        }
        .into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }
}
