//! Error types for the roster service.
//!
//! This module defines the central `Error` enum, which captures every
//! recoverable and reportable failure in the system. It implements
//! `IntoResponse` so handlers can return errors directly, with each variant
//! mapping to exactly one HTTP status and JSON body.
//!
//! ## Error Cases
//! - `InvalidRequest`: the request body or path could not be decoded.
//! - `NotFound`: no student exists with the requested id.
//! - `StoreUnavailable`: the backing store failed for a transient reason.
//! - `StoreFailure`: the backing store rejected the operation outright.
//! - `StoreDeadline`: a single store call outlived its per-call deadline.
//! - `DeadlineExceeded`: the end-to-end request deadline elapsed first.
//! - `PoolUnavailable`: the dispatch queue is closed (service shutting down).
//! - `ReplyDropped`: a task died before writing into its reply slot.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the roster service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request body or path could not be decoded.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// No student exists with the requested id.
    #[error("Student not found")]
    NotFound,

    /// The backing store failed for a transient reason (lost connection,
    /// resource exhaustion); a later request may succeed.
    #[error("Store unavailable: {context}")]
    StoreUnavailable { context: String },

    /// The backing store rejected the operation.
    #[error("Store failure: {context}")]
    StoreFailure { context: String },

    /// A single store call outlived its per-call deadline and gave up.
    #[error("Store call exceeded its deadline")]
    StoreDeadline,

    /// The end-to-end request deadline elapsed before a worker produced a
    /// result. The underlying task is not cancelled.
    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    /// The dispatch queue is closed; the service is shutting down.
    #[error("Worker pool unavailable")]
    PoolUnavailable,

    /// The task's reply slot was dropped before a result was written.
    #[error("Reply channel closed before a result was produced")]
    ReplyDropped,
}

impl Error {
    /// The HTTP status this error surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::StoreUnavailable { .. } | Self::PoolUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::StoreFailure { .. } | Self::StoreDeadline | Self::ReplyDropped => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<tokio_postgres::Error> for Error {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.is_closed() {
            return Self::StoreUnavailable {
                context: err.to_string(),
            };
        }
        match err.code() {
            Some(state) if is_transient_sqlstate(state.code()) => Self::StoreUnavailable {
                context: err.to_string(),
            },
            _ => Self::StoreFailure {
                context: err.to_string(),
            },
        }
    }
}

/// Connection-class (08xxx) and resource-class (53xxx) SQLSTATEs, plus
/// `cannot_connect_now`, are retryable by a later request. Everything else
/// is a hard failure.
fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08") || code.starts_with("53") || code == "57P03"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_maps_to_exactly_one_status() {
        let cases = [
            (
                Error::InvalidRequest {
                    reason: "bad body".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (Error::NotFound, StatusCode::NOT_FOUND),
            (
                Error::StoreUnavailable {
                    context: "connection reset".into(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                Error::StoreFailure {
                    context: "syntax error".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (Error::StoreDeadline, StatusCode::INTERNAL_SERVER_ERROR),
            (Error::DeadlineExceeded, StatusCode::GATEWAY_TIMEOUT),
            (Error::PoolUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (Error::ReplyDropped, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "wrong status for {err}");
        }
    }

    #[test]
    fn guard_timeouts_are_distinguishable_from_store_failures() {
        assert_ne!(
            Error::DeadlineExceeded.status(),
            Error::StoreDeadline.status()
        );
    }

    #[test]
    fn sqlstate_classification() {
        // Connection and resource classes are transient.
        assert!(is_transient_sqlstate("08006"));
        assert!(is_transient_sqlstate("08001"));
        assert!(is_transient_sqlstate("53300"));
        assert!(is_transient_sqlstate("57P03"));

        // Constraint violations and syntax errors are not.
        assert!(!is_transient_sqlstate("23505"));
        assert!(!is_transient_sqlstate("42601"));
    }
}
