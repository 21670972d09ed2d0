//! Mapping pipeline outcomes to HTTP responses.
//!
//! ```text
//! Success                      → 200, JSON {"bid": ...}
//! Failure(Timeout, Fetch)      → 408
//! Failure(other, Fetch)        → 502
//! Failure(any, Persist)        → 500
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::coordination::{Failure, Outcome, Stage};
use crate::record::NormalizedRecord;

/// Status code for a failed quote request.
pub fn status_for(failure: &Failure) -> StatusCode {
    match failure.stage() {
        Some(Stage::Persist) => StatusCode::INTERNAL_SERVER_ERROR,
        _ if failure.is_timeout() => StatusCode::REQUEST_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn message_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::REQUEST_TIMEOUT => "Upstream quote API timed out",
        StatusCode::BAD_GATEWAY => "Upstream quote API failed",
        _ => "Failed to save quote",
    }
}

/// Render a quote pipeline outcome.
pub fn quote_response(outcome: Outcome<NormalizedRecord>) -> Response {
    match outcome {
        Outcome::Success(record) => match record.as_quote() {
            Some(quote) => (StatusCode::OK, Json(quote.clone())).into_response(),
            None => (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected record").into_response(),
        },
        Outcome::Failure(failure) => {
            let status = status_for(&failure);
            (status, message_for(status)).into_response()
        }
    }
}
