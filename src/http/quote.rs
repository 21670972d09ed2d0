use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use std::time::Instant;

use crate::coordination::{pipeline, Outcome};
use crate::http::request::request_id;
use crate::http::response::quote_response;
use crate::http::server::AppState;
use crate::observability::metrics;

/// `GET /cotacao`: fetch the latest quote, store it, return it.
pub async fn get_quote(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let started = Instant::now();
    let request_id = request_id(&headers).to_string();

    let outcome = pipeline::run(
        state.quotes.as_ref(),
        state.store.as_ref(),
        &state.quote_pair,
        state.budgets,
    )
    .await;

    match &outcome {
        Outcome::Success(record) => tracing::info!(
            request_id = %request_id,
            source = %record.source(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Quote served"
        ),
        // The pipeline already logged the failure at warn.
        Outcome::Failure(failure) => tracing::debug!(
            request_id = %request_id,
            stage = failure.stage().map(|s| s.as_str()).unwrap_or("none"),
            "Quote request failed"
        ),
    }

    let response = quote_response(outcome);
    metrics::record_http("/cotacao", response.status().as_u16());
    response
}

/// `GET /health`.
pub async fn health() -> impl IntoResponse {
    "ok"
}
