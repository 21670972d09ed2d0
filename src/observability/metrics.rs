//! Metrics collection and exposition.
//!
//! # Metrics
//! - `provider_calls_total` (counter): provider calls by provider, result
//! - `provider_call_duration_seconds` (histogram): per-provider latency
//! - `race_outcomes_total` (counter): races by outcome
//! - `race_duration_seconds` (histogram): time to settle a race
//! - `pipeline_outcomes_total` (counter): stage results by stage, outcome
//! - `pipeline_stage_duration_seconds` (histogram): per-stage latency
//! - `http_requests_total` (counter): server responses by path, status
//!
//! Recording is a no-op until `init_metrics` installs a recorder.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::coordination::{ProviderId, Stage};

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_provider_call(provider: ProviderId, result: &'static str, started: Instant) {
    counter!("provider_calls_total", "provider" => provider.as_str(), "result" => result).increment(1);
    histogram!("provider_call_duration_seconds", "provider" => provider.as_str())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_race(outcome: &'static str, started: Instant) {
    counter!("race_outcomes_total", "outcome" => outcome).increment(1);
    histogram!("race_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_stage(stage: Stage, outcome: &'static str, started: Instant) {
    counter!("pipeline_outcomes_total", "stage" => stage.as_str(), "outcome" => outcome).increment(1);
    histogram!("pipeline_stage_duration_seconds", "stage" => stage.as_str())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_http(path: &'static str, status: u16) {
    counter!("http_requests_total", "path" => path, "status" => status.to_string()).increment(1);
}
