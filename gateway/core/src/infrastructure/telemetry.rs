// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Telemetry - Prometheus metrics for generation traffic
//
// Metrics go through the `metrics` facade; without an installed recorder every
// call below is a no-op, which is what library users and tests get.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

pub const REQUESTS_TOTAL: &str = "llm_requests_total";
pub const FALLBACKS_TOTAL: &str = "llm_fallbacks_total";
pub const REQUEST_DURATION: &str = "llm_request_duration_seconds";

/// Outcome label for `llm_requests_total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Carries the error code, e.g. "PROVIDER_TIMEOUT"
    Error(&'static str),
}

impl Outcome {
    fn label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Error(code) => code,
        }
    }
}

/// Install the global Prometheus recorder and return a handle for rendering `/metrics`.
/// Fails if a recorder is already installed in this process.
pub fn install_prometheus_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    describe_counter!(REQUESTS_TOTAL, "Generation requests by provider, model and outcome");
    describe_counter!(FALLBACKS_TOTAL, "Requests retried against the fallback provider");
    describe_histogram!(
        REQUEST_DURATION,
        Unit::Seconds,
        "Latency of a single provider call"
    );

    Ok(handle)
}

pub fn record_request(provider: &str, model: &str, outcome: Outcome, elapsed: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "provider" => provider.to_string(),
        "model" => model.to_string(),
        "outcome" => outcome.label()
    )
    .increment(1);
    histogram!(
        REQUEST_DURATION,
        "provider" => provider.to_string(),
        "model" => model.to_string()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_fallback(from: &str, to: &str) {
    counter!(FALLBACKS_TOTAL, "from" => from.to_string(), "to" => to.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Success.label(), "success");
        assert_eq!(Outcome::Error("PROVIDER_TIMEOUT").label(), "PROVIDER_TIMEOUT");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request("google", "gemini-2.5-flash", Outcome::Success, Duration::from_millis(5));
        record_fallback("google", "openai");
    }
}
