//! Prometheus metrics exposition, mirroring the teacher's use of
//! `metrics` + `metrics-exporter-prometheus` for its own `/metrics` route.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install the Prometheus recorder")
}

pub async fn metrics_handler(
    axum::extract::State(state): axum::extract::State<crate::state::AppState>,
) -> String {
    state.metrics_handle.render()
}

pub fn record_chat_request(query_type: &str, outcome: &str) {
    metrics::counter!("mdgate_chat_requests_total", "type" => query_type.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

pub fn record_chat_latency(millis: f64) {
    metrics::histogram!("mdgate_chat_request_duration_ms").record(millis);
}
