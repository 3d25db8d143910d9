use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Prometheus scrape endpoint for the submission counters.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}

/// Register descriptions for the metrics emitted by the form handlers.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "form_submissions_total",
        "Form submissions by form and outcome"
    );
    metrics::describe_counter!(
        "form_notifications_total",
        "Notification email attempts by form and outcome"
    );
    metrics::describe_histogram!(
        "sheets_append_seconds",
        "Time spent appending a row to the spreadsheet"
    );
}
