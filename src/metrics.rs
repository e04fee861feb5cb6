use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("reports_generated").absolute(0);
    counter!("report_failures").absolute(0);
    counter!("bitquery_requests_total").absolute(0);
    counter!("bitquery_retries_total").absolute(0);
    counter!("market_holders_filtered").absolute(0);

    // Histogram is lazily created on first record; force creation.
    histogram!("analysis_latency_seconds").record(0.0);

    Ok(handle)
}

/// A handle backed by a recorder that is not installed globally.
///
/// Renders an empty payload; used where a process-wide recorder already
/// exists or must not be installed.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
