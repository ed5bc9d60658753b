use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

/// Register descriptions so series show up on /metrics before the first event.
pub fn describe_all() {
    describe_counter!(
        "headline_fetch_total",
        "Headline fetches by outcome (success/failure)."
    );
    describe_histogram!(
        "headline_fetch_ms",
        "Fetch + extract + translate time per site in milliseconds."
    );
    describe_counter!(
        "market_requests_total",
        "Requests sent to the market-data provider."
    );
    describe_counter!(
        "market_provider_errors_total",
        "Market-data provider errors by stage (snapshot/series)."
    );
    describe_counter!(
        "translate_requests_total",
        "Requests sent to the translation provider."
    );
}

impl Metrics {
    /// Install the Prometheus recorder and describe the dashboard series.
    pub fn init() -> anyhow::Result<Self> {
        // Use default buckets to avoid API differences across crate versions.
        let handle = PrometheusBuilder::new().install_recorder()?;
        describe_all();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
