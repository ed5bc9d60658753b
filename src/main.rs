//! Exchange-rate dashboard service: binary entrypoint
//! Boots the Axum HTTP server, wiring config, collaborators, routes and metrics.

use cambio_dashboard::config::DashboardConfig;
use cambio_dashboard::headlines::load_sites_default;
use cambio_dashboard::metrics::Metrics;
use cambio_dashboard::{api, init_tracing, DashboardContext};
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = DashboardConfig::load_default()?;
    let sites = load_sites_default()?;
    let ctx = DashboardContext::from_config(config, sites)?;

    let metrics = Metrics::init()?;
    let router = api::create_router(ctx).merge(metrics.router());

    Ok(router.into())
}
