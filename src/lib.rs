// src/lib.rs
// Public library surface for the server binary, the terminal demo and integration tests.

pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod headlines;
pub mod market;
pub mod metrics;
pub mod series;
pub mod snapshot;
pub mod translate;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::dashboard::{build_dashboard, DashboardContext, DashboardView, Selection};
pub use crate::headlines::{HeadlineResult, SiteDescriptor};
pub use crate::snapshot::RateSnapshot;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const ENV_LOG_FORMAT: &str = "DASHBOARD_LOG_FORMAT";

/// Install a tracing subscriber (`RUST_LOG` filter, compact or JSON output).
///
/// Uses `try_init`, so a subscriber already installed by the host runtime wins
/// and this becomes a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cambio_dashboard=info,warn"));

    let json = std::env::var(ENV_LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
