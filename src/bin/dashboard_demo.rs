//! Demo that builds one dashboard page against the live providers and prints it.
//! Optional args: comma-separated symbols, start date, end date (YYYY-MM-DD).

use anyhow::Context;
use cambio_dashboard::config::DashboardConfig;
use cambio_dashboard::dashboard::render_text;
use cambio_dashboard::headlines::load_sites_default;
use cambio_dashboard::{build_dashboard, init_tracing, DashboardContext, Selection};
use chrono::{NaiveDate, Utc};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = DashboardConfig::load_default()?;
    let now = Utc::now();
    let mut selection = Selection::defaults(&config, now);

    let mut args = std::env::args().skip(1);
    if let Some(symbols) = args.next() {
        selection.currencies = symbols
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(start) = args.next() {
        selection.start = NaiveDate::parse_from_str(&start, "%Y-%m-%d")
            .with_context(|| format!("invalid start date {start}"))?;
    }
    if let Some(end) = args.next() {
        selection.end = NaiveDate::parse_from_str(&end, "%Y-%m-%d")
            .with_context(|| format!("invalid end date {end}"))?;
    }

    let ctx = DashboardContext::from_config(config, load_sites_default()?)?;
    let view = build_dashboard(&ctx, &selection, now).await;
    print!("{}", render_text(&view, &ctx.config));
    Ok(())
}
