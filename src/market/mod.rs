// src/market/mod.rs
pub mod yahoo;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;

/// One daily row from the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// Daily closing prices for one currency pair.
///
/// `end` follows the provider's own convention (exclusive for Yahoo); callers
/// pass dates through untouched. An empty vector means "no data", not an error.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>>;
    fn name(&self) -> &'static str;
}
