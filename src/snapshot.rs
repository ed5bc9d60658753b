//! Rate snapshot: latest and previous daily close for one pair, stamped in the
//! dashboard time zone.

use chrono::{DateTime, Days, FixedOffset, Utc};
use metrics::counter;
use serde::{Serialize, Serializer};

use crate::market::MarketDataProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
            Direction::Flat => "→",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateSnapshot {
    pub symbol: String,
    pub last_close: Option<f64>,
    pub previous_close: Option<f64>,
    pub captured_at: DateTime<FixedOffset>,
}

impl RateSnapshot {
    /// `last_close - previous_close`; absent unless both closes exist.
    pub fn variation(&self) -> Option<f64> {
        Some(self.last_close? - self.previous_close?)
    }

    pub fn percentage_change(&self) -> Option<f64> {
        let prev = self.previous_close?;
        if prev == 0.0 {
            return None;
        }
        Some(self.variation()? / prev * 100.0)
    }

    pub fn direction(&self) -> Option<Direction> {
        let v = self.variation()?;
        Some(if v > 0.0 {
            Direction::Up
        } else if v < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        })
    }
}

impl Serialize for RateSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Out<'a> {
            symbol: &'a str,
            last_close: Option<f64>,
            previous_close: Option<f64>,
            variation: Option<f64>,
            percentage_change: Option<f64>,
            direction: Option<Direction>,
            captured_at: String,
        }
        Out {
            symbol: &self.symbol,
            last_close: self.last_close,
            previous_close: self.previous_close,
            variation: self.variation(),
            percentage_change: self.percentage_change(),
            direction: self.direction(),
            captured_at: self.captured_at.to_rfc3339(),
        }
        .serialize(serializer)
    }
}

/// Fetch the last `lookback_days` of closes ending today and build a snapshot.
///
/// Returns `None` when the provider errors or returns no rows; never panics.
pub async fn fetch_snapshot(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    lookback_days: u32,
    now: DateTime<Utc>,
    zone: FixedOffset,
) -> Option<RateSnapshot> {
    let captured_at = now.with_timezone(&zone);
    let end = captured_at.date_naive();
    let start = end
        .checked_sub_days(Days::new(u64::from(lookback_days)))
        .unwrap_or(end);

    let rows = match provider.daily_closes(symbol, start, end).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(
                error = %format!("{e:#}"),
                symbol,
                provider = provider.name(),
                "snapshot fetch failed"
            );
            counter!("market_provider_errors_total", "stage" => "snapshot").increment(1);
            return None;
        }
    };

    let (last, previous) = match rows.as_slice() {
        [] => {
            tracing::info!(symbol, "snapshot: provider returned no rows");
            return None;
        }
        [only] => (only.close, None),
        [.., prev, last] => (last.close, Some(prev.close)),
    };

    Some(RateSnapshot {
        symbol: symbol.to_string(),
        last_close: Some(last),
        previous_close: previous,
        captured_at,
    })
}
