// src/market/yahoo.rs
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use metrics::counter;
use reqwest::Url;
use serde::Deserialize;

use super::{DailyClose, MarketDataProvider};

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Meta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

/// Yahoo Finance v8 chart endpoint, daily interval.
pub struct YahooChartProvider {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()
            .context("building yahoo http client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// `{base}/v8/finance/chart/{symbol}` with the symbol percent-encoded as a
    /// single path segment.
    fn chart_url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid yahoo base url {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("yahoo base url cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartProvider {
    async fn daily_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>> {
        counter!("market_requests_total", "provider" => "yahoo").increment(1);

        let period1 = unix_midnight(start);
        let period2 = unix_midnight(end);
        let resp = self
            .http
            .get(self.chart_url(symbol)?)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("yahoo chart request for {symbol}"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("yahoo chart body for {symbol}"))?;

        // Yahoo reports unknown symbols as 404 with a JSON error object.
        match parse_chart_json(&body) {
            Ok(rows) if status.is_success() => Ok(rows),
            Ok(_) => Err(anyhow!("yahoo chart for {symbol}: HTTP {status}")),
            Err(e) if status.is_success() => Err(e),
            Err(e) => Err(e.context(format!("yahoo chart for {symbol}: HTTP {status}"))),
        }
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

fn unix_midnight(d: NaiveDate) -> i64 {
    d.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Parse a v8 chart payload into daily closes, oldest first.
///
/// Null closes are skipped; a result without a close column yields no rows.
/// Rows falling on the same exchange-local date keep the later value.
pub fn parse_chart_json(body: &str) -> Result<Vec<DailyClose>> {
    let env: ChartEnvelope = serde_json::from_str(body).context("parsing yahoo chart json")?;

    if let Some(err) = env.chart.error {
        return Err(anyhow!(
            "yahoo chart error {}: {}",
            err.code.unwrap_or_default(),
            err.description.unwrap_or_default()
        ));
    }

    let Some(result) = env.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let quote = result.indicators.quote.into_iter().next();
    let Some(closes) = quote.and_then(|q| q.close) else {
        return Ok(Vec::new());
    };

    let offset = result.meta.gmtoffset;
    let mut out: Vec<DailyClose> = Vec::with_capacity(closes.len());
    for (ts, close) in result.timestamp.iter().zip(closes) {
        let Some(close) = close else { continue };
        let Some(local) = DateTime::from_timestamp(ts + offset, 0) else {
            continue;
        };
        let row = DailyClose {
            date: local.date_naive(),
            close,
        };
        match out.last_mut() {
            Some(last) if last.date == row.date => *last = row,
            _ => out.push(row),
        }
    }
    Ok(out)
}
