//! Multi-currency daily closing series merged on a shared date index.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use metrics::counter;
use serde::Serialize;

use crate::market::{DailyClose, MarketDataProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Currency {
    pub symbol: &'static str,
    pub label: &'static str,
}

/// Pairs offered to the user, in display order.
pub const CURRENCIES: &[Currency] = &[
    Currency {
        symbol: "USDBRL=X",
        label: "Real (BRL)",
    },
    Currency {
        symbol: "USDARS=X",
        label: "Peso Argentino (ARS)",
    },
    Currency {
        symbol: "USDMXN=X",
        label: "Peso Mexicano (MXN)",
    },
    Currency {
        symbol: "USDCNY=X",
        label: "Yuan Chinês (CNY)",
    },
    Currency {
        symbol: "USDINR=X",
        label: "Rúpia Indiana (INR)",
    },
];

/// Catalog entry for `symbol`, ignoring ASCII case.
pub fn lookup(symbol: &str) -> Option<&'static Currency> {
    CURRENCIES
        .iter()
        .find(|c| c.symbol.eq_ignore_ascii_case(symbol.trim()))
}

/// Human-readable label; unknown symbols fall back to the symbol itself.
pub fn label_for(symbol: &str) -> &str {
    lookup(symbol).map(|c| c.label).unwrap_or(symbol)
}

pub fn all_symbols() -> Vec<String> {
    CURRENCIES.iter().map(|c| c.symbol.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesColumn {
    pub symbol: String,
    pub label: String,
    /// `values[i]` is the close on `CurrencySeries::dates[i]`, if that pair traded that day.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrencySeries {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<SeriesColumn>,
}

impl CurrencySeries {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.dates.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn column(&self, symbol: &str) -> Option<&SeriesColumn> {
        self.columns.iter().find(|c| c.symbol == symbol)
    }

    /// Merge per-symbol rows on the union of their dates. Cells for dates a
    /// symbol did not report stay `None`; nothing is filled in.
    pub fn align(per_symbol: Vec<(String, Vec<DailyClose>)>) -> Self {
        let per_symbol: Vec<_> = per_symbol
            .into_iter()
            .filter(|(_, rows)| !rows.is_empty())
            .collect();

        let dates: Vec<NaiveDate> = per_symbol
            .iter()
            .flat_map(|(_, rows)| rows.iter().map(|r| r.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = per_symbol
            .into_iter()
            .map(|(symbol, rows)| {
                let by_date: BTreeMap<NaiveDate, f64> =
                    rows.into_iter().map(|r| (r.date, r.close)).collect();
                SeriesColumn {
                    label: label_for(&symbol).to_string(),
                    values: dates
                        .iter()
                        .map(|d| by_date.get(d).copied())
                        .collect(),
                    symbol,
                }
            })
            .collect();

        Self { dates, columns }
    }
}

/// Fetch each symbol independently and merge. Symbols that error or come back
/// empty are dropped; if all of them do, the result is empty (not an error).
pub async fn fetch_series(
    provider: &dyn MarketDataProvider,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> CurrencySeries {
    let mut fetched = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        match provider.daily_closes(symbol, start, end).await {
            Ok(rows) if rows.is_empty() => {
                tracing::info!(symbol = %symbol, %start, %end, "series: no data, dropping symbol");
            }
            Ok(rows) => fetched.push((symbol.clone(), rows)),
            Err(e) => {
                tracing::warn!(
                    error = %format!("{e:#}"),
                    symbol = %symbol,
                    provider = provider.name(),
                    "series fetch failed, dropping symbol"
                );
                counter!("market_provider_errors_total", "stage" => "series").increment(1);
            }
        }
    }
    CurrencySeries::align(fetched)
}
