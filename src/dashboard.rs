//! Page composition: snapshot, chart and headlines in one view, plus the
//! user-facing status messages.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::chart::{build_chart, Axis, ChartView};
use crate::config::DashboardConfig;
use crate::headlines::{self, HeadlineResult, HttpPageFetcher, PageFetcher, SiteDescriptor};
use crate::market::yahoo::YahooChartProvider;
use crate::market::MarketDataProvider;
use crate::series::{self, fetch_series};
use crate::snapshot::{fetch_snapshot, RateSnapshot};
use crate::translate::{GoogleTranslator, Translator};

pub const MSG_SNAPSHOT_UNAVAILABLE: &str = "Dados do dólar não estão disponíveis no momento.";
pub const MSG_NO_SELECTION: &str = "Por favor, selecione pelo menos uma moeda.";
pub const MSG_NO_DATA: &str = "Nenhum dado disponível para o intervalo selecionado.";
pub const MSG_NO_VARIATION: &str = "Não foi possível calcular a variação.";

/// Everything a page build needs. Cheap to clone; shared by the HTTP layer.
#[derive(Clone)]
pub struct DashboardContext {
    pub config: Arc<DashboardConfig>,
    pub market: Arc<dyn MarketDataProvider>,
    pub pages: Arc<dyn PageFetcher>,
    pub translator: Arc<dyn Translator>,
    pub sites: Arc<Vec<SiteDescriptor>>,
}

impl DashboardContext {
    /// Wire the real collaborators (Yahoo, HTTP pages, Google translate) from config.
    pub fn from_config(
        config: DashboardConfig,
        sites: Vec<SiteDescriptor>,
    ) -> anyhow::Result<Self> {
        let market = YahooChartProvider::new(&config.yahoo_base_url, &config.user_agent)?;
        let pages = HttpPageFetcher::new(&config.user_agent, config.fetch_timeout())?;
        let translator = GoogleTranslator::new(&config.translate_base_url, &config.user_agent)?;
        tracing::info!(
            sites = sites.len(),
            target_language = %config.target_language,
            timeout_secs = config.fetch_timeout_secs,
            "dashboard context ready"
        );
        Ok(Self {
            config: Arc::new(config),
            market: Arc::new(market),
            pages: Arc::new(pages),
            translator: Arc::new(translator),
            sites: Arc::new(sites),
        })
    }
}

/// User input for the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub currencies: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Selection {
    /// All catalog currencies from the configured start date to today.
    pub fn defaults(cfg: &DashboardConfig, now: DateTime<Utc>) -> Self {
        Self {
            currencies: series::all_symbols(),
            start: cfg.default_start,
            end: now.with_timezone(&cfg.zone()).date_naive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SnapshotPanel {
    Available { snapshot: RateSnapshot },
    Unavailable { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeriesPanel {
    NoSelection { message: String },
    NoData { message: String },
    Ready { chart: ChartView },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub snapshot: SnapshotPanel,
    pub series: SeriesPanel,
    pub headlines: Vec<HeadlineResult>,
}

pub async fn snapshot_panel(ctx: &DashboardContext, now: DateTime<Utc>) -> SnapshotPanel {
    let cfg = &ctx.config;
    match fetch_snapshot(
        ctx.market.as_ref(),
        &cfg.snapshot_symbol,
        cfg.snapshot_lookback_days,
        now,
        cfg.zone(),
    )
    .await
    {
        Some(snapshot) => SnapshotPanel::Available { snapshot },
        None => SnapshotPanel::Unavailable {
            message: MSG_SNAPSHOT_UNAVAILABLE.to_string(),
        },
    }
}

/// Empty selection short-circuits before any provider call.
pub async fn series_panel(ctx: &DashboardContext, selection: &Selection) -> SeriesPanel {
    if selection.currencies.is_empty() {
        return SeriesPanel::NoSelection {
            message: MSG_NO_SELECTION.to_string(),
        };
    }
    let data = fetch_series(
        ctx.market.as_ref(),
        &selection.currencies,
        selection.start,
        selection.end,
    )
    .await;
    if data.is_empty() {
        return SeriesPanel::NoData {
            message: MSG_NO_DATA.to_string(),
        };
    }
    SeriesPanel::Ready {
        chart: build_chart(&data, ctx.config.secondary_axis_symbol.as_deref()),
    }
}

pub async fn headlines_panel(ctx: &DashboardContext) -> Vec<HeadlineResult> {
    headlines::fetch_all(
        &ctx.sites,
        Arc::clone(&ctx.pages),
        Arc::clone(&ctx.translator),
        &ctx.config.target_language,
    )
    .await
}

/// Snapshot and series run one after the other; headlines fan out last.
pub async fn build_dashboard(
    ctx: &DashboardContext,
    selection: &Selection,
    now: DateTime<Utc>,
) -> DashboardView {
    let snapshot = snapshot_panel(ctx, now).await;
    let series = series_panel(ctx, selection).await;
    let headlines = headlines_panel(ctx).await;
    DashboardView {
        snapshot,
        series,
        headlines,
    }
}

/// Plain-text rendering of a page, used by the terminal demo.
pub fn render_text(view: &DashboardView, cfg: &DashboardConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dashboard de Taxas de Câmbio");
    let _ = writeln!(out);

    match &view.snapshot {
        SnapshotPanel::Available { snapshot } => {
            let _ = writeln!(out, "Cotação Atual do Dólar");
            if let Some(last) = snapshot.last_close {
                let _ = writeln!(
                    out,
                    "Cotação Atual (USD/BRL): R$ {last:.2} - Fonte: Yahoo Finance"
                );
            }
            let _ = writeln!(
                out,
                "Hora da coleta: {} (Horário de Brasília)",
                snapshot.captured_at.format("%Y-%m-%d %H:%M:%S")
            );
            match (
                snapshot.direction(),
                snapshot.variation(),
                snapshot.percentage_change(),
            ) {
                (Some(dir), Some(var), Some(pct)) => {
                    let _ = writeln!(out, "Variação: {} R$ {var:.2} ({pct:.2}%)", dir.arrow());
                }
                _ => {
                    let _ = writeln!(out, "{MSG_NO_VARIATION}");
                }
            }
        }
        SnapshotPanel::Unavailable { message } => {
            let _ = writeln!(out, "{message}");
        }
    }
    let _ = writeln!(out);

    match &view.series {
        SeriesPanel::NoSelection { message } | SeriesPanel::NoData { message } => {
            let _ = writeln!(out, "{message}");
        }
        SeriesPanel::Ready { chart } => {
            let _ = writeln!(out, "{}", chart.title);
            for trace in &chart.traces {
                let last = trace.y.iter().rev().find_map(|v| *v);
                let last = last.map_or("-".to_string(), |v| format!("{v:.4}"));
                let _ = writeln!(
                    out,
                    "  {} [{}]: {} pontos, último {}",
                    trace.name,
                    if trace.axis == Axis::Secondary {
                        "eixo secundário"
                    } else {
                        "eixo principal"
                    },
                    trace.y.iter().filter(|v| v.is_some()).count(),
                    last
                );
            }
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Manchetes Internacionais (traduzidas para '{}')",
        cfg.target_language
    );
    for h in &view.headlines {
        match h {
            HeadlineResult::Success {
                site_name,
                translated_title,
                translated_subtitle,
            } => {
                let _ = writeln!(out, "### Manchete de {site_name} ###");
                let _ = writeln!(out, "Título: {translated_title}");
                if let Some(sub) = translated_subtitle {
                    let _ = writeln!(out, "Subtítulo: {sub}");
                }
            }
            HeadlineResult::Failure {
                site_name,
                error_message,
            } => {
                let _ = writeln!(
                    out,
                    "Erro ao buscar manchetes de {site_name}: {error_message}"
                );
            }
        }
        let _ = writeln!(out);
    }
    out
}
