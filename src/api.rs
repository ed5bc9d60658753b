// src/api.rs
use chrono::{DateTime, NaiveDate, Utc};
use shuttle_axum::axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::dashboard::{
    build_dashboard, headlines_panel, series_panel, snapshot_panel, DashboardContext,
    DashboardView, Selection, SeriesPanel, SnapshotPanel,
};
use crate::headlines::HeadlineResult;
use crate::series::{self, Currency, CURRENCIES};

pub type AppState = DashboardContext;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/currencies", get(currencies))
        .route("/api/snapshot", get(snapshot))
        .route("/api/series", get(series))
        .route("/api/headlines", get(headlines))
        .route("/api/dashboard", get(dashboard))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Alias kept so callers can write `cambio_dashboard::router(state)`.
pub fn router(state: AppState) -> Router {
    create_router(state)
}

/// `?currencies=USDBRL=X,USDARS=X&start=2023-01-01&end=2024-01-01`
///
/// A missing `currencies` means "all"; present but empty means "none selected".
/// Only catalog pairs are accepted.
#[derive(Debug, Default, serde::Deserialize)]
pub struct SelectionQuery {
    pub currencies: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

type ApiError = (StatusCode, String);

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("invalid {field} date '{raw}': {e} (expected YYYY-MM-DD)"),
        )
    })
}

pub fn selection_from_query(
    q: &SelectionQuery,
    state: &AppState,
    now: DateTime<Utc>,
) -> Result<Selection, ApiError> {
    let mut sel = Selection::defaults(&state.config, now);
    if let Some(raw) = &q.currencies {
        sel.currencies = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                series::lookup(s)
                    .map(|c| c.symbol.to_string())
                    .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("unknown currency '{s}'")))
            })
            .collect::<Result<_, _>>()?;
    }
    if let Some(raw) = q.start.as_deref().filter(|s| !s.trim().is_empty()) {
        sel.start = parse_date("start", raw)?;
    }
    if let Some(raw) = q.end.as_deref().filter(|s| !s.trim().is_empty()) {
        sel.end = parse_date("end", raw)?;
    }
    Ok(sel)
}

async fn currencies() -> Json<&'static [Currency]> {
    Json(CURRENCIES)
}

async fn snapshot(State(state): State<AppState>) -> Json<SnapshotPanel> {
    Json(snapshot_panel(&state, Utc::now()).await)
}

async fn series(
    State(state): State<AppState>,
    Query(q): Query<SelectionQuery>,
) -> Result<Json<SeriesPanel>, ApiError> {
    let sel = selection_from_query(&q, &state, Utc::now())?;
    Ok(Json(series_panel(&state, &sel).await))
}

async fn headlines(State(state): State<AppState>) -> Json<Vec<HeadlineResult>> {
    Json(headlines_panel(&state).await)
}

async fn dashboard(
    State(state): State<AppState>,
    Query(q): Query<SelectionQuery>,
) -> Result<Json<DashboardView>, ApiError> {
    let now = Utc::now();
    let sel = selection_from_query(&q, &state, now)?;
    let view = build_dashboard(&state, &sel, now).await;
    tracing::info!(
        headlines_ok = view.headlines.iter().filter(|h| h.is_success()).count(),
        headlines_total = view.headlines.len(),
        "dashboard built"
    );
    Ok(Json(view))
}
