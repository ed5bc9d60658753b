// src/chart.rs
//! Dual-axis line chart description handed to the presentation layer.

use chrono::NaiveDate;
use serde::Serialize;

use crate::series::{label_for, CurrencySeries};

pub const CHART_TITLE: &str = "Taxas de Câmbio Diárias";
pub const X_AXIS_TITLE: &str = "Data";
pub const Y_AXIS_TITLE: &str = "Taxas de Câmbio";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartTrace {
    pub name: String,
    pub symbol: String,
    pub axis: Axis,
    pub x: Vec<NaiveDate>,
    pub y: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartView {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    /// Set only when a trace sits on the secondary axis.
    pub y2_title: Option<String>,
    pub traces: Vec<ChartTrace>,
}

/// One line per column. `secondary` (the high-magnitude pair) moves to the
/// right-hand axis and is drawn last.
pub fn build_chart(series: &CurrencySeries, secondary: Option<&str>) -> ChartView {
    let is_secondary = |symbol: &str| secondary.is_some_and(|s| s.eq_ignore_ascii_case(symbol));

    let (mut primary, right): (Vec<_>, Vec<_>) = series
        .columns
        .iter()
        .map(|col| ChartTrace {
            name: col.label.clone(),
            symbol: col.symbol.clone(),
            axis: if is_secondary(&col.symbol) {
                Axis::Secondary
            } else {
                Axis::Primary
            },
            x: series.dates.clone(),
            y: col.values.clone(),
        })
        .partition(|t| t.axis == Axis::Primary);

    let y2_title = if right.is_empty() {
        None
    } else {
        secondary.map(|s| label_for(s).to_string())
    };
    primary.extend(right);

    ChartView {
        title: CHART_TITLE.to_string(),
        x_title: X_AXIS_TITLE.to_string(),
        y_title: Y_AXIS_TITLE.to_string(),
        y2_title,
        traces: primary,
    }
}
