// src/config.rs
use anyhow::{anyhow, Context, Result};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::market::yahoo::DEFAULT_YAHOO_BASE_URL;
use crate::translate::DEFAULT_TRANSLATE_BASE_URL;

// --- env names & defaults ---
pub const ENV_DASHBOARD_CONFIG_PATH: &str = "DASHBOARD_CONFIG_PATH";
pub const ENV_TARGET_LANG: &str = "DASHBOARD_TARGET_LANG";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "DASHBOARD_FETCH_TIMEOUT_SECS";
pub const DEFAULT_DASHBOARD_CONFIG_PATH: &str = "config/dashboard.toml";

pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

fn default_target_language() -> String {
    "pt".to_string()
}
fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    DESKTOP_USER_AGENT.to_string()
}
fn default_snapshot_symbol() -> String {
    "USDBRL=X".to_string()
}
fn default_snapshot_lookback_days() -> u32 {
    5
}
fn default_utc_offset_hours() -> i32 {
    -3
}
fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()
}
fn default_secondary_axis_symbol() -> Option<String> {
    Some("USDARS=X".to_string())
}
fn default_yahoo_base_url() -> String {
    DEFAULT_YAHOO_BASE_URL.to_string()
}
fn default_translate_base_url() -> String {
    DEFAULT_TRANSLATE_BASE_URL.to_string()
}

/// Operator configuration. Every field has a default, so a missing or partial
/// `dashboard.toml` is fine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    /// Language headlines are translated into.
    #[serde(default = "default_target_language")]
    pub target_language: String,
    /// Per-request timeout for headline page fetches.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_snapshot_symbol")]
    pub snapshot_symbol: String,
    #[serde(default = "default_snapshot_lookback_days")]
    pub snapshot_lookback_days: u32,
    /// Offset of the dashboard zone (America/Sao_Paulo, no DST since 2019).
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
    #[serde(default = "default_start_date")]
    pub default_start: NaiveDate,
    /// High-magnitude currency drawn on the secondary chart axis.
    #[serde(default = "default_secondary_axis_symbol")]
    pub secondary_axis_symbol: Option<String>,
    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,
    #[serde(default = "default_translate_base_url")]
    pub translate_base_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            target_language: default_target_language(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
            snapshot_symbol: default_snapshot_symbol(),
            snapshot_lookback_days: default_snapshot_lookback_days(),
            utc_offset_hours: default_utc_offset_hours(),
            default_start: default_start_date(),
            secondary_axis_symbol: default_secondary_axis_symbol(),
            yahoo_base_url: default_yahoo_base_url(),
            translate_base_url: default_translate_base_url(),
        }
    }
}

impl DashboardConfig {
    /// Load from an explicit TOML file, then apply env overrides.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading dashboard config from {}", path.display()))?;
        let cfg: DashboardConfig = toml::from_str(&data)
            .with_context(|| format!("parsing dashboard config {}", path.display()))?;
        Ok(cfg.with_env_overrides().sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $DASHBOARD_CONFIG_PATH (must exist)
    /// 2) config/dashboard.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_DASHBOARD_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_DASHBOARD_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            return Self::load_from_file(&pb);
        }
        let fallback = PathBuf::from(DEFAULT_DASHBOARD_CONFIG_PATH);
        if fallback.exists() {
            return Self::load_from_file(&fallback);
        }
        Ok(Self::default().with_env_overrides().sanitized())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(lang) = std::env::var(ENV_TARGET_LANG)
            .ok()
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
        {
            self.target_language = lang;
        }
        if let Some(secs) = std::env::var(ENV_FETCH_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            self.fetch_timeout_secs = secs;
        }
        self
    }

    fn sanitized(mut self) -> Self {
        if self.fetch_timeout_secs == 0 {
            self.fetch_timeout_secs = default_fetch_timeout_secs();
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            self.utc_offset_hours = default_utc_offset_hours();
        }
        if self.target_language.trim().is_empty() {
            self.target_language = default_target_language();
        }
        self.secondary_axis_symbol = self
            .secondary_axis_symbol
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    /// Fixed offset of the dashboard zone (UTC-03:00 for America/Sao_Paulo).
    pub fn zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }

    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: DashboardConfig = toml::from_str(r#"target_language = "es""#).unwrap();
        assert_eq!(cfg.target_language, "es");
        assert_eq!(cfg.fetch_timeout_secs, 10);
        assert_eq!(cfg.snapshot_symbol, "USDBRL=X");
        assert_eq!(
            cfg.default_start,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
    }

    #[test]
    fn sanitize_fixes_out_of_range_values() {
        let cfg = DashboardConfig {
            fetch_timeout_secs: 0,
            utc_offset_hours: 40,
            secondary_axis_symbol: Some("  ".into()),
            ..DashboardConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.fetch_timeout_secs, 10);
        assert_eq!(cfg.utc_offset_hours, -3);
        assert_eq!(cfg.secondary_axis_symbol, None);
    }

    #[test]
    fn zone_is_sao_paulo_offset() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.zone().local_minus_utc(), -3 * 3600);
    }

    #[test]
    fn zone_follows_utc_offset_hours() {
        let cfg: DashboardConfig = toml::from_str("utc_offset_hours = -4").unwrap();
        assert_eq!(cfg.zone().local_minus_utc(), -4 * 3600);
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Run from an empty temp dir so the repo's config/ does not interfere
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_DASHBOARD_CONFIG_PATH);
        env::remove_var(ENV_TARGET_LANG);
        env::remove_var(ENV_FETCH_TIMEOUT_SECS);

        let cfg = DashboardConfig::load_default().unwrap();
        assert_eq!(cfg, DashboardConfig::default());

        let p = tmp.path().join("custom.toml");
        fs::write(&p, "fetch_timeout_secs = 3\n").unwrap();
        env::set_var(ENV_DASHBOARD_CONFIG_PATH, p.display().to_string());
        env::set_var(ENV_TARGET_LANG, "EN");
        let cfg = DashboardConfig::load_default().unwrap();
        assert_eq!(cfg.fetch_timeout_secs, 3);
        assert_eq!(cfg.target_language, "en");

        env::set_var(ENV_DASHBOARD_CONFIG_PATH, tmp.path().join("missing.toml"));
        assert!(DashboardConfig::load_default().is_err());

        env::remove_var(ENV_DASHBOARD_CONFIG_PATH);
        env::remove_var(ENV_TARGET_LANG);
        env::set_current_dir(&old).unwrap();
    }
}
