// src/headlines/mod.rs
pub mod fetcher;
pub mod orchestrator;
pub mod sites;

use serde::{Deserialize, Serialize};

pub use fetcher::{fetch_headline, HttpPageFetcher, PageFetcher, TITLE_NOT_FOUND};
pub use orchestrator::{fetch_all, fetch_all_with_workers};
pub use sites::{load_sites_default, reference_sites};

fn default_source_language() -> String {
    "en".to_string()
}

/// A news site to scrape: where to fetch and which elements hold the top story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    pub name: String,
    pub url: String,
    pub title_selector: String,
    #[serde(default)]
    pub subtitle_selector: Option<String>,
    #[serde(default = "default_source_language", alias = "translate_from")]
    pub source_language: String,
}

impl SiteDescriptor {
    pub fn new(name: &str, url: &str, title_selector: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            title_selector: title_selector.to_string(),
            subtitle_selector: None,
            source_language: default_source_language(),
        }
    }

    pub fn with_subtitle(mut self, selector: &str) -> Self {
        self.subtitle_selector = Some(selector.to_string());
        self
    }

    pub fn with_language(mut self, lang: &str) -> Self {
        self.source_language = lang.to_string();
        self
    }
}

/// Outcome of one site fetch. Exactly one variant per site per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HeadlineResult {
    Success {
        site_name: String,
        translated_title: String,
        translated_subtitle: Option<String>,
    },
    Failure {
        site_name: String,
        error_message: String,
    },
}

impl HeadlineResult {
    pub fn site_name(&self) -> &str {
        match self {
            HeadlineResult::Success { site_name, .. }
            | HeadlineResult::Failure { site_name, .. } => site_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, HeadlineResult::Success { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            HeadlineResult::Failure { error_message, .. } => Some(error_message),
            HeadlineResult::Success { .. } => None,
        }
    }
}
