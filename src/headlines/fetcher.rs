// src/headlines/fetcher.rs
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use scraper::{Html, Selector};

use super::{HeadlineResult, SiteDescriptor};
use crate::translate::Translator;

/// Shown instead of a title when the selector matches nothing.
pub const TITLE_NOT_FOUND: &str = "Título não encontrado";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// HTML fetch collaborator: GET a page and return its body.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpPageFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPageFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(timeout)
            .build()
            .context("building page http client")?;
        Ok(Self { client, timeout })
    }

    fn describe(&self, e: reqwest::Error, url: &str) -> anyhow::Error {
        if e.is_timeout() {
            anyhow!("request to {url} timed out after {:?}", self.timeout)
        } else {
            anyhow::Error::new(e).context(format!("GET {url}"))
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.describe(e, url))?;
        let resp = resp.error_for_status().map_err(|e| self.describe(e, url))?;
        resp.text().await.map_err(|e| self.describe(e, url))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: Option<String>,
    pub subtitle: Option<String>,
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| anyhow!("invalid selector {s:?}: {e:?}"))
}

static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

fn collapse_ws(s: &str) -> String {
    RE_WS.replace_all(s, " ").trim().to_string()
}

fn first_text(doc: &Html, selector: &Selector) -> Option<String> {
    let el = doc.select(selector).next()?;
    let text = collapse_ws(&el.text().collect::<String>());
    (!text.is_empty()).then_some(text)
}

/// Pull the first title / subtitle match out of a page.
///
/// Selectors are validated before the document is searched, so a bad
/// subtitle selector is an error even when the title is missing.
pub fn extract_headline(
    html: &str,
    title_selector: &str,
    subtitle_selector: Option<&str>,
) -> Result<Extracted> {
    let title_sel = parse_selector(title_selector)?;
    let subtitle_sel = subtitle_selector.map(parse_selector).transpose()?;

    let doc = Html::parse_document(html);
    Ok(Extracted {
        title: first_text(&doc, &title_sel),
        subtitle: subtitle_sel.and_then(|sel| first_text(&doc, &sel)),
    })
}

async fn try_fetch_headline(
    site: &SiteDescriptor,
    pages: &dyn PageFetcher,
    translator: &dyn Translator,
    target_language: &str,
) -> Result<(String, Option<String>)> {
    let body = pages.fetch(&site.url).await?;
    // `Html` is not Send; keep it inside this synchronous call.
    let extracted = extract_headline(
        &body,
        &site.title_selector,
        site.subtitle_selector.as_deref(),
    )?;

    let title = match extracted.title {
        Some(t) => translator
            .translate(&t, &site.source_language, target_language)
            .await
            .context("translating title")?,
        None => {
            tracing::debug!(
                site = %site.name,
                selector = %site.title_selector,
                "title selector matched nothing"
            );
            TITLE_NOT_FOUND.to_string()
        }
    };

    let subtitle = match extracted.subtitle {
        Some(s) => Some(
            translator
                .translate(&s, &site.source_language, target_language)
                .await
                .context("translating subtitle")?,
        ),
        None => None,
    };

    Ok((title, subtitle))
}

/// Fetch, extract and translate one site. Any error becomes `Failure` for this
/// site only.
pub async fn fetch_headline(
    site: &SiteDescriptor,
    pages: &dyn PageFetcher,
    translator: &dyn Translator,
    target_language: &str,
) -> HeadlineResult {
    let t0 = Instant::now();
    let outcome = try_fetch_headline(site, pages, translator, target_language).await;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("headline_fetch_ms").record(elapsed_ms);

    match outcome {
        Ok((translated_title, translated_subtitle)) => {
            counter!("headline_fetch_total", "outcome" => "success").increment(1);
            tracing::info!(site = %site.name, "headline fetched");
            HeadlineResult::Success {
                site_name: site.name.clone(),
                translated_title,
                translated_subtitle,
            }
        }
        Err(e) => {
            let error_message = format!("{e:#}");
            counter!("headline_fetch_total", "outcome" => "failure").increment(1);
            tracing::warn!(site = %site.name, error = %error_message, "headline fetch failed");
            HeadlineResult::Failure {
                site_name: site.name.clone(),
                error_message,
            }
        }
    }
}
