//! Translation collaborator: trait + Google "gtx" web endpoint client.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;

pub const DEFAULT_TRANSLATE_BASE_URL: &str = "https://translate.googleapis.com";

/// Longest input the public endpoint accepts in one request.
pub const MAX_TRANSLATE_CHARS: usize = 5000;

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

pub struct GoogleTranslator {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("building translate http client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(String::new());
        }
        if source.eq_ignore_ascii_case(target) {
            return Ok(text.to_string());
        }
        if text.chars().count() > MAX_TRANSLATE_CHARS {
            bail!(
                "text exceeds {MAX_TRANSLATE_CHARS} characters, refusing to translate"
            );
        }

        counter!("translate_requests_total").increment(1);
        let body: Value = self
            .http
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .context("translate request")?
            .error_for_status()
            .context("translate non-2xx")?
            .json()
            .await
            .context("translate response json")?;

        parse_gtx_response(&body)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

/// The gtx payload is `[[["translated", "original", ...], ...], ...]`;
/// long inputs come back split into several segments.
pub fn parse_gtx_response(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("unexpected translate response shape"))?;

    let out: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();

    if out.trim().is_empty() {
        bail!("translate response contained no text");
    }
    Ok(out)
}
