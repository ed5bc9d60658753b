// tests/metrics.rs
use anyhow::Result;
use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use cambio_dashboard::headlines::{fetch_headline, PageFetcher};
use cambio_dashboard::metrics::Metrics;
use cambio_dashboard::translate::Translator;
use cambio_dashboard::SiteDescriptor;
use tower::ServiceExt;

struct OnePage;

#[async_trait]
impl PageFetcher for OnePage {
    async fn fetch(&self, url: &str) -> Result<String> {
        if url.ends_with("/down") {
            anyhow::bail!("connection reset");
        }
        Ok("<h1>Markets rally</h1>".into())
    }
}

struct Same;

#[async_trait]
impl Translator for Same {
    async fn translate(&self, text: &str, _source: &str, _target: &str) -> Result<String> {
        Ok(text.to_string())
    }
    fn name(&self) -> &'static str {
        "same"
    }
}

// One recorder per process; this file holds the only test that installs it.
#[tokio::test]
async fn metrics_endpoint_exposes_headline_series() {
    let metrics = Metrics::init().expect("install prometheus recorder");

    let ok = SiteDescriptor::new("Up", "https://news.test/up", "h1");
    let down = SiteDescriptor::new("Down", "https://news.test/down", "h1");
    assert!(fetch_headline(&ok, &OnePage, &Same, "pt").await.is_success());
    assert!(!fetch_headline(&down, &OnePage, &Same, "pt").await.is_success());

    let resp = metrics
        .router()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        r#"headline_fetch_total{outcome="success"} 1"#,
        r#"headline_fetch_total{outcome="failure"} 1"#,
        "headline_fetch_ms",
    ] {
        assert!(text.contains(needle), "missing `{needle}` in:\n{text}");
    }
}
