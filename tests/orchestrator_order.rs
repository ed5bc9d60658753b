// tests/orchestrator_order.rs
//
// Parallel headline fetching: positional order, failure isolation, and the
// real HTTP timeout path against a local axum server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::{response::Html, routing::get, Router};
use cambio_dashboard::headlines::{fetch_all, fetch_all_with_workers, HttpPageFetcher, PageFetcher};
use cambio_dashboard::translate::Translator;
use cambio_dashboard::{HeadlineResult, SiteDescriptor};

struct EchoTranslator;

#[async_trait]
impl Translator for EchoTranslator {
    async fn translate(&self, text: &str, _source: &str, target: &str) -> Result<String> {
        Ok(format!("{target}:{text}"))
    }
    fn name(&self) -> &'static str {
        "echo"
    }
}

/// URL scheme `mem://<delay_ms>/<title>`; `mem://fail/...` errors, `mem://panic/...` panics.
struct DelayedPages;

#[async_trait]
impl PageFetcher for DelayedPages {
    async fn fetch(&self, url: &str) -> Result<String> {
        let rest = url.trim_start_matches("mem://");
        let (head, title) = rest.split_once('/').unwrap_or((rest, ""));
        match head {
            "fail" => bail!("simulated outage for {title}"),
            "panic" => panic!("scraper blew up on {title}"),
            ms => {
                let ms: u64 = ms.parse().unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(format!("<h1>{title}</h1>"))
            }
        }
    }
}

fn site(name: &str, url: &str) -> SiteDescriptor {
    SiteDescriptor::new(name, url, "h1")
}

fn names(results: &[HeadlineResult]) -> Vec<&str> {
    results.iter().map(|r| r.site_name()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn results_follow_submission_order_not_completion_order() {
    // Earlier sites finish later.
    let sites: Vec<_> = (0..6)
        .map(|i| site(&format!("s{i}"), &format!("mem://{}/t{i}", 300 - i * 50)))
        .collect();

    let out = fetch_all_with_workers(
        &sites,
        Arc::new(DelayedPages),
        Arc::new(EchoTranslator),
        "pt",
        6,
    )
    .await;

    assert_eq!(names(&out), vec!["s0", "s1", "s2", "s3", "s4", "s5"]);
    for (i, r) in out.iter().enumerate() {
        assert_eq!(
            r,
            &HeadlineResult::Success {
                site_name: format!("s{i}"),
                translated_title: format!("pt:t{i}"),
                translated_subtitle: None,
            }
        );
    }
}

#[tokio::test]
async fn injected_failure_only_affects_its_own_position() {
    let mut sites: Vec<_> = (0..6)
        .map(|i| site(&format!("s{i}"), &format!("mem://5/t{i}")))
        .collect();
    let baseline = fetch_all(
        &sites,
        Arc::new(DelayedPages),
        Arc::new(EchoTranslator),
        "pt",
    )
    .await;

    sites[3].url = "mem://fail/t3".into();
    let out = fetch_all(
        &sites,
        Arc::new(DelayedPages),
        Arc::new(EchoTranslator),
        "pt",
    )
    .await;

    assert_eq!(out.len(), 6);
    assert!(out[3].error_message().unwrap().contains("simulated outage"));
    for i in [0, 1, 2, 4, 5] {
        assert_eq!(out[i], baseline[i]);
    }
}

#[tokio::test]
async fn panicking_task_is_reported_as_failure_for_that_site() {
    let sites = vec![
        site("ok-1", "mem://1/a"),
        site("boom", "mem://panic/b"),
        site("ok-2", "mem://1/c"),
    ];
    let out = fetch_all(
        &sites,
        Arc::new(DelayedPages),
        Arc::new(EchoTranslator),
        "pt",
    )
    .await;

    assert_eq!(names(&out), vec!["ok-1", "boom", "ok-2"]);
    assert!(out[0].is_success());
    assert!(out[1].error_message().unwrap().contains("headline task failed"));
    assert!(out[2].is_success());
}

#[tokio::test]
async fn single_worker_still_completes_every_site_in_order() {
    let sites: Vec<_> = (0..4)
        .map(|i| site(&format!("s{i}"), &format!("mem://{}/t{i}", 20 - i * 5)))
        .collect();
    let out = fetch_all_with_workers(
        &sites,
        Arc::new(DelayedPages),
        Arc::new(EchoTranslator),
        "pt",
        1,
    )
    .await;
    assert_eq!(names(&out), vec!["s0", "s1", "s2", "s3"]);
    assert!(out.iter().all(HeadlineResult::is_success));
}

#[tokio::test]
async fn empty_site_list_yields_empty_results() {
    let out = fetch_all(&[], Arc::new(DelayedPages), Arc::new(EchoTranslator), "pt").await;
    assert!(out.is_empty());
}

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn six_sites_two_timeouts_over_real_http() {
    async fn slow() -> Html<&'static str> {
        tokio::time::sleep(Duration::from_secs(3)).await;
        Html("<h1>too late</h1>")
    }
    let app = Router::new()
        .route("/a", get(|| async { Html("<h1>Alpha</h1>") }))
        .route("/b", get(|| async { Html("<h1>Bravo</h1>") }))
        .route("/c", get(|| async { Html("<h1>Charlie</h1>") }))
        .route("/d", get(|| async { Html("<h1>Delta</h1>") }))
        .route("/slow", get(slow));
    let base = spawn_server(app).await;

    let sites = vec![
        site("A", &format!("{base}/a")),
        site("Slow-1", &format!("{base}/slow")),
        site("B", &format!("{base}/b")),
        site("C", &format!("{base}/c")),
        site("Slow-2", &format!("{base}/slow")),
        site("D", &format!("{base}/d")),
    ];
    let pages = HttpPageFetcher::new("test-agent", Duration::from_millis(300)).unwrap();

    let out = fetch_all(&sites, Arc::new(pages), Arc::new(EchoTranslator), "pt").await;

    assert_eq!(out.len(), 6);
    assert_eq!(names(&out), vec!["A", "Slow-1", "B", "C", "Slow-2", "D"]);
    let failures: Vec<usize> = out
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.is_success())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(failures, vec![1, 4]);
    for i in failures {
        let msg = out[i].error_message().unwrap();
        assert!(msg.contains("timed out"), "unexpected message: {msg}");
    }
    assert_eq!(
        out[0],
        HeadlineResult::Success {
            site_name: "A".into(),
            translated_title: "pt:Alpha".into(),
            translated_subtitle: None,
        }
    );
}

#[tokio::test]
async fn non_2xx_status_is_a_failure() {
    let app = Router::new().route(
        "/gone",
        get(|| async { (axum::http::StatusCode::NOT_FOUND, "nope") }),
    );
    let base = spawn_server(app).await;
    let sites = vec![site("Gone", &format!("{base}/gone"))];
    let pages = HttpPageFetcher::new("test-agent", Duration::from_secs(2)).unwrap();

    let out = fetch_all(&sites, Arc::new(pages), Arc::new(EchoTranslator), "pt").await;

    let msg = out[0].error_message().expect("failure expected");
    assert!(msg.contains("404"), "{msg}");
}
