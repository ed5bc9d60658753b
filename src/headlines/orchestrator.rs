// src/headlines/orchestrator.rs
use std::sync::Arc;

use tokio::sync::Semaphore;

use super::{fetch_headline, HeadlineResult, PageFetcher, SiteDescriptor};
use crate::translate::Translator;

/// Worker count for the headline pool: one per available CPU.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Fetch every site concurrently. `result[i]` always belongs to `sites[i]`.
pub async fn fetch_all(
    sites: &[SiteDescriptor],
    pages: Arc<dyn PageFetcher>,
    translator: Arc<dyn Translator>,
    target_language: &str,
) -> Vec<HeadlineResult> {
    fetch_all_with_workers(
        sites,
        pages,
        translator,
        target_language,
        default_workers(),
    )
    .await
}

/// Same as [`fetch_all`] with an explicit pool size (at least one worker).
///
/// Waits for every site; there is no batch deadline, only the per-request
/// timeout inside each fetch.
pub async fn fetch_all_with_workers(
    sites: &[SiteDescriptor],
    pages: Arc<dyn PageFetcher>,
    translator: Arc<dyn Translator>,
    target_language: &str,
    workers: usize,
) -> Vec<HeadlineResult> {
    let permits = Arc::new(Semaphore::new(workers.max(1)));
    tracing::debug!(
        sites = sites.len(),
        workers = workers.max(1),
        "fetching headlines"
    );

    // Handles stay in submission order; awaiting them in that order keeps
    // positions stable no matter which task finishes first.
    let handles: Vec<_> = sites
        .iter()
        .cloned()
        .map(|site| {
            let pages = Arc::clone(&pages);
            let translator = Arc::clone(&translator);
            let permits = Arc::clone(&permits);
            let target = target_language.to_string();
            tokio::spawn(async move {
                // The semaphore is never closed, so acquire only fails on shutdown.
                let _permit = permits.acquire_owned().await.ok();
                fetch_headline(&site, pages.as_ref(), translator.as_ref(), &target).await
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (handle, site) in handles.into_iter().zip(sites) {
        let result = match handle.await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(site = %site.name, error = %e, "headline task aborted");
                HeadlineResult::Failure {
                    site_name: site.name.clone(),
                    error_message: format!("headline task failed: {e}"),
                }
            }
        };
        results.push(result);
    }
    results
}
