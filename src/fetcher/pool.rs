//! Bounded concurrent batch fetching

use crate::fetcher::{CrawlError, CrawlResult, Fetcher};
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};

impl Fetcher {
    /// Fetches every URL with a fixed pool of `concurrency` workers
    ///
    /// Workers claim URLs through a shared index, so each URL is fetched by
    /// exactly one worker. Terminal failures are returned as [`CrawlError`]
    /// values; one bad URL never aborts the batch. `result[i]` always belongs
    /// to `urls[i]`.
    pub async fn fetch_batch(
        &self,
        urls: &[String],
        concurrency: usize,
    ) -> Vec<Result<CrawlResult, CrawlError>> {
        let max_retries = self.policy().max_retries;
        let worker_count = concurrency.max(1).min(urls.len());
        let next = AtomicUsize::new(0);
        let next = &next;

        tracing::info!(
            "Fetching {} URLs with {} workers",
            urls.len(),
            worker_count
        );

        let workers = (0..worker_count).map(|worker| async move {
            let mut finished = Vec::new();

            loop {
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(url) = urls.get(index) else {
                    break;
                };

                let outcome = self
                    .fetch_counting_retries(url, max_retries)
                    .await
                    .map_err(|(error, retry_count)| {
                        tracing::warn!("Worker {} failed to fetch {}: {}", worker, url, error);
                        CrawlError {
                            url: url.clone(),
                            error: error.to_string(),
                            retry_count,
                        }
                    });

                finished.push((index, outcome));
            }

            finished
        });

        let mut slots: Vec<Option<Result<CrawlResult, CrawlError>>> =
            urls.iter().map(|_| None).collect();

        for (index, outcome) in join_all(workers).await.into_iter().flatten() {
            slots[index] = Some(outcome);
        }

        slots
            .into_iter()
            .zip(urls)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| {
                    Err(CrawlError {
                        url: url.clone(),
                        error: "URL was never claimed by a worker".to_string(),
                        retry_count: 0,
                    })
                })
            })
            .collect()
    }
}
