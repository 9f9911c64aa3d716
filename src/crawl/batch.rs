use crate::fetch::Fetcher;
use crate::records::PageRecord;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Fetches a batch of URLs with a fixed worker ceiling.
///
/// One task per URL; each acquires a semaphore permit, fetches, and
/// reports. Every input URL yields exactly one record: failures come
/// back as error records, and even a panicked task is converted rather
/// than propagated.
pub async fn fetch_many(
    fetcher: Arc<dyn Fetcher>,
    urls: Vec<String>,
    depth: u32,
    max_concurrent: usize,
) -> Vec<PageRecord> {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut handles = Vec::with_capacity(urls.len());

    for url in urls {
        let semaphore = Arc::clone(&semaphore);
        let fetcher = Arc::clone(&fetcher);

        handles.push((
            url.clone(),
            tokio::spawn(async move {
                // Closed only if the semaphore is dropped, which it never is
                let _permit = semaphore
                    .acquire()
                    .await
                    .expect("batch semaphore closed unexpectedly");
                ::log::debug!("Fetching (depth {}): {}", depth, url);
                fetcher.fetch(&url, depth).await
            }),
        ));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (url, handle) in handles {
        match handle.await {
            Ok(record) => results.push(record),
            Err(e) => {
                ::log::error!("Fetch task for {} died: {}", url, e);
                results.push(PageRecord::failed(url, depth, "unknown".to_string(), 0));
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records its peak concurrency and fails URLs containing "bad".
    struct ProbeFetcher {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ProbeFetcher {
        fn new() -> Self {
            Self {
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Fetcher for ProbeFetcher {
        async fn fetch(&self, url: &str, depth: u32) -> PageRecord {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.current.fetch_sub(1, Ordering::SeqCst);

            if url.contains("bad") {
                PageRecord::failed(url.to_string(), depth, "network".to_string(), 1)
            } else {
                PageRecord::fetched(
                    url.to_string(),
                    "t".into(),
                    "some content".into(),
                    vec![],
                    depth,
                    1,
                    1,
                )
            }
        }
    }

    #[tokio::test]
    async fn test_every_url_yields_a_record() {
        let fetcher = Arc::new(ProbeFetcher::new());
        let urls: Vec<String> = (0..7).map(|i| format!("https://a.com/{}", i)).collect();
        let results = fetch_many(fetcher, urls.clone(), 1, 3).await;
        assert_eq!(results.len(), urls.len());
    }

    #[tokio::test]
    async fn test_one_failure_leaves_others_untouched() {
        let fetcher = Arc::new(ProbeFetcher::new());
        let urls = vec![
            "https://a.com/1".to_string(),
            "https://a.com/bad".to_string(),
            "https://a.com/2".to_string(),
        ];
        let results = fetch_many(fetcher, urls, 1, 2).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.error.is_some()).count(), 1);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 2);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let fetcher = Arc::new(ProbeFetcher::new());
        let urls: Vec<String> = (0..10).map(|i| format!("https://a.com/{}", i)).collect();
        let _ = fetch_many(Arc::clone(&fetcher) as Arc<dyn Fetcher>, urls, 1, 2).await;
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_depth_is_stamped_on_records() {
        let fetcher = Arc::new(ProbeFetcher::new());
        let urls = vec!["https://a.com/x".to_string()];
        let results = fetch_many(fetcher, urls, 3, 1).await;
        assert_eq!(results[0].depth, 3);
    }
}
