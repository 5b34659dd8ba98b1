use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::{
    sync::Semaphore,
    task::{Id, JoinSet},
    time::timeout,
};
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use crate::analysis::url::has_scheme;
use crate::config::FetchConfig;
use crate::content::{ContentMap, PageContent};
use crate::extractor::extract_page;
use crate::fetcher::{FetchError, HttpFetcher};

/// Anything that can turn a URL into its on-page fields.
#[async_trait]
pub trait ContentSource: Send + Sync + 'static {
    async fn fetch_page(&self, url: &str) -> Result<PageContent, FetchError>;
}

/// Live source: HTTP GET plus static HTML extraction.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    fetcher: HttpFetcher,
}

impl HttpContentSource {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: HttpFetcher::new(config)?,
        })
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch_page(&self, url: &str) -> Result<PageContent, FetchError> {
        let response = self.fetcher.fetch(url).await?;
        debug!(
            fetched_at = %response.fetched_at,
            "fetched {} (status: {}, {}, encoding: {}, {} bytes)",
            response.url_final,
            response.status,
            response.content_type,
            response.encoding,
            response.body.len()
        );
        Ok(extract_page(url, &response.body))
    }
}

/// Address actually requested for a normalized key; scheme-less keys from
/// protocol-agnostic runs are fetched over https.
pub fn fetch_target(key: &str) -> String {
    if has_scheme(key) {
        key.to_string()
    } else {
        format!("https://{key}")
    }
}

/// Fetches every key with at most `config.concurrency` requests in flight.
///
/// Each URL gets its own deadline and fails on its own; a failure is recorded
/// in the map and never aborts the siblings. Results are keyed by the
/// normalized key, not the fetched address.
#[instrument(skip_all, fields(urls = keys.len(), concurrency = config.concurrency))]
pub async fn collect_content<S, K>(source: Arc<S>, keys: &[K], config: &FetchConfig) -> ContentMap
where
    S: ContentSource + ?Sized,
    K: AsRef<str>,
{
    let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let deadline = config.timeout;
    let total = keys.len();
    let mut tasks = JoinSet::new();
    // Lets a panicked or cancelled task still be reported against its URL.
    let mut task_keys: HashMap<Id, String> = HashMap::with_capacity(total);

    for key in keys {
        let key = key.as_ref().to_string();
        let task_key = key.clone();
        let source = source.clone();
        let semaphore = semaphore.clone();
        let span = info_span!("fetch_page", url = %key);
        let handle = tasks.spawn(
            async move {
                let _permit = semaphore.acquire_owned().await;
                let target = fetch_target(&key);
                let result = match timeout(deadline, source.fetch_page(&target)).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Deadline(deadline)),
                };
                (key, result)
            }
            .instrument(span),
        );
        task_keys.insert(handle.id(), task_key);
    }

    let mut content = ContentMap::new();
    let mut done = 0usize;
    while let Some(joined) = tasks.join_next_with_id().await {
        done += 1;
        match joined {
            Ok((_, (key, Ok(page)))) => {
                debug!("[{done}/{total}] extracted {key}");
                content.insert(key, page);
            }
            Ok((_, (key, Err(err)))) => {
                warn!(
                    transient = err.is_transient(),
                    "[{done}/{total}] failed to fetch {key}: {err}"
                );
                content.record_failure(key, err.to_string());
            }
            Err(join_err) => {
                let reason = if join_err.is_panic() {
                    "fetch task panicked"
                } else {
                    "fetch task cancelled"
                };
                match task_keys.remove(&join_err.id()) {
                    Some(key) => {
                        warn!("[{done}/{total}] {reason} for {key}");
                        content.record_failure(key, reason);
                    }
                    None => warn!("[{done}/{total}] {reason}: {join_err}"),
                }
            }
        }
    }

    info!(
        "Collected content for {} of {} URLs ({} failed)",
        content.len(),
        total,
        content.failure_count()
    );
    content
}
