use crate::config::{ApiToken, ClientConfig};
use crate::types::{Block, FetchFailure, Fetched, Page};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Read access to a hierarchical document store.
///
/// Both operations degrade to partial results instead of failing; see
/// [`Fetched`]. Implemented over HTTP by [`NotionClient`] and by in-memory
/// fakes in tests.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// List the direct children of `block_id`, following pagination to the end.
    async fn list_children(&self, block_id: &str) -> Fetched<Block>;

    /// Search page-like objects, most recently edited first.
    async fn search(&self, query: &str) -> Fetched<Page>;
}

/// HTTP client for the Notion API with a concurrency gate and retry policy.
///
/// Every public operation holds one permit of a shared semaphore for its whole
/// duration, so the number of in-flight logical operations never exceeds
/// [`ClientConfig::max_concurrency`] however wide the caller fans out.
#[derive(Clone)]
pub struct NotionClient {
    client: Client,
    config: ClientConfig,
    gate: Arc<Semaphore>,
    requests: Arc<AtomicU64>,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

/// What a request is fetching; decides how a 403 is reported.
#[derive(Clone, Copy)]
enum Target<'a> {
    Children(&'a str),
    Search,
}

impl Target<'_> {
    fn access_denied(self) -> FetchFailure {
        match self {
            Self::Children(block_id) => FetchFailure::AccessDenied {
                block_id: block_id.to_string(),
            },
            Self::Search => FetchFailure::SearchDenied,
        }
    }
}

impl fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Children(block_id) => write!(f, "children of {block_id}"),
            Self::Search => f.write_str("search"),
        }
    }
}

enum Attempt<T> {
    Done(T),
    RateLimited,
    Forbidden,
    Failed(Error),
}

impl NotionClient {
    /// Creates a client with authentication headers and the configured timeout.
    pub fn new(token: &ApiToken, config: ClientConfig) -> Result<Self> {
        let config = config.normalized();

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|_| Error::Config("API token contains invalid header characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            "notion-version",
            HeaderValue::from_str(&config.api_version)
                .map_err(|_| Error::Config(format!("Invalid API version '{}'", config.api_version)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .user_agent(concat!("nview/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            client,
            gate: Arc::new(Semaphore::new(config.max_concurrency)),
            config,
            requests: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Settings in effect after normalization.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Physical HTTP requests issued so far, retries included.
    pub fn requests_sent(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Send a request built by `build`, retrying per the configured policy.
    ///
    /// A 403 ends the operation at once. A 429 backs off by
    /// [`ClientConfig::rate_limit_delay`]. Every other failure (transport,
    /// timeout, any non-success status, malformed body) is retried after
    /// [`ClientConfig::transient_delay`] until `max_attempts` is spent.
    async fn send_with_retry<T, F>(
        &self,
        target: Target<'_>,
        build: F,
    ) -> std::result::Result<T, FetchFailure>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            self.requests.fetch_add(1, Ordering::Relaxed);
            let last = attempt == max_attempts;

            match Self::send_once(build()).await {
                Attempt::Done(value) => return Ok(value),
                Attempt::Forbidden => {
                    match target {
                        Target::Children(block_id) => error!(
                            "Permission denied for block {block_id}. Ensure the page is shared with your integration."
                        ),
                        Target::Search => error!(
                            "Permission denied for search. Ensure the integration has read content capabilities."
                        ),
                    }
                    return Err(target.access_denied());
                },
                Attempt::RateLimited if last => {
                    error!("Rate limit exceeded after {attempt} attempts for {target}");
                    return Err(FetchFailure::RateLimited { attempts: attempt });
                },
                Attempt::RateLimited => {
                    let delay = self.config.rate_limit_delay(attempt);
                    warn!(
                        "Rate limited on {target} (attempt {attempt}/{max_attempts}), retrying in {delay:?}"
                    );
                    sleep(delay).await;
                },
                Attempt::Failed(err) if last => {
                    error!("Error fetching {target}: {err}");
                    return Err(FetchFailure::Transient {
                        attempts: attempt,
                        message: err.to_string(),
                    });
                },
                Attempt::Failed(err) => {
                    let delay = self.config.transient_delay();
                    warn!(
                        "Request for {target} failed (attempt {attempt}/{max_attempts}): {err}; retrying in {delay:?}"
                    );
                    sleep(delay).await;
                },
            }
        }

        // max_attempts is at least 1, so the loop always returns.
        Err(FetchFailure::Transient {
            attempts: max_attempts,
            message: "no attempts made".to_string(),
        })
    }

    async fn send_once<T: DeserializeOwned>(request: RequestBuilder) -> Attempt<T> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return Attempt::Failed(Error::Network(err)),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Attempt::RateLimited;
        }
        if status == StatusCode::FORBIDDEN {
            return Attempt::Forbidden;
        }
        if !status.is_success() {
            return Attempt::Failed(Error::Http {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => return Attempt::Failed(Error::Network(err)),
        };
        match serde_json::from_slice(&body) {
            Ok(value) => Attempt::Done(value),
            Err(err) => Attempt::Failed(err.into()),
        }
    }
}

#[async_trait]
impl BlockSource for NotionClient {
    async fn list_children(&self, block_id: &str) -> Fetched<Block> {
        // The semaphore is never closed, so acquisition only fails at shutdown.
        let _permit = self.gate.acquire().await.ok();

        let url = format!("{}/blocks/{block_id}/children", self.config.base_url);
        let page_size = self.config.page_size.to_string();
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let listing: ListResponse = match self
                .send_with_retry(Target::Children(block_id), || {
                    let mut request = self
                        .client
                        .get(&url)
                        .query(&[("page_size", page_size.as_str())]);
                    if let Some(cursor) = &cursor {
                        request = request.query(&[("start_cursor", cursor.as_str())]);
                    }
                    request
                })
                .await
            {
                Ok(listing) => listing,
                Err(failure) => return Fetched::truncated(blocks, failure),
            };

            debug!(
                "Fetched {} children of {block_id} (has_more: {})",
                listing.results.len(),
                listing.has_more
            );
            blocks.extend(listing.results.into_iter().filter_map(|raw| {
                serde_json::from_value::<Block>(raw)
                    .map_err(|e| warn!("Skipping malformed block under {block_id}: {e}"))
                    .ok()
            }));

            match (listing.has_more, listing.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => return Fetched::complete(blocks),
            }
        }
    }

    async fn search(&self, query: &str) -> Fetched<Page> {
        let _permit = self.gate.acquire().await.ok();

        let url = format!("{}/search", self.config.base_url);
        let payload = json!({
            "query": query,
            "filter": {"value": "page", "property": "object"},
            "sort": {"direction": "descending", "timestamp": "last_edited_time"},
        });

        match self
            .send_with_retry::<ListResponse, _>(Target::Search, || {
                self.client.post(&url).json(&payload)
            })
            .await
        {
            Ok(listing) => Fetched::complete(
                listing
                    .results
                    .into_iter()
                    .filter_map(|raw| {
                        serde_json::from_value::<Page>(raw)
                            .map_err(|e| warn!("Skipping malformed search result: {e}"))
                            .ok()
                    })
                    .collect(),
            ),
            Err(failure) => Fetched::truncated(Vec::new(), failure),
        }
    }
}
