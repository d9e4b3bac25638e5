//! PostgREST-style HTTP record store.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{ChangeNotice, RecordStore, Subscription};
use crate::config::EventDirConfig;
use crate::error::{EventDirError, EventDirResult};
use crate::record::{Collection, RawRecord};

/// Cheap summary of a collection's rows, compared between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    rows: usize,
    digest: u64,
}

impl Fingerprint {
    fn of(body: &str, rows: usize) -> Self {
        let mut hasher = DefaultHasher::new();
        body.hash(&mut hasher);
        Fingerprint {
            rows,
            digest: hasher.finish(),
        }
    }
}

/// Reads collections from `{base_url}/rest/v1/{collection}`.
#[derive(Clone)]
pub struct HttpStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    poll_interval: Duration,
}

impl HttpStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        poll_interval: Duration,
    ) -> EventDirResult<Self> {
        // tokio's interval panics on a zero period
        if poll_interval.is_zero() || timeout.is_zero() {
            return Err(EventDirError::Config(
                "poll interval and request timeout must be non-zero".into(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EventDirError::Store(format!("Failed to build HTTP client: {e}")))?;

        Ok(HttpStore {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
            poll_interval,
        })
    }

    /// Build a store from the configured URL and key.
    pub fn from_config(config: &EventDirConfig) -> EventDirResult<Self> {
        let base_url = config.store_url.as_deref().ok_or_else(|| {
            EventDirError::Config(
                "store_url is not set (config file or EVENTDIR_STORE_URL)".into(),
            )
        })?;

        HttpStore::new(
            base_url,
            config.api_key.clone().unwrap_or_default(),
            Duration::from_secs(config.request_timeout_secs),
            Duration::from_secs(config.poll_interval_secs),
        )
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!(
            "{}/rest/v1/{}?select=*",
            self.base_url,
            collection.table_name()
        )
    }

    async fn get_body(&self, collection: Collection) -> EventDirResult<String> {
        let url = self.collection_url(collection);
        debug!(%url, "Fetching collection");

        let resp = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EventDirError::StoreStatus {
                collection: collection.table_name().to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|e| self.request_error(e))
    }

    fn request_error(&self, e: reqwest::Error) -> EventDirError {
        if e.is_timeout() {
            EventDirError::StoreTimeout(self.timeout.as_secs())
        } else {
            EventDirError::Store(e.to_string())
        }
    }

    async fn fingerprint(&self, collection: Collection) -> EventDirResult<Fingerprint> {
        let body = self.get_body(collection).await?;
        let rows = parse_rows(&body, collection)?;
        Ok(Fingerprint::of(&body, rows.len()))
    }
}

fn parse_rows(body: &str, collection: Collection) -> EventDirResult<Vec<RawRecord>> {
    serde_json::from_str(body).map_err(|e| {
        EventDirError::Serialization(format!("Invalid rows from '{collection}': {e}"))
    })
}

#[async_trait]
impl RecordStore for HttpStore {
    async fn fetch(&self, collection: Collection) -> EventDirResult<Vec<RawRecord>> {
        let body = self.get_body(collection).await?;
        let rows = parse_rows(&body, collection)?;
        debug!(%collection, rows = rows.len(), "Fetched collection");
        Ok(rows)
    }

    /// Poll every watched collection and announce the ones whose
    /// fingerprint moved. The first poll only records a baseline.
    async fn subscribe(&self, collections: &[Collection]) -> EventDirResult<Subscription> {
        let store = self.clone();
        let watched = collections.to_vec();
        let (sender, subscription) = Subscription::channel();

        let task = tokio::spawn(async move {
            let mut seen: HashMap<Collection, Fingerprint> = HashMap::new();
            let mut ticker = tokio::time::interval(store.poll_interval);

            loop {
                ticker.tick().await;

                for &collection in &watched {
                    let current = match store.fingerprint(collection).await {
                        Ok(fp) => fp,
                        Err(e) => {
                            warn!(%collection, "Change poll failed: {e}");
                            continue;
                        }
                    };

                    let changed = seen
                        .insert(collection, current)
                        .is_some_and(|previous| previous != current);

                    if changed {
                        debug!(%collection, "Collection changed");
                        if sender.send(ChangeNotice { collection }).await.is_err() {
                            return;
                        }
                    }
                }
            }
        });

        Ok(subscription.attach(task))
    }
}
