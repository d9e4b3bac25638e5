use std::sync::Arc;

use chrono::{DateTime, Utc};
use eventdir_core::store::load_records;
use eventdir_core::{Collection, Directory, EventRecord, GridOptions, RecordStore};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    directory: Arc<RwLock<Directory>>,
    store: Arc<dyn RecordStore>,
    pub options: GridOptions,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub records: usize,
    pub last_error: Option<String>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl AppState {
    /// Load the directory once, then keep it fresh from the change feed.
    ///
    /// A failed first load is not fatal: the server starts empty and
    /// reports the error on `/health` until a later refresh succeeds.
    pub async fn start(store: Arc<dyn RecordStore>, options: GridOptions) -> anyhow::Result<Self> {
        let state = AppState {
            directory: Arc::new(RwLock::new(Directory::default())),
            store,
            options,
        };

        if let Ok(count) = state.refresh().await {
            info!(count, "Loaded directory");
        }

        let subscription = state.store.subscribe(&Collection::ALL).await?;
        let watcher = state.clone();
        tokio::spawn(async move {
            let mut subscription = subscription;
            while let Some(notice) = subscription.next().await {
                subscription.coalesce();
                info!(collection = %notice.collection, "Change received, refreshing");
                if let Err(e) = watcher.refresh().await {
                    debug!("Refresh after change failed, keeping previous records: {e}");
                }
            }
            warn!("Change feed closed, directory will no longer refresh");
        });

        Ok(state)
    }

    /// Fetch outside the lock, then swap the list in.
    pub async fn refresh(&self) -> eventdir_core::EventDirResult<usize> {
        let result = load_records(self.store.as_ref(), &Collection::ALL).await;
        self.directory.write().await.apply(result)
    }

    pub async fn records(&self) -> Vec<EventRecord> {
        self.directory.read().await.records().to_vec()
    }

    pub async fn find(&self, id: &str) -> Option<EventRecord> {
        self.directory.read().await.find(id).cloned()
    }

    pub async fn health(&self) -> Health {
        let directory = self.directory.read().await;
        let last_error = directory.last_error().map(str::to_string);

        Health {
            status: if last_error.is_some() { "degraded" } else { "ok" },
            records: directory.records().len(),
            last_error,
            refreshed_at: directory.refreshed_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventdir_core::{MemoryStore, RawRecord};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn row(id: i64, name: &str) -> RawRecord {
        RawRecord::from([("id", json!(id)), ("name", json!(name))])
    }

    #[tokio::test]
    async fn test_failed_refresh_after_change_keeps_records() {
        let store = MemoryStore::new().with_rows(Collection::Events, vec![row(1, "Rust Meetup")]);
        let state = AppState::start(Arc::new(store.clone()), GridOptions::default())
            .await
            .unwrap();
        assert_eq!(state.health().await.status, "ok");

        store.set_failing(true);
        store.insert(Collection::Events, row(2, "Talk"));

        timeout(Duration::from_secs(1), async {
            while state.health().await.last_error.is_none() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("watcher should refresh after the change");

        assert_eq!(state.health().await.status, "degraded");
        assert_eq!(state.records().await.len(), 1);
    }
}
