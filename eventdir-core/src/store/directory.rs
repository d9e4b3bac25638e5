//! The in-memory directory and its fetch-and-replace lifecycle.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::RecordStore;
use crate::error::EventDirResult;
use crate::normalize::{merge, normalize_all};
use crate::record::{Collection, EventRecord};

/// Fetch every collection, normalize and merge. Fails if any fetch fails.
pub async fn load_records(
    store: &dyn RecordStore,
    collections: &[Collection],
) -> EventDirResult<Vec<EventRecord>> {
    let mut normalized = Vec::with_capacity(collections.len());

    for &collection in collections {
        let rows = store.fetch(collection).await?;
        normalized.push(normalize_all(&rows, collection));
    }

    Ok(merge(normalized))
}

/// The last good record list, plus the outcome of the latest refresh.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    records: Vec<EventRecord>,
    last_error: Option<String>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Directory {
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn find(&self, id: &str) -> Option<&EventRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Message of the most recent failed refresh, cleared by a success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Replace the list on success. On failure the previous list stays.
    ///
    /// Split from [`Directory::refresh`] so a shared directory can be
    /// locked only for the swap, not for the fetch.
    pub fn apply(&mut self, result: EventDirResult<Vec<EventRecord>>) -> EventDirResult<usize> {
        match result {
            Ok(records) => {
                debug!(count = records.len(), "Directory refreshed");
                self.records = records;
                self.last_error = None;
                self.refreshed_at = Some(Utc::now());
                Ok(self.records.len())
            }
            Err(e) => {
                warn!("Refresh failed, keeping {} records: {e}", self.records.len());
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn refresh(
        &mut self,
        store: &dyn RecordStore,
        collections: &[Collection],
    ) -> EventDirResult<usize> {
        let result = load_records(store, collections).await;
        self.apply(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventDirError;
    use crate::record::{EventKind, RawRecord};
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn row(id: i64, name: &str) -> RawRecord {
        RawRecord::from([
            ("id", json!(id)),
            ("name", json!(name)),
            ("date", json!("2025-12-01")),
        ])
    }

    fn seeded() -> MemoryStore {
        MemoryStore::new()
            .with_rows(Collection::Events, vec![row(1, "Meetup")])
            .with_rows(Collection::Hackathons, vec![row(1, "HackUK")])
    }

    #[tokio::test]
    async fn test_load_records_prefixes_and_merges() {
        let store = seeded();

        let records = load_records(&store, &Collection::ALL).await.unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "hackathon-1"]);
        assert_eq!(records[1].kind, EventKind::Hackathon);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_list() {
        let store = seeded();
        let mut directory = Directory::default();

        assert_eq!(directory.refresh(&store, &Collection::ALL).await.unwrap(), 2);
        assert!(directory.last_error().is_none());

        store.set_failing(true);
        let result = directory.refresh(&store, &Collection::ALL).await;

        assert!(matches!(result, Err(EventDirError::Store(_))));
        assert_eq!(directory.records().len(), 2);
        assert!(directory.last_error().is_some());

        store.set_failing(false);
        directory.refresh(&store, &Collection::ALL).await.unwrap();
        assert!(directory.last_error().is_none());
    }

    #[tokio::test]
    async fn test_change_notice_drives_full_refetch() {
        let store = seeded();
        let mut directory = Directory::default();
        directory.refresh(&store, &Collection::ALL).await.unwrap();

        let mut sub = store.subscribe(&Collection::ALL).await.unwrap();
        store.insert(Collection::Scholarships, row(9, "Women in Tech Award"));

        let notice = timeout(Duration::from_secs(1), sub.next()).await.unwrap();
        assert!(notice.is_some());
        sub.coalesce();

        directory.refresh(&store, &Collection::ALL).await.unwrap();
        assert_eq!(directory.records().len(), 3);
        assert!(directory.find("scholarship-9").is_some());
    }

    #[tokio::test]
    async fn test_dropped_subscription_stops_delivery() {
        let store = seeded();
        let sub = store.subscribe(&[Collection::Events]).await.unwrap();
        assert_eq!(store.receiver_count(), 1);
        sub.unsubscribe();

        // The aborted producer releases its receiver once the runtime drops it
        timeout(Duration::from_secs(1), async {
            while store.receiver_count() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("producer task should be cancelled on unsubscribe");

        store.insert(Collection::Events, row(2, "Talk"));
        assert_eq!(store.fetch(Collection::Events).await.unwrap().len(), 2);
    }
}
