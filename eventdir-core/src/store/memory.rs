//! In-process record store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use super::{ChangeNotice, RecordStore, Subscription};
use crate::error::{EventDirError, EventDirResult};
use crate::record::{Collection, RawRecord};

const BROADCAST_CAPACITY: usize = 64;

/// A store held in memory. Every mutation is announced to subscribers.
///
/// Used for tests and for serving a fixed JSON snapshot.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    rows: RwLock<HashMap<Collection, Vec<RawRecord>>>,
    failing: AtomicBool,
    changes: broadcast::Sender<ChangeNotice>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(BROADCAST_CAPACITY);
        MemoryStore {
            inner: Arc::new(Inner {
                rows: RwLock::new(HashMap::new()),
                failing: AtomicBool::new(false),
                changes,
            }),
        }
    }

    /// Load a JSON snapshot: an object mapping collection table names to
    /// arrays of rows, e.g. `{"events": [...], "hackathons": [...]}`.
    pub fn from_snapshot(json: &str) -> EventDirResult<Self> {
        let tables: HashMap<String, Vec<RawRecord>> = serde_json::from_str(json)
            .map_err(|e| EventDirError::Serialization(format!("Invalid snapshot: {e}")))?;

        let mut store = MemoryStore::new();
        for (name, rows) in tables {
            match Collection::from_table_name(&name) {
                Some(collection) => store = store.with_rows(collection, rows),
                None => warn!(table = %name, "Ignoring unknown table in snapshot"),
            }
        }
        Ok(store)
    }

    pub fn with_rows(self, collection: Collection, rows: Vec<RawRecord>) -> Self {
        self.write_rows(|all| {
            all.insert(collection, rows);
        });
        self
    }

    pub fn insert(&self, collection: Collection, row: RawRecord) {
        self.write_rows(|all| all.entry(collection).or_default().push(row));
        self.announce(collection);
    }

    /// Remove rows whose `id` renders as `id`. Returns how many were removed.
    pub fn remove(&self, collection: Collection, id: &str) -> usize {
        let mut removed = 0;
        self.write_rows(|all| {
            if let Some(rows) = all.get_mut(&collection) {
                let before = rows.len();
                rows.retain(|row| row.text(&["id"]).as_deref() != Some(id));
                removed = before - rows.len();
            }
        });
        if removed > 0 {
            self.announce(collection);
        }
        removed
    }

    pub fn replace(&self, collection: Collection, rows: Vec<RawRecord>) {
        self.write_rows(|all| {
            all.insert(collection, rows);
        });
        self.announce(collection);
    }

    /// Make every subsequent fetch fail, as an unreachable backend would.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    /// Live subscription forwarders, each holding one broadcast receiver.
    #[cfg(test)]
    pub(crate) fn receiver_count(&self) -> usize {
        self.inner.changes.receiver_count()
    }

    fn write_rows(&self, f: impl FnOnce(&mut HashMap<Collection, Vec<RawRecord>>)) {
        let mut rows = self.inner.rows.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut rows);
    }

    fn announce(&self, collection: Collection) {
        // No receivers is fine: nobody is watching yet
        let _ = self.inner.changes.send(ChangeNotice { collection });
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch(&self, collection: Collection) -> EventDirResult<Vec<RawRecord>> {
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(EventDirError::Store(format!(
                "'{collection}' is unavailable"
            )));
        }

        let rows = self.inner.rows.read().unwrap_or_else(PoisonError::into_inner);
        Ok(rows.get(&collection).cloned().unwrap_or_default())
    }

    async fn subscribe(&self, collections: &[Collection]) -> EventDirResult<Subscription> {
        let mut changes = self.inner.changes.subscribe();
        let watched = collections.to_vec();
        let (sender, subscription) = Subscription::channel();

        let task = tokio::spawn(async move {
            loop {
                let notice = match changes.recv().await {
                    Ok(notice) if watched.contains(&notice.collection) => notice,
                    Ok(_) => continue,
                    // Missed notices still mean something changed
                    Err(RecvError::Lagged(_)) => match watched.first() {
                        Some(&collection) => ChangeNotice { collection },
                        None => continue,
                    },
                    Err(RecvError::Closed) => break,
                };

                if sender.send(notice).await.is_err() {
                    break;
                }
            }
        });

        Ok(subscription.attach(task))
    }
}
