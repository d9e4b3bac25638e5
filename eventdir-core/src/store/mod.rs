//! Record store boundary.
//!
//! The hosted database is an external collaborator. The core only needs
//! two things from it: a snapshot of a collection's rows, and a feed that
//! says "something in collection X changed". Every change triggers the same
//! full fetch-and-replace used at startup; there is no delta path.

mod directory;
mod http;
mod memory;

pub use directory::{Directory, load_records};
pub use http::HttpStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::EventDirResult;
use crate::record::{Collection, RawRecord};

/// Buffered notices per subscription before the producer waits.
const NOTICE_BUFFER: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeNotice {
    pub collection: Collection,
}

/// A queryable collection store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read every row of `collection`.
    async fn fetch(&self, collection: Collection) -> EventDirResult<Vec<RawRecord>>;

    /// Watch `collections` for inserts, updates and deletes.
    async fn subscribe(&self, collections: &[Collection]) -> EventDirResult<Subscription>;
}

/// A live change feed. Dropping it tears the producer down.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::Receiver<ChangeNotice>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// A channel pair: the sender goes to the producer task, which must then
    /// be attached with [`Subscription::attach`].
    pub fn channel() -> (mpsc::Sender<ChangeNotice>, Self) {
        let (sender, receiver) = mpsc::channel(NOTICE_BUFFER);
        (
            sender,
            Subscription {
                receiver,
                task: None,
            },
        )
    }

    pub fn attach(mut self, task: JoinHandle<()>) -> Self {
        self.task = Some(task);
        self
    }

    /// Wait for the next change. `None` once the producer has stopped.
    pub async fn next(&mut self) -> Option<ChangeNotice> {
        self.receiver.recv().await
    }

    /// Drain notices that are already queued, so a burst of changes costs
    /// a single re-fetch. Returns how many were dropped.
    pub fn coalesce(&mut self) -> usize {
        let mut dropped = 0;
        while self.receiver.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
