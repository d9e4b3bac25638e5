//! Where the CLI reads records from.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use eventdir_core::store::load_records;
use eventdir_core::{Collection, EventDirConfig, EventRecord, HttpStore, MemoryStore, RecordStore};

use crate::utils::tui::create_spinner;

pub struct Source {
    store: Arc<dyn RecordStore>,
    label: String,
}

impl Source {
    /// A snapshot file when given, otherwise the configured HTTP store.
    pub fn open(config: &EventDirConfig, snapshot: Option<&Path>) -> Result<Self> {
        if let Some(path) = snapshot {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read snapshot {}", path.display()))?;
            return Ok(Source {
                store: Arc::new(MemoryStore::from_snapshot(&json)?),
                label: path.display().to_string(),
            });
        }

        let store = HttpStore::from_config(config)?;
        Ok(Source {
            store: Arc::new(store),
            label: config.store_url.clone().unwrap_or_default(),
        })
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Fetch and normalize every collection behind a spinner.
    pub async fn load(&self) -> Result<Vec<EventRecord>> {
        let spinner = create_spinner(format!("Loading {}", self.label));
        let result = load_records(self.store(), &Collection::ALL).await;
        spinner.finish_and_clear();

        Ok(result?)
    }
}
