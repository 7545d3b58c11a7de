use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::{storage_key, ProgressStore};

/// In-process store; contents are lost with the value.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of stored documents, for diagnostics and tests.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn load(&self, app_key: &str) -> Result<Option<Value>> {
        Ok(self.entries().get(&storage_key(app_key)).cloned())
    }

    async fn save(&self, app_key: &str, data: &Value) -> Result<()> {
        self.entries().insert(storage_key(app_key), data.clone());
        Ok(())
    }

    async fn clear(&self, app_key: &str) -> Result<()> {
        self.entries().remove(&storage_key(app_key));
        Ok(())
    }
}
